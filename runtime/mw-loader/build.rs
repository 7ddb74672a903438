use std::process::Command;

fn main() {
    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=MW_LOADER_GIT_SHA={}", sha);
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
    // Exported by the LiteDRAM generator step, read with option_env!
    println!("cargo:rerun-if-env-changed=MIGEN_GIT_SHA1");
    println!("cargo:rerun-if-env-changed=LITEX_GIT_SHA1");
}

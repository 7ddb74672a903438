//! Platform collaborators

cfg_if::cfg_if! {
    if #[cfg(target_arch = "powerpc64")] {
        mod powerpc64;
        pub use powerpc64::{LinuxHandoff, LiteDram};
    } else {
        compile_error!("mw-loader only targets powerpc64 (Microwatt)");
    }
}

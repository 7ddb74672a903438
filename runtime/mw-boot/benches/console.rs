use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use mw_boot::console::{BoundedBuffer, FORMAT_BUFFER_SIZE};
use mw_boot::sim::SimBus;
use mw_boot::soc::SYSCON_BASE;
use mw_boot::{Console, SystemController, SystemInfo};

fn bench_write_string(c: &mut Criterion) {
    let bus = SimBus::new();
    let uart = bus.console();
    let line = b"mw_debug -b jtag stop load vmlinux.bin load microwatt.dtb 1000000 start\n";

    c.bench_function("console_write_string", |b| {
        b.iter(|| {
            uart.write_string(black_box(line));
            bus.take_output();
        });
    });
}

fn bench_format_and_write(c: &mut Criterion) {
    let bus = SimBus::new();
    let uart = bus.console();

    c.bench_function("console_format_and_write", |b| {
        b.iter(|| {
            uart.format_and_write(format_args!(
                " Soc signature: {:016x}\n",
                black_box(0xf00d_aa55_0001_0001u64)
            ));
            bus.take_output();
        });
    });
}

fn bench_bounded_render(c: &mut Criterion) {
    let long = "x".repeat(1_000);

    c.bench_function("bounded_buffer_truncate", |b| {
        b.iter(|| {
            let mut buffer = BoundedBuffer::<FORMAT_BUFFER_SIZE>::new();
            buffer.render(format_args!("{}", black_box(&long)))
        });
    });
}

fn bench_soc_report(c: &mut Criterion) {
    let bus = SimBus::new();
    let uart = bus.console();
    let syscon = SystemController::new(&bus, SYSCON_BASE);

    c.bench_function("soc_report", |b| {
        b.iter(|| {
            SystemInfo::read(&syscon).report(&uart);
            bus.take_output();
        });
    });
}

criterion_group!(
    benches,
    bench_write_string,
    bench_format_and_write,
    bench_bounded_render,
    bench_soc_report
);
criterion_main!(benches);

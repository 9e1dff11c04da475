//! Benchmarks for tune preprocessing and section toggling
//!
//! Run with: cargo bench --bench preprocess_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tunedeck::mute::SectionToggler;
use tunedeck::preprocess::{PreprocessContext, Preprocessor};
use tunedeck::tunes::DEFAULT_TUNE;

/// Default tune repeated `copies` times
fn long_tune(copies: usize) -> String {
    DEFAULT_TUNE.repeat(copies)
}

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    let pre = Preprocessor::default();
    let ctx = PreprocessContext::new()
        .bind("volume", "0.8")
        .with_section("bass", false);

    for copies in [1, 16, 128] {
        let tune = long_tune(copies);
        group.bench_with_input(BenchmarkId::new("resolve_tags", copies), &tune, |b, tune| {
            b.iter(|| pre.process(black_box(tune), &ctx))
        });
    }

    let strip = ctx.clone().strip_muted(true);
    let tune = long_tune(16);
    group.bench_function("strip_muted_16", |b| {
        b.iter(|| pre.process(black_box(&tune), &strip))
    });

    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let toggler = SectionToggler::default();
    let tune = long_tune(16);

    c.bench_function("toggle_mute_16", |b| {
        b.iter(|| toggler.toggle(black_box(&tune), "drums", false))
    });
}

criterion_group!(benches, bench_preprocess, bench_toggle);
criterion_main!(benches);

//! Benchmarks for scheduler ticking under load.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use deslice_config::SlideConfig;
use deslice_glide::ConvergenceScheduler;

fn bench_tick_with_many_tracks(c: &mut Criterion) {
    c.bench_function("scheduler_tick_16_tracks", |b| {
        let mut config = SlideConfig::default();
        config.track_count = 16;
        config.track_interaction = true;
        config.partition_tracks = true;
        let mut scheduler = ConvergenceScheduler::with_seed(config, 42);
        let mut now = 0.0;
        b.iter(|| {
            now += 0.05;
            scheduler.tick(black_box(now));
        })
    });
}

fn bench_convergence_churn(c: &mut Criterion) {
    c.bench_function("scheduler_converge_release_cycle", |b| {
        let mut config = SlideConfig::default();
        config.track_count = 8;
        let mut scheduler = ConvergenceScheduler::with_seed(config, 7);
        let mut now = 0.0;
        b.iter(|| {
            now += 0.1;
            scheduler.converge_to(black_box(&[220.0, 330.0, 440.0, 550.0]), now);
            scheduler.tick(now);
            scheduler.release(now + 0.05);
        })
    });
}

criterion_group!(benches, bench_tick_with_many_tracks, bench_convergence_churn);
criterion_main!(benches);

//! Benchmarks for automation lane queries and scale lookups.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use deslice_core::{AutomationLane, ScaleTable};

fn bench_value_at(c: &mut Criterion) {
    let mut lane = AutomationLane::new(0.0);
    for i in 0..64 {
        let t = i as f64 * 0.1;
        lane.anchor(t);
        lane.linear_ramp_to((i % 2) as f32, t + 0.05);
    }

    c.bench_function("lane_value_at_dense", |b| {
        b.iter(|| {
            let mut acc = 0.0_f32;
            for i in 0..64 {
                acc += lane.value_at(black_box(i as f64 * 0.1 + 0.025));
            }
            acc
        })
    });
}

fn bench_magnetic_snap(c: &mut Criterion) {
    let freqs: Vec<f32> = (0..48)
        .map(|i| 65.41 * 2.0_f32.powf(i as f32 / 12.0))
        .collect();
    let table = ScaleTable::new(freqs);

    c.bench_function("magnetic_snap_chromatic", |b| {
        b.iter(|| {
            let mut acc = 0.0_f32;
            for i in 0..100 {
                acc += table.magnetic_snap(black_box(100.0 + i as f32 * 9.3), 0.7);
            }
            acc
        })
    });
}

criterion_group!(benches, bench_value_at, bench_magnetic_snap);
criterion_main!(benches);

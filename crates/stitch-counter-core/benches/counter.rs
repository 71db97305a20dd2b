#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stitch_counter_core::{Adjustment, Counter, CounterSnapshot, ProjectId};

fn counter_with_target(total: u32) -> Counter {
    Counter::from_parts(ProjectId(1), 0, Adjustment::Five, total, "bench")
}

fn increment_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_increment");
    for presses in [10_usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(presses), &presses, |b, &presses| {
            b.iter_batched(
                || counter_with_target(500),
                |mut counter| {
                    for _ in 0..presses {
                        counter.increment();
                        black_box(counter.progress());
                    }
                    counter
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn snapshot_benchmark(c: &mut Criterion) {
    let counter = counter_with_target(120);
    c.bench_function("snapshot_bytes_roundtrip", |b| {
        b.iter(|| {
            let bytes = black_box(&counter).to_snapshot().to_bytes();
            CounterSnapshot::from_bytes(&bytes).map(Counter::from_snapshot)
        });
    });
}

criterion_group!(benches, increment_benchmark, snapshot_benchmark);
criterion_main!(benches);

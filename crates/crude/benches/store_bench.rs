//! Benchmarks for store mutations and derived fan-out.
//!
//! Run with: cargo bench -p crude --bench store_bench
//!
//! Copy-on-write snapshots should keep update cost roughly flat as the
//! store grows.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use crude::{SequentialIds, Store};
use std::hint::black_box;

fn filled(n: usize) -> (Store<u64>, Vec<crude::EntryId>) {
    let store = Store::with_id_source(SequentialIds::default());
    let ids = (0..n as u64).map(|v| store.create(v)).collect();
    (store, ids)
}

// =============================================================================
// Plain mutations
// =============================================================================

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/update");
    for n in [10usize, 1_000, 100_000] {
        let (store, ids) = filled(n);
        let target = ids[n / 2].clone();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut v = 0u64;
            b.iter(|| {
                v += 1;
                store.update(black_box(&target), v).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_create_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/create_delete");
    for n in [10usize, 1_000, 100_000] {
        let (store, _) = filled(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let id = store.create(black_box(7));
                store.delete(&id).unwrap();
            })
        });
    }
    group.finish();
}

// =============================================================================
// Derived fan-out
// =============================================================================

fn bench_derived_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/derived_fanout");
    for width in [1usize, 16, 256] {
        let (store, ids) = filled(1);
        let root = ids[0].clone();
        for k in 0..width as u64 {
            store
                .create_calculated(move |v| v[0] + k, &[root.clone()])
                .unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            let mut v = 0u64;
            b.iter(|| {
                v += 1;
                store.update(&root, black_box(v)).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_update, bench_create_delete, bench_derived_fanout);
criterion_main!(benches);

//! # Component Store Benchmark
//!
//! Dense vs. sparse stores on the operations a tick leans on:
//! - staged insertion followed by a flush
//! - ascending iteration over committed components
//! - random lookups
//!
//! Run with: `cargo bench --package ember_core --bench store_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ember_core::{ComponentStore, EntityId};

/// Population for every benchmark (the default 16-bit id space).
const ENTITY_COUNT: u32 = 65_536;

#[derive(Clone, Copy, Default)]
struct Transform {
    x: f32,
    y: f32,
    rotation: f32,
}

fn store(kind: &str) -> ComponentStore<Transform> {
    match kind {
        "dense" => ComponentStore::dense(ENTITY_COUNT as usize),
        _ => ComponentStore::sparse(),
    }
}

/// Every odd id, inserted from the top down.
fn populated(kind: &str) -> ComponentStore<Transform> {
    let mut store = store(kind);
    for index in (0..ENTITY_COUNT).rev().step_by(2) {
        let f = index as f32;
        let _ = store.add_component(
            EntityId::new(index),
            Transform {
                x: f,
                y: -f,
                rotation: 0.0,
            },
        );
    }
    store.apply_pending();
    store
}

/// Benchmark: queue N additions, then flush.
fn bench_add_and_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_and_flush");

    for kind in ["dense", "sparse"] {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| black_box(populated(kind).len()));
        });
    }

    group.finish();
}

/// Benchmark: walk every committed component in id order.
fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate_32K");

    for kind in ["dense", "sparse"] {
        let mut store = populated(kind);
        group.bench_function(BenchmarkId::new("read", kind), |b| {
            b.iter(|| {
                let mut sum = 0.0_f32;
                for (_, transform) in store.iter() {
                    sum += transform.x;
                }
                black_box(sum)
            });
        });
        group.bench_function(BenchmarkId::new("write", kind), |b| {
            b.iter(|| {
                for (_, transform) in store.iter_mut() {
                    transform.rotation = (transform.rotation + 0.01) % std::f32::consts::TAU;
                }
                black_box(store.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: scattered lookups (worst case for cache).
fn bench_random_lookup(c: &mut Criterion) {
    let indices: Vec<EntityId> = {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        (0..10_000u32)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                i.hash(&mut hasher);
                EntityId::new((hasher.finish() % u64::from(ENTITY_COUNT)) as u32)
            })
            .collect()
    };

    let mut group = c.benchmark_group("random_lookup_10K");

    for kind in ["dense", "sparse"] {
        let store = populated(kind);
        group.bench_function(kind, |b| {
            b.iter(|| {
                let mut sum = 0.0_f32;
                for &id in &indices {
                    if let Some(transform) = store.get_component(id) {
                        sum += transform.y;
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

/// Benchmark: remove and re-add every other committed id in one flush.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn_16K");

    for kind in ["dense", "sparse"] {
        let mut store = populated(kind);
        group.bench_function(kind, |b| {
            b.iter(|| {
                for index in (1..ENTITY_COUNT).step_by(4) {
                    let id = EntityId::new(index);
                    let _ = store.remove_component(id);
                    let _ = store.add_component(id, Transform::default());
                }
                black_box(store.apply_pending())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_and_flush,
    bench_iterate,
    bench_random_lookup,
    bench_churn,
);

criterion_main!(benches);

//! Criterion benches for building and querying triangulations.
//!
//! - Native lower hull on the fixtures (square, 4D simplex), with and without star.
//! - Regularity (secondary cone + LP) and validity of fixed triangulations.
//! - 2D flip neighbors and a short random flip walk.
//!
//! Results live under `target/criterion`.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use lattri::api::{mother_of_all_examples, reflexive_simplex_4d, reflexive_square};
use lattri::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn all(n: usize) -> Vec<usize> {
    (0..n).collect()
}

fn offline() -> Toolchain {
    Toolchain::default()
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    let fixtures = [
        ("square", Arc::new(reflexive_square())),
        ("simplex4d", Arc::new(reflexive_simplex_4d())),
    ];
    for (name, poly) in &fixtures {
        for star in [false, true] {
            let id = if star { "native_star" } else { "native" };
            group.bench_with_input(BenchmarkId::new(id, name), poly, |b, poly| {
                b.iter(|| {
                    Triangulation::new(
                        Arc::clone(poly),
                        &all(poly.len()),
                        TriangulateOpts::default().star(star).tools(offline()),
                    )
                    .unwrap()
                })
            });
        }
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let regular = vec![
        vec![0, 1, 3],
        vec![0, 2, 3],
        vec![1, 2, 4],
        vec![1, 3, 4],
        vec![2, 3, 5],
        vec![2, 4, 5],
        vec![3, 4, 5],
    ];
    let mother = Triangulation::new(
        Arc::new(mother_of_all_examples()),
        &all(6),
        TriangulateOpts::with_simplices(regular)
            .check_input_simplices(false)
            .tools(offline()),
    )
    .unwrap();
    group.bench_function("is_regular/mother", |b| {
        b.iter_batched(
            || mother.clone(),
            |mut t| t.is_regular().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("is_valid_geometric/mother", |b| {
        b.iter(|| mother.is_valid_geometric().unwrap())
    });
    group.bench_function("heights/mother", |b| {
        b.iter_batched(
            || mother.clone(),
            |mut t| t.heights().unwrap(),
            BatchSize::SmallInput,
        )
    });

    let fan = Triangulation::new(
        Arc::new(reflexive_square()),
        &all(9),
        TriangulateOpts::default().star(true).tools(offline()),
    )
    .unwrap();
    group.bench_function("fine_neighbors_2d/square", |b| {
        b.iter_batched(
            || fan.clone(),
            |mut t| {
                t.neighbor_triangulations(NeighborFilter::new(true, false, false))
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("random_flips_10/square", |b| {
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            fan.random_flips(10, NeighborFilter::new(true, false, false), &mut rng)
                .unwrap()
        })
    });
    group.bench_function("sr_ideal/square", |b| {
        b.iter_batched(
            || fan.clone(),
            |mut t| t.sr_ideal().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_construct, bench_queries);
criterion_main!(benches);

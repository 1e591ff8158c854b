//! Criterion benches for cone solidity and interior points.
//!
//! Random integer cones in `R^n` for n in {4, 8, 16} with 2n walls, half of them
//! built to contain a fixed interior ray so both outcomes are exercised.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lattri::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_cone(n: usize, seed: u64) -> Cone {
    let mut rng = StdRng::seed_from_u64(seed);
    let ray: Vec<i64> = (0..n).map(|_| rng.gen_range(1..=3)).collect();
    let walls: Vec<Vec<i64>> = (0..2 * n)
        .map(|k| {
            let mut h: Vec<i64> = (0..n).map(|_| rng.gen_range(-5..=5)).collect();
            let dot: i64 = h.iter().zip(&ray).map(|(a, b)| a * b).sum();
            // every other wall is flipped to contain the ray
            if k % 2 == 0 && dot <= 0 {
                h.iter_mut().for_each(|x| *x = -*x);
            }
            h
        })
        .collect();
    Cone::new(n, walls).unwrap()
}

fn bench_cones(c: &mut Criterion) {
    let mut group = c.benchmark_group("cone");
    for &n in &[4usize, 8, 16] {
        let cone = random_cone(n, 17 + n as u64);
        group.bench_with_input(BenchmarkId::new("is_solid", n), &cone, |b, cone| {
            b.iter(|| cone.is_solid())
        });
        group.bench_with_input(BenchmarkId::new("integral_point", n), &cone, |b, cone| {
            b.iter(|| cone.find_integral_interior_point())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cones);
criterion_main!(benches);

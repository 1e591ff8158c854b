//! In-process regular triangulations from heights.
//!
//! Algorithm
//! - Incremental Bowyer–Watson on lifted points. A point is inserted by finding the
//!   cells whose lifted affine function lies above it (the conflict region, which is
//!   connected), removing them and coning the cavity boundary to the new point. A
//!   point that lies above the current lower hull conflicts with nothing and is
//!   left out, as are points that a later insertion pushes off the hull.
//! - The run starts from a simplex of `d+1` virtual vertices that strictly contains
//!   every input point. Virtual vertices sit at a symbolic height above every real
//!   point, so the cells with only real vertices are exactly the regular
//!   triangulation of the input.
//! - Heights are compared lexicographically as (virtual level, `h`, tie-break),
//!   where the tie-break is a fixed generic integer lifting. The result therefore
//!   refines the regular subdivision of `h` to a triangulation.
//!
//! All predicates are exact: barycentric coordinates come from integer
//! determinants and heights are converted to rationals without rounding.

use std::collections::{HashMap, HashSet};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfg::{TIE_BREAK_BITS, TIE_BREAK_SEED};
use crate::error::{Result, TriangError};
use crate::intmat::{det, homogenize};

/// Lower-hull triangulation of `points` lifted by `heights` (canonical order).
pub fn regular_triangulation(points: &[Vec<i64>], heights: &[f64]) -> Result<Vec<Vec<usize>>> {
    let n = points.len();
    if n == 0 {
        return Err(TriangError::invalid("cannot triangulate an empty point set"));
    }
    if heights.len() != n {
        return Err(TriangError::invalid(format!(
            "{} heights for {n} points",
            heights.len()
        )));
    }
    let exact: Option<Vec<BigRational>> = heights.iter().map(|&h| BigRational::from_float(h)).collect();
    let Some(exact) = exact else {
        return Err(TriangError::invalid("heights must be finite"));
    };
    let d = points[0].len();
    if d == 0 {
        return Ok(vec![vec![0]]);
    }
    let lift = Lifting::new(points, exact);
    let mut mesh = Mesh::default();
    mesh.add((n..n + d + 1).collect());
    for q in 0..n {
        lift.insert(&mut mesh, q);
    }
    let mut out: Vec<Vec<usize>> = mesh
        .cells
        .into_iter()
        .flatten()
        .filter(|c| c.iter().all(|&v| v < n))
        .collect();
    if out.is_empty() {
        return Err(TriangError::invalid(
            "points do not span their ambient space; use rank-reduced coordinates",
        ));
    }
    out.sort();
    Ok(out)
}

/// Lifted input plus the virtual vertices `n..n+d+1`.
struct Lifting {
    n: usize,
    hom: Vec<Vec<i64>>,
    heights: Vec<BigRational>,
    tie: Vec<i64>,
}

impl Lifting {
    fn new(points: &[Vec<i64>], heights: Vec<BigRational>) -> Self {
        let n = points.len();
        let d = points[0].len();
        let bound = points.iter().flatten().fold(0i64, |m, &x| m.max(x.abs()));
        // {x : x_j >= -c, sum(x_j + c) <= len} holds every point strictly
        let c = bound + 1;
        let len = d as i64 * (2 * bound + 1) + 1;
        let mut hom: Vec<Vec<i64>> = points.iter().map(|p| homogenize(p)).collect();
        hom.push(homogenize(&vec![-c; d]));
        for j in 0..d {
            let mut v = vec![-c; d];
            v[j] += len;
            hom.push(homogenize(&v));
        }
        let mut rng = StdRng::seed_from_u64(TIE_BREAK_SEED);
        let tie = (0..n).map(|_| rng.gen_range(0..1i64 << TIE_BREAK_BITS)).collect();
        Self {
            n,
            hom,
            heights,
            tie,
        }
    }

    /// Barycentric numerators of `q` in `cell` and the cell determinant.
    fn barycentric(&self, cell: &[usize], q: usize) -> (i128, Vec<i128>) {
        let rows: Vec<Vec<i64>> = cell.iter().map(|&v| self.hom[v].clone()).collect();
        let d0 = det(&rows);
        let nums = (0..cell.len())
            .map(|k| {
                let mut r = rows.clone();
                r[k] = self.hom[q].clone();
                det(&r)
            })
            .collect();
        (d0, nums)
    }

    /// Whether the closed cell contains `q`.
    fn contains(&self, cell: &[usize], q: usize) -> bool {
        let (d0, nums) = self.barycentric(cell, q);
        nums.iter().all(|&l| l.signum() * d0.signum() >= 0)
    }

    /// Whether lifted `q` lies strictly below the lifted affine function of `cell`.
    fn below(&self, cell: &[usize], q: usize) -> bool {
        let (d0, nums) = self.barycentric(cell, q);
        let sign = d0.signum();
        // virtual level: q is real, so only virtual vertices contribute
        let virt: i128 = cell
            .iter()
            .zip(&nums)
            .filter(|&(&v, _)| v >= self.n)
            .map(|(_, &l)| l)
            .sum();
        if virt != 0 {
            return sign * -virt < 0;
        }
        let mut dh = BigRational::from_integer(BigInt::from(d0)) * &self.heights[q];
        for (&v, &l) in cell.iter().zip(&nums) {
            if v < self.n && l != 0 {
                dh -= BigRational::from_integer(BigInt::from(l)) * &self.heights[v];
            }
        }
        if !dh.is_zero() {
            return (sign > 0) == dh.is_negative();
        }
        let mut dt = d0 * self.tie[q] as i128;
        for (&v, &l) in cell.iter().zip(&nums) {
            if v < self.n {
                dt -= l * self.tie[v] as i128;
            }
        }
        sign * dt < 0
    }

    fn insert(&self, mesh: &mut Mesh, q: usize) {
        let Some(seed) = mesh.live().find(|&id| self.contains(mesh.cell(id), q)) else {
            return;
        };
        if !self.below(mesh.cell(seed), q) {
            return;
        }
        let mut cavity: HashSet<usize> = HashSet::from([seed]);
        let mut rejected: HashSet<usize> = HashSet::new();
        let mut stack = vec![seed];
        while let Some(id) = stack.pop() {
            for nb in mesh.neighbors(id) {
                if cavity.contains(&nb) || rejected.contains(&nb) {
                    continue;
                }
                if self.below(mesh.cell(nb), q) {
                    cavity.insert(nb);
                    stack.push(nb);
                } else {
                    rejected.insert(nb);
                }
            }
        }
        let mut boundary = Vec::new();
        for &id in &cavity {
            for ridge in ridges(mesh.cell(id)) {
                let inside = mesh.ridges[&ridge].iter().filter(|&&c| cavity.contains(&c)).count();
                if inside == 1 {
                    boundary.push(ridge);
                }
            }
        }
        for id in cavity {
            mesh.remove(id);
        }
        for mut ridge in boundary {
            ridge.push(q);
            ridge.sort_unstable();
            mesh.add(ridge);
        }
    }
}

/// Live cells and the ridge-to-cell incidence between them.
#[derive(Default)]
struct Mesh {
    cells: Vec<Option<Vec<usize>>>,
    ridges: HashMap<Vec<usize>, Vec<usize>>,
}

impl Mesh {
    fn live(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_some())
            .map(|(i, _)| i)
    }

    fn cell(&self, id: usize) -> &[usize] {
        self.cells[id].as_deref().unwrap_or(&[])
    }

    fn add(&mut self, cell: Vec<usize>) {
        let id = self.cells.len();
        for r in ridges(&cell) {
            self.ridges.entry(r).or_default().push(id);
        }
        self.cells.push(Some(cell));
    }

    fn remove(&mut self, id: usize) {
        let Some(cell) = self.cells[id].take() else {
            return;
        };
        for r in ridges(&cell) {
            if let Some(ids) = self.ridges.get_mut(&r) {
                ids.retain(|&c| c != id);
                if ids.is_empty() {
                    self.ridges.remove(&r);
                }
            }
        }
    }

    fn neighbors(&self, id: usize) -> Vec<usize> {
        ridges(self.cell(id))
            .iter()
            .filter_map(|r| self.ridges.get(r))
            .flatten()
            .copied()
            .filter(|&c| c != id)
            .collect()
    }
}

/// The facets of a sorted cell, each still sorted.
fn ridges(cell: &[usize]) -> Vec<Vec<usize>> {
    (0..cell.len())
        .map(|k| {
            let mut r = cell.to_vec();
            r.remove(k);
            r
        })
        .collect()
}

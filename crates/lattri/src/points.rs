//! Point configurations: a label subset of a polytope's lattice points.
//!
//! Invariants
//! - At least one point; no duplicates.
//! - Local index order follows the polytope's canonical label order, regardless of
//!   the order the caller listed labels in. Two configurations on the same label
//!   set therefore index their points identically.
//! - `optimal()` coordinates have exactly `dim()` entries per point. They equal the
//!   ambient coordinates for full-dimensional configurations and a unimodular
//!   lattice chart otherwise, so normalized volumes agree in both.

use std::collections::HashMap;

use crate::error::{Result, TriangError};
use crate::intmat::{homogenize, lattice_chart, rank, simplex_volume};
use crate::polytope::LatticePolytope;

#[derive(Clone, Debug)]
pub struct PointConfig {
    labels: Vec<usize>,
    points: Vec<Vec<i64>>,
    optimal: Vec<Vec<i64>>,
    index: HashMap<Vec<i64>, usize>,
    label_index: HashMap<usize, usize>,
    dim: usize,
    origin: Option<usize>,
}

impl PointConfig {
    /// Select `labels` (any order, repeats ignored) from `poly`.
    pub fn new(poly: &LatticePolytope, labels: &[usize]) -> Result<Self> {
        if labels.is_empty() {
            return Err(TriangError::invalid("the label set cannot be empty"));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= poly.len()) {
            return Err(TriangError::invalid(format!(
                "label {bad} out of range for a polytope with {} points",
                poly.len()
            )));
        }
        let mut labels = labels.to_vec();
        labels.sort_unstable();
        labels.dedup();
        let points: Vec<Vec<i64>> = labels.iter().map(|&l| poly.points()[l].clone()).collect();
        let hom: Vec<Vec<i64>> = points.iter().map(|p| homogenize(p)).collect();
        let dim = rank(&hom) - 1;
        let ambient = points[0].len();
        let optimal = if dim == ambient {
            points.clone()
        } else {
            lattice_chart(&points)
        };
        let index: HashMap<Vec<i64>, usize> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i))
            .collect();
        let label_index = labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();
        let origin = index.get(&vec![0; ambient]).copied();
        Ok(Self {
            labels,
            points,
            optimal,
            index,
            label_index,
            dim,
            origin,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ambient coordinates, in local index order.
    #[inline]
    pub fn points(&self) -> &[Vec<i64>] {
        &self.points
    }

    /// Rank-reduced coordinates (see module docs).
    #[inline]
    pub fn optimal(&self) -> &[Vec<i64>] {
        &self.optimal
    }

    /// Polytope labels, in local index order.
    #[inline]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.points[0].len()
    }

    #[inline]
    pub fn is_full_dim(&self) -> bool {
        self.dim == self.ambient_dim()
    }

    /// Local index of the zero vector, if present.
    #[inline]
    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    #[inline]
    pub fn index_of(&self, p: &[i64]) -> Option<usize> {
        self.index.get(p).copied()
    }

    /// Local index of a polytope label, if the label is in the configuration.
    #[inline]
    pub fn index_of_label(&self, label: usize) -> Option<usize> {
        self.label_index.get(&label).copied()
    }

    /// Local indices of points; errors on the first point outside the configuration.
    pub fn indices_of(&self, pts: &[Vec<i64>]) -> Result<Vec<usize>> {
        pts.iter()
            .map(|p| {
                self.index_of(p).ok_or_else(|| {
                    TriangError::invalid(format!("{p:?} is not in the point configuration"))
                })
            })
            .collect()
    }

    /// `(optimal(i), 1)`.
    #[inline]
    pub(crate) fn homogenized(&self, i: usize) -> Vec<i64> {
        homogenize(&self.optimal[i])
    }

    /// Normalized volume of a simplex given by local indices.
    pub fn simplex_volume(&self, simplex: &[usize]) -> u64 {
        let verts: Vec<&[i64]> = simplex.iter().map(|&i| self.optimal[i].as_slice()).collect();
        simplex_volume(&verts)
    }
}

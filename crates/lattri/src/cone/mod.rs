//! Polyhedral cones `{x : h·x >= 0 for every hyperplane h}` with integer normals.
//!
//! Purpose
//! - Represent secondary cones (walls between adjacent triangulations) and the
//!   simplicial cones spanned by homogenized simplices.
//! - Decide solidity and produce interior points for height vectors.
//!
//! Why this design
//! - Normals stay exact (`i64`) and so does every solidity decision. A cone with
//!   integer normals is solid iff `h·x >= 1` is feasible for every nonzero `h`,
//!   which an exact rational simplex decides; zero normals constrain nothing.
//! - A feasible rational point is strictly interior, so scaling it by the common
//!   denominator gives an integral interior point with no rounding.

mod lp;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive};

use crate::error::{Result, TriangError};
use crate::intmat::{det, primitive};

/// Cone in `R^dim` given by inward hyperplane normals.
///
/// Invariants:
/// - Every normal has length `dim`.
/// - An empty normal list describes the whole space (solid).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cone {
    dim: usize,
    hyperplanes: Vec<Vec<i64>>,
}

impl Cone {
    /// Cone from inward normals in `R^dim`.
    pub fn new(dim: usize, hyperplanes: Vec<Vec<i64>>) -> Result<Self> {
        if let Some(h) = hyperplanes.iter().find(|h| h.len() != dim) {
            return Err(TriangError::invalid(format!(
                "hyperplane of length {} in a cone of dimension {dim}",
                h.len()
            )));
        }
        Ok(Self { dim, hyperplanes })
    }

    /// Cone spanned by `n` linearly independent rays in `R^n`.
    ///
    /// Hyperplanes are the rows of `sign(det M) · adj(M)` for the ray matrix `M`
    /// (rays as columns), made primitive. Returns `None` for singular input.
    pub fn from_simplicial_rays(rays: &[Vec<i64>]) -> Option<Self> {
        let n = rays.len();
        if rays.iter().any(|r| r.len() != n) {
            return None;
        }
        // m[r][c] = rays[c][r]
        let m: Vec<Vec<i64>> = (0..n).map(|r| rays.iter().map(|ray| ray[r]).collect()).collect();
        let d = det(&m);
        if d == 0 {
            return None;
        }
        let sign: i128 = d.signum();
        let mut hyperplanes = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                // adj[i][j] = (-1)^(i+j) det(M without row j and column i)
                let minor: Vec<Vec<i64>> = (0..n)
                    .filter(|&r| r != j)
                    .map(|r| (0..n).filter(|&c| c != i).map(|c| m[r][c]).collect())
                    .collect();
                let cof = if (i + j) % 2 == 0 { det(&minor) } else { -det(&minor) };
                row.push(i64::try_from(sign * cof).ok()?);
            }
            primitive(&mut row);
            hyperplanes.push(row);
        }
        Some(Self { dim: n, hyperplanes })
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn hyperplanes(&self) -> &[Vec<i64>] {
        &self.hyperplanes
    }

    /// Intersection: the union of both normal lists.
    pub fn intersection(&self, other: &Cone) -> Result<Cone> {
        if self.dim != other.dim {
            return Err(TriangError::invalid(format!(
                "cannot intersect cones of dimensions {} and {}",
                self.dim, other.dim
            )));
        }
        let mut hyperplanes = self.hyperplanes.clone();
        for h in &other.hyperplanes {
            if !hyperplanes.contains(h) {
                hyperplanes.push(h.clone());
            }
        }
        Ok(Cone {
            dim: self.dim,
            hyperplanes,
        })
    }

    /// `h · x` for every hyperplane.
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        self.hyperplanes
            .iter()
            .map(|h| h.iter().zip(x).map(|(&a, b)| a as f64 * b).sum())
            .collect()
    }

    /// Full-dimensional (nonempty interior).
    pub fn is_solid(&self) -> bool {
        self.strict_point().is_some()
    }

    /// A point strictly inside every wall (slack at least one on each nonzero
    /// normal), or `None` if the cone is not solid.
    pub fn find_interior_point(&self) -> Option<Vec<f64>> {
        self.strict_point()?.iter().map(ToPrimitive::to_f64).collect()
    }

    /// A primitive integer point strictly inside every wall, or `None` if the cone
    /// is not solid or the point does not fit in `i64`.
    pub fn find_integral_interior_point(&self) -> Option<Vec<i64>> {
        let x = self.strict_point()?;
        let denom = x.iter().fold(BigInt::one(), |l, v| l.lcm(v.denom()));
        let mut r: Vec<i64> = x
            .iter()
            .map(|v| (v.numer() * (&denom / v.denom())).to_i64())
            .collect::<Option<_>>()?;
        primitive(&mut r);
        Some(r)
    }

    /// Exact strict membership of an integer point.
    pub fn strictly_contains(&self, x: &[i64]) -> bool {
        self.hyperplanes.iter().all(|h| {
            let s: i128 = h.iter().zip(x).map(|(&a, &b)| a as i128 * b as i128).sum();
            s > 0
        })
    }

    fn strict_point(&self) -> Option<Vec<BigRational>> {
        let rows: Vec<Vec<i64>> = self
            .hyperplanes
            .iter()
            .filter(|h| h.iter().any(|&v| v != 0))
            .cloned()
            .collect();
        lp::strictly_feasible_point(&rows, self.dim)
    }
}

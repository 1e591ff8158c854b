//! Secondary cone, regularity and heights.
//!
//! Sign convention: every wall `v` satisfies `v · h > 0` for heights `h` that
//! realize this triangulation, so the secondary cone is `{h : v · h >= 0}`.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use super::{NeighborFilter, Triangulation};
use crate::backend::native;
use crate::cfg::MAX_INTEGRAL_SCALE_BITS;
use crate::cone::Cone;
use crate::error::{Result, TriangError};
use crate::intmat::{nullspace_vector, primitive};

/// How walls of the secondary cone are found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConeMethod {
    /// Circuits of adjacent simplex pairs, computed in-process.
    Native,
    /// GKZ-vector differences to every flip neighbor (needs a flip oracle).
    FlipGkz,
}

impl Triangulation {
    /// Secondary cone in `R^n`, one coordinate per configuration point.
    ///
    /// `include_points_not_in_triangulation` asks for the cone of heights that also
    /// keep unused points off the lower hull; `ConeMethod::Native` cannot express
    /// that for non-fine triangulations and is replaced by `FlipGkz` with a warning.
    /// The result is cached per `include_points_not_in_triangulation`.
    pub fn secondary_cone(
        &mut self,
        method: Option<ConeMethod>,
        include_points_not_in_triangulation: bool,
    ) -> Result<&Cone> {
        let slot = usize::from(include_points_not_in_triangulation);
        let cone = match self.cache.cones[slot].take() {
            Some(c) => c,
            None => {
                let native_ok = !include_points_not_in_triangulation || self.is_fine();
                let method = match method {
                    None if native_ok => ConeMethod::Native,
                    None => ConeMethod::FlipGkz,
                    Some(ConeMethod::Native) if !native_ok => {
                        warn!("native secondary cone ignores unused points; using flip GKZ vectors");
                        ConeMethod::FlipGkz
                    }
                    Some(m) => m,
                };
                match method {
                    ConeMethod::Native => self.native_cone()?,
                    ConeMethod::FlipGkz => self.flip_gkz_cone()?,
                }
            }
        };
        Ok(&*self.cache.cones[slot].insert(cone))
    }

    /// One wall per pair of simplices sharing a `dim`-element face: the primitive
    /// linear relation among the homogenized vertices of both simplices, signed
    /// positive on the vertex that only the first simplex has.
    fn native_cone(&mut self) -> Result<Cone> {
        let n = self.config.len();
        let d = self.dim();
        let star_center = if self.is_star() { self.config.origin() } else { None };
        let hom: Vec<Vec<i64>> = (0..n).map(|i| self.config.homogenized(i)).collect();
        let sets: Vec<BTreeSet<usize>> = self
            .simplices
            .iter()
            .map(|s| s.iter().copied().collect())
            .collect();
        let mut walls: BTreeSet<Vec<i64>> = BTreeSet::new();
        for i in 0..sets.len() {
            for j in i + 1..sets.len() {
                let common: Vec<usize> = sets[i].intersection(&sets[j]).copied().collect();
                if common.len() != d {
                    continue;
                }
                let mut cols: Vec<usize> = sets[i].symmetric_difference(&sets[j]).copied().collect();
                cols.extend(common.iter().copied().filter(|&c| Some(c) != star_center));
                if let Some(c) = star_center {
                    cols.push(c);
                }
                let m: Vec<Vec<i64>> = (0..=d)
                    .map(|r| cols.iter().map(|&c| hom[c][r]).collect())
                    .collect();
                let Some(mut v) = nullspace_vector(&m) else {
                    debug!(a = ?self.simplices[i], b = ?self.simplices[j], "no circuit for adjacent pair");
                    continue;
                };
                if v[0] < 0 {
                    v.iter_mut().for_each(|x| *x = -*x);
                }
                let mut wall = vec![0i64; n];
                for (k, &c) in cols.iter().enumerate() {
                    wall[c] = v[k];
                }
                walls.insert(wall);
            }
        }
        Cone::new(n, walls.into_iter().collect())
    }

    /// Walls `gkz(T') - gkz(T)` over all flip neighbors `T'`.
    fn flip_gkz_cone(&mut self) -> Result<Cone> {
        let n = self.config.len();
        let phi = self.gkz_phi();
        let mut neighbors = self.neighbor_triangulations(NeighborFilter::default())?;
        if neighbors.is_empty() {
            warn!("no flip neighbors found; the secondary cone has no walls");
        }
        let mut walls: Vec<Vec<i64>> = Vec::with_capacity(neighbors.len());
        let mut seen: HashSet<Vec<i64>> = HashSet::new();
        for t in &mut neighbors {
            let wall: Vec<i64> = t.gkz_phi().iter().zip(&phi).map(|(a, b)| a - b).collect();
            if wall.iter().any(|&x| x != 0) && seen.insert(wall.clone()) {
                walls.push(wall);
            }
        }
        Cone::new(n, walls)
    }

    /// Whether some height vector realizes these simplices as a lower hull.
    ///
    /// Uses only the in-process cone, so no external tool is needed. A single
    /// simplex is regular by definition.
    pub fn is_regular(&mut self) -> Result<bool> {
        if let Some(r) = self.cache.regular {
            return Ok(r);
        }
        let r = self.simplices.len() == 1 || self.secondary_cone(None, false)?.is_solid();
        self.cache.regular = Some(r);
        Ok(r)
    }

    /// A height vector realizing this triangulation; computed once, then cached.
    ///
    /// Unused points of a non-fine triangulation are lifted one unit above every
    /// used point. Irregular triangulations have no heights.
    pub fn heights(&mut self) -> Result<Vec<f64>> {
        if let Some(h) = &self.heights {
            return Ok(h.clone());
        }
        let h = if self.is_trivial() {
            vec![0.0; self.config.len()]
        } else {
            let fine = self.is_fine();
            let x = self
                .secondary_cone(None, false)?
                .find_interior_point()
                .ok_or_else(not_regular)?;
            if fine {
                x
            } else {
                self.lift_unused(x, 1.0)
            }
        };
        self.heights = Some(h.clone());
        Ok(h)
    }

    /// Integral heights realizing this triangulation.
    ///
    /// Integral known heights are returned as they are. Fractional known heights
    /// are rescaled and rounded (with a warning) as long as the rounding still
    /// realizes the simplices; otherwise an integral interior point of the
    /// secondary cone is used.
    pub fn integral_heights(&mut self) -> Result<Vec<i64>> {
        if self.is_trivial() {
            return Ok(vec![0; self.config.len()]);
        }
        if let Some(h) = self.heights.clone() {
            if h.iter().all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64) {
                return Ok(h.iter().map(|&v| v as i64).collect());
            }
            warn!("rounding fractional heights to integers may lose precision");
            if let Some(r) = self.rounded_realizing(&h)? {
                return Ok(r);
            }
            debug!("rounded heights do not realize the triangulation; solving for integral heights");
        }
        if !self.is_regular()? {
            return Err(not_regular());
        }
        let x = self
            .secondary_cone(None, false)?
            .find_integral_interior_point()
            .ok_or_else(|| {
                TriangError::unsupported("no integral interior point found in the secondary cone")
            })?;
        if self.is_fine() {
            Ok(x)
        } else {
            let top = self.lift_unused(x.iter().map(|&v| v as f64).collect(), 1.0);
            Ok(top.iter().map(|&v| v as i64).collect())
        }
    }

    /// Smallest power-of-two rescaling of `h` whose rounding realizes the
    /// simplices strictly, made primitive.
    fn rounded_realizing(&mut self, h: &[f64]) -> Result<Option<Vec<i64>>> {
        let max = h.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        if max == 0.0 {
            return Ok(None);
        }
        let walls = self.secondary_cone(None, false)?.clone();
        for bits in 0..=MAX_INTEGRAL_SCALE_BITS {
            let scale = (1u64 << bits) as f64 / max;
            let mut r: Vec<i64> = h.iter().map(|v| (v * scale).round() as i64).collect();
            if !walls.strictly_contains(&r) {
                continue;
            }
            let lifted: Vec<f64> = r.iter().map(|&v| v as f64).collect();
            if native::regular_triangulation(self.config.optimal(), &lifted)? == self.simplices {
                primitive(&mut r);
                return Ok(Some(r));
            }
        }
        Ok(None)
    }

    /// Set every unused point to `gap` above the highest used point.
    fn lift_unused(&self, mut h: Vec<f64>, gap: f64) -> Vec<f64> {
        let used = self.used_points();
        let mut top = f64::NEG_INFINITY;
        for (v, &u) in h.iter().zip(&used) {
            if u {
                top = top.max(*v);
            }
        }
        for (v, &u) in h.iter_mut().zip(&used) {
            if !u {
                *v = top + gap;
            }
        }
        h
    }
}

fn not_regular() -> TriangError {
    TriangError::unsupported("the triangulation is not regular, so it has no heights")
}

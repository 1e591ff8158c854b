//! Fineness, starness, validity and face restriction.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use super::Triangulation;
use crate::backend::native;
use crate::cfg::WALL_EPS;
use crate::error::{Result, TriangError};
use crate::intmat::det;

impl Triangulation {
    /// Every configuration point is a vertex of some simplex.
    pub fn is_fine(&mut self) -> bool {
        if let Some(f) = self.cache.fine {
            return f;
        }
        let f = self.covers_all_points();
        self.cache.fine = Some(f);
        f
    }

    pub(super) fn covers_all_points(&self) -> bool {
        self.used_points().iter().all(|&u| u)
    }

    /// `used[i]` iff local index `i` is a vertex of some simplex.
    pub(crate) fn used_points(&self) -> Vec<bool> {
        let mut used = vec![false; self.config.len()];
        for &i in self.simplices.iter().flatten() {
            used[i] = true;
        }
        used
    }

    /// Every simplex contains the origin. False when the configuration has no origin.
    pub fn is_star(&mut self) -> bool {
        if let Some(s) = self.cache.star {
            return s;
        }
        let s = self.is_star_about(self.config.origin());
        self.cache.star = Some(s);
        s
    }

    /// Every simplex contains local index `center`.
    pub fn is_star_about(&self, center: Option<usize>) -> bool {
        match center {
            Some(c) => self.simplices.iter().all(|s| s.binary_search(&c).is_ok()),
            None => false,
        }
    }

    /// Whether the simplices form a triangulation of the convex hull.
    ///
    /// Regular input is checked by rebuilding from its heights; anything else falls
    /// back to `is_valid_geometric`.
    pub fn is_valid(&mut self) -> Result<bool> {
        if let Some(v) = self.cache.valid {
            return Ok(v);
        }
        let valid = if self.simplices.len() == 1 {
            self.is_valid_geometric()?
        } else if self.is_regular()? {
            let heights = self.heights()?;
            native::regular_triangulation(self.config.optimal(), &heights)? == self.simplices
        } else {
            self.is_valid_geometric()?
        };
        self.cache.valid = Some(valid);
        Ok(valid)
    }

    /// Geometric validity test, independent of regularity and of any backend.
    ///
    /// Valid iff no simplex is degenerate, every facet of a simplex is either shared
    /// with exactly one other simplex on the opposite side or lies on the boundary
    /// of the convex hull, and the barycenter of the first simplex lies in exactly
    /// one simplex. The facet conditions make the simplices cover the hull a constant
    /// number of times; the barycenter fixes that number at one.
    pub fn is_valid_geometric(&self) -> Result<bool> {
        let Some(first) = self.simplices.first() else {
            return Ok(false);
        };
        for s in &self.simplices {
            if self.config.simplex_volume(s) == 0 {
                debug!(simplex = ?s, "degenerate simplex");
                return Ok(false);
            }
        }
        let n = self.config.len();
        let hom: Vec<Vec<i64>> = (0..n).map(|i| self.config.homogenized(i)).collect();
        let mut facets: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
        for s in &self.simplices {
            for k in 0..s.len() {
                let mut facet = s.clone();
                let apex = facet.remove(k);
                facets.entry(facet).or_default().push(apex);
            }
        }
        for (facet, apexes) in &facets {
            let side = |p: usize| {
                let mut rows: Vec<Vec<i64>> = facet.iter().map(|&i| hom[i].clone()).collect();
                rows.push(hom[p].clone());
                det(&rows).signum()
            };
            let ok = match apexes.as_slice() {
                [_] => {
                    let sides: HashSet<i128> = (0..n).map(side).filter(|&v| v != 0).collect();
                    sides.len() <= 1
                }
                &[a, b] => side(a) * side(b) < 0,
                _ => false,
            };
            if !ok {
                debug!(?facet, ?apexes, "facet is neither interior nor on the hull boundary");
                return Ok(false);
            }
        }
        // (sum of vertices, d+1) is the barycenter in homogeneous coordinates
        let center: Vec<i64> = (0..first.len())
            .map(|r| first.iter().map(|&i| hom[i][r]).sum())
            .collect();
        let covering = self
            .simplices
            .iter()
            .filter(|s| {
                let rows: Vec<Vec<i64>> = s.iter().map(|&i| hom[i].clone()).collect();
                let d0 = det(&rows).signum();
                (0..rows.len()).all(|k| {
                    let mut r = rows.clone();
                    r[k] = center.clone();
                    det(&r).signum() * d0 >= 0
                })
            })
            .count();
        if covering != 1 {
            debug!(covering, "simplices overlap");
            return Ok(false);
        }
        Ok(true)
    }

    /// Check the known heights against the walls between used points and drop them
    /// when they sit within tolerance of one. Returns whether heights are (still) known.
    pub fn check_heights(&mut self) -> Result<bool> {
        self.check_heights_inner(false)
    }

    pub(super) fn check_heights_inner(&mut self, quiet: bool) -> Result<bool> {
        let Some(heights) = self.heights.clone() else {
            return Ok(false);
        };
        let near_wall = self
            .secondary_cone(None, false)?
            .evaluate(&heights)
            .iter()
            .any(|&v| v < WALL_EPS);
        if near_wall {
            if quiet {
                debug!("heights lie near a secondary-cone wall; dropping them");
            } else {
                warn!("heights lie near a secondary-cone wall; dropping them");
            }
            self.heights = None;
        }
        Ok(!near_wall)
    }

    /// Face dimension for a codimension, relative to the configuration.
    pub fn face_dim_from_codim(&self, codim: usize) -> Result<usize> {
        self.dim().checked_sub(codim).ok_or_else(|| {
            TriangError::invalid(format!(
                "codimension {codim} exceeds the dimension {}",
                self.dim()
            ))
        })
    }

    /// Union over all faces of dimension `face_dim` of the restricted simplices.
    pub fn simplices_on_faces(&mut self, face_dim: usize) -> Result<Vec<Vec<usize>>> {
        let mut all: BTreeSet<Vec<usize>> = BTreeSet::new();
        for face in self.restricted(face_dim)? {
            all.extend(face.iter().cloned());
        }
        Ok(all.into_iter().collect())
    }

    /// Restricted simplices grouped per face of dimension `face_dim`, faces in the
    /// order the polytope lists them.
    pub fn simplices_by_face(&mut self, face_dim: usize) -> Result<Vec<Vec<Vec<usize>>>> {
        Ok(self
            .restricted(face_dim)?
            .iter()
            .map(|face| face.iter().cloned().collect())
            .collect())
    }

    fn restricted(&mut self, face_dim: usize) -> Result<&[BTreeSet<Vec<usize>>]> {
        if face_dim > self.dim() {
            return Err(TriangError::invalid(format!(
                "face dimension {face_dim} exceeds the dimension {}",
                self.dim()
            )));
        }
        if !self.cache.restricted.contains_key(&face_dim) {
            let per_face = self.restrict_to_faces(face_dim);
            self.cache.restricted.insert(face_dim, per_face);
        }
        Ok(self
            .cache
            .restricted
            .get(&face_dim)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    fn restrict_to_faces(&self, face_dim: usize) -> Vec<BTreeSet<Vec<usize>>> {
        if face_dim == self.dim() {
            return vec![self.simplices.iter().cloned().collect()];
        }
        let faces = self.poly.faces(face_dim);
        if faces.is_empty() {
            warn!(face_dim, "the polytope has no faces of this dimension");
        }
        faces
            .iter()
            .map(|face| {
                let local: HashSet<usize> = face
                    .iter()
                    .filter_map(|&l| self.config.index_of_label(l))
                    .collect();
                self.simplices
                    .iter()
                    .filter_map(|s| {
                        let on: Vec<usize> =
                            s.iter().copied().filter(|i| local.contains(i)).collect();
                        (on.len() == face_dim + 1).then_some(on)
                    })
                    .collect()
            })
            .collect()
    }
}

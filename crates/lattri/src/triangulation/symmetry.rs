//! Orbits under polytope automorphisms.

use std::collections::{BTreeSet, VecDeque};

use super::Triangulation;
use crate::error::{Result, TriangError};
use crate::util::permute_simplices;

impl Triangulation {
    /// Images of the (face-restricted) simplices under automorphisms that map the
    /// configuration onto itself, sorted.
    ///
    /// With `automorphisms = None` the whole group is applied once. With a subset
    /// of group indices, the identity is always included and the orbit is closed
    /// under repeated application of the chosen elements.
    pub fn automorphism_orbit(
        &mut self,
        automorphisms: Option<&[usize]>,
        face_dim: Option<usize>,
    ) -> Result<Vec<Vec<Vec<usize>>>> {
        if !self.is_full_dim() {
            return Err(TriangError::unsupported(
                "automorphism orbits need a full-dimensional point configuration",
            ));
        }
        let face_dim = face_dim.unwrap_or(self.dim());
        let group_len = self.poly.automorphisms().len();
        let chosen = automorphisms.map(|a| {
            let mut v = a.to_vec();
            v.sort_unstable();
            v.dedup();
            v
        });
        if let Some(&bad) = chosen.iter().flatten().find(|&&i| i >= group_len) {
            return Err(TriangError::invalid(format!(
                "automorphism index {bad} out of range for a group of order {group_len}"
            )));
        }
        let key = (chosen, face_dim);
        if let Some(orbit) = self.cache.orbits.get(&key) {
            return Ok(orbit.clone());
        }
        let base = if face_dim == self.dim() {
            self.simplices.clone()
        } else {
            self.simplices_on_faces(face_dim)?
        };
        let local = self.config_preserving_automorphisms();
        let selected = |i: usize| match &key.0 {
            Some(c) => i == 0 || c.binary_search(&i).is_ok(),
            None => true,
        };
        let mut orbit: BTreeSet<Vec<Vec<usize>>> = local
            .iter()
            .enumerate()
            .filter(|&(i, _)| selected(i))
            .filter_map(|(_, p)| p.as_ref())
            .map(|p| permute_simplices(&base, p))
            .collect();
        if let Some(chosen) = &key.0 {
            let gens: Vec<&Vec<usize>> = chosen.iter().filter_map(|&i| local[i].as_ref()).collect();
            let mut queue: VecDeque<Vec<Vec<usize>>> = orbit.iter().cloned().collect();
            while let Some(t) = queue.pop_front() {
                for g in &gens {
                    let image = permute_simplices(&t, g);
                    if orbit.insert(image.clone()) {
                        queue.push_back(image);
                    }
                }
            }
        }
        let orbit: Vec<Vec<Vec<usize>>> = orbit.into_iter().collect();
        self.cache.orbits.insert(key, orbit.clone());
        Ok(orbit)
    }

    /// Each group element as a permutation of local indices, or `None` when it does
    /// not map the configuration onto itself.
    fn config_preserving_automorphisms(&self) -> Vec<Option<Vec<usize>>> {
        let labels = self.config.labels();
        let n_poly = self.poly.len();
        self.poly
            .automorphisms()
            .iter()
            .map(|perm| {
                let preserves = (0..n_poly).all(|l| {
                    self.config.index_of_label(l).is_some()
                        == self.config.index_of_label(perm[l]).is_some()
                });
                if !preserves {
                    return None;
                }
                labels
                    .iter()
                    .map(|&l| self.config.index_of_label(perm[l]))
                    .collect()
            })
            .collect()
    }

    /// Same polytope and, with `use_automorphisms`, the same orbit; otherwise the
    /// same (face-restricted) simplices.
    pub fn is_equivalent(
        &mut self,
        other: &mut Triangulation,
        use_automorphisms: bool,
        face_dim: Option<usize>,
    ) -> Result<bool> {
        if !(std::sync::Arc::ptr_eq(&self.poly, &other.poly) || *self.poly == *other.poly) {
            return Ok(false);
        }
        if self.config.labels() != other.config.labels() {
            return Ok(false);
        }
        let face_dim = face_dim.unwrap_or(self.dim());
        if use_automorphisms && self.is_full_dim() {
            return Ok(self.automorphism_orbit(None, Some(face_dim))?
                == other.automorphism_orbit(None, Some(face_dim))?);
        }
        if face_dim == self.dim() {
            return Ok(self.simplices == other.simplices);
        }
        Ok(self.simplices_on_faces(face_dim)? == other.simplices_on_faces(face_dim)?)
    }
}

//! GKZ vector and Stanley–Reisner ideal.

use std::collections::BTreeSet;

use super::Triangulation;
use crate::error::{Result, TriangError};

impl Triangulation {
    /// Per point, the total normalized volume of the simplices containing it.
    pub fn gkz_phi(&mut self) -> Vec<i64> {
        if let Some(phi) = &self.cache.gkz {
            return phi.clone();
        }
        let mut phi = vec![0i64; self.config.len()];
        for s in &self.simplices {
            let v = self.config.simplex_volume(s) as i64;
            for &i in s {
                phi[i] += v;
            }
        }
        self.cache.gkz = Some(phi.clone());
        phi
    }

    /// Minimal non-faces of the boundary complex (simplices with the origin
    /// removed), sorted by size and then lexicographically.
    ///
    /// Unused non-origin points are size-one generators.
    pub fn sr_ideal(&mut self) -> Result<Vec<Vec<usize>>> {
        if let Some(sr) = &self.cache.sr_ideal {
            return Ok(sr.clone());
        }
        if !self.is_full_dim() {
            return Err(TriangError::unsupported(
                "the Stanley–Reisner ideal needs a full-dimensional point configuration",
            ));
        }
        if !self.is_star() {
            return Err(TriangError::unsupported(
                "the Stanley–Reisner ideal needs a star triangulation",
            ));
        }
        let origin = self
            .config
            .origin()
            .ok_or_else(|| TriangError::unsupported("the point configuration has no origin"))?;
        let d = self.dim();
        // faces[k]: all k-element faces of the boundary complex.
        let mut faces: Vec<BTreeSet<Vec<usize>>> = vec![BTreeSet::new(); d + 1];
        for s in &self.simplices {
            let boundary: Vec<usize> = s.iter().copied().filter(|&i| i != origin).collect();
            for mask in 1u32..(1 << boundary.len()) {
                let face: Vec<usize> = boundary
                    .iter()
                    .enumerate()
                    .filter(|&(b, _)| mask & (1 << b) != 0)
                    .map(|(_, &i)| i)
                    .collect();
                faces[face.len()].insert(face);
            }
        }
        let rays: Vec<usize> = (0..self.config.len()).filter(|&i| i != origin).collect();
        let mut gens: BTreeSet<(usize, Vec<usize>)> = BTreeSet::new();
        for &r in &rays {
            if !faces[1].contains(&vec![r]) {
                gens.insert((1, vec![r]));
            }
        }
        for k in 1..=d {
            for face in &faces[k] {
                for &r in &rays {
                    if face.binary_search(&r).is_ok() {
                        continue;
                    }
                    let mut cand = face.clone();
                    let pos = cand.partition_point(|&x| x < r);
                    cand.insert(pos, r);
                    if k < d && faces[k + 1].contains(&cand) {
                        continue;
                    }
                    // Minimal iff every facet of `cand` is a face; the one without `r` is `face`.
                    let minimal = face.iter().all(|&x| {
                        let sub: Vec<usize> = cand.iter().copied().filter(|&y| y != x).collect();
                        faces[k].contains(&sub)
                    });
                    if minimal {
                        gens.insert((k + 1, cand));
                    }
                }
            }
        }
        let sr: Vec<Vec<usize>> = gens.into_iter().map(|(_, g)| g).collect();
        self.cache.sr_ideal = Some(sr.clone());
        Ok(sr)
    }
}

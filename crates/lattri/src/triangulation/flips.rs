//! Bistellar-flip neighbors and random walks over them.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::Triangulation;
use crate::error::{Result, TriangError};

/// Which neighbors to keep. The default keeps all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NeighborFilter {
    pub only_fine: bool,
    pub only_regular: bool,
    pub only_star: bool,
}

impl NeighborFilter {
    pub fn new(only_fine: bool, only_regular: bool, only_star: bool) -> Self {
        Self {
            only_fine,
            only_regular,
            only_star,
        }
    }

    /// Fine, regular and star.
    pub fn frst() -> Self {
        Self::new(true, true, true)
    }

    pub(crate) fn accepts(&self, t: &mut Triangulation) -> Result<bool> {
        Ok((!self.only_fine || t.is_fine())
            && (!self.only_star || t.is_star())
            && (!self.only_regular || t.is_regular()?))
    }
}

impl Triangulation {
    /// Triangulations one bistellar flip away, filtered.
    ///
    /// Fine two-dimensional triangulations asked for fine neighbors are handled
    /// in-process (diagonal flips of convex quadrilaterals); everything else goes
    /// through the toolchain's flip oracle.
    pub fn neighbor_triangulations(&mut self, filter: NeighborFilter) -> Result<Vec<Triangulation>> {
        if self.simplices.len() == 1 {
            warn!("a triangulation with a single simplex has no flip neighbors");
            return Ok(Vec::new());
        }
        if filter.only_fine && self.dim() == 2 && self.is_fine() {
            return self.fine_neighbors_2d(filter);
        }
        let oracle = self.tools.flip_oracle();
        let raw = oracle.flips(self.config.optimal(), &self.simplices)?;
        let n = self.config.len();
        let k = self.dim() + 1;
        let mut out = Vec::with_capacity(raw.len());
        for simplices in raw {
            if simplices
                .iter()
                .any(|s| s.len() != k || s.iter().any(|&i| i >= n))
            {
                debug!(?simplices, "skipping malformed flip neighbor");
                continue;
            }
            let mut t = self.sibling(simplices);
            if filter.accepts(&mut t)? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Diagonal flips of two triangles that share an edge and together form a
    /// parallelogram (the shared edge and the opposite diagonal have the same
    /// midpoint). In a fine lattice triangulation every flippable pair is one.
    fn fine_neighbors_2d(&mut self, filter: NeighborFilter) -> Result<Vec<Triangulation>> {
        let pts = self.config.points();
        let sets: Vec<BTreeSet<usize>> = self
            .simplices
            .iter()
            .map(|s| s.iter().copied().collect())
            .collect();
        let mut flipped = Vec::new();
        for i in 0..sets.len() {
            for j in i + 1..sets.len() {
                let shared: Vec<usize> = sets[i].intersection(&sets[j]).copied().collect();
                if shared.len() != 2 {
                    continue;
                }
                let apart: Vec<usize> = sets[i].symmetric_difference(&sets[j]).copied().collect();
                let same_midpoint = pts[shared[0]]
                    .iter()
                    .zip(&pts[shared[1]])
                    .zip(pts[apart[0]].iter().zip(&pts[apart[1]]))
                    .all(|((a, b), (c, d))| a + b == c + d);
                if !same_midpoint {
                    continue;
                }
                let mut simplices = self.simplices.clone();
                for (slot, &keep) in [i, j].into_iter().zip(&shared) {
                    let mut s = vec![apart[0], apart[1], keep];
                    s.sort_unstable();
                    simplices[slot] = s;
                }
                flipped.push(simplices);
            }
        }
        let mut out = Vec::with_capacity(flipped.len());
        for simplices in flipped {
            let mut t = self.sibling(simplices);
            t.cache.fine = Some(true);
            t.cache.valid = Some(true);
            if filter.accepts(&mut t)? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Walk `n` random flips, each time picking uniformly among the neighbors
    /// that pass `filter`. Fails with `StuckWalk` when a step has none.
    pub fn random_flips<R: Rng + ?Sized>(
        &self,
        n: usize,
        filter: NeighborFilter,
        rng: &mut R,
    ) -> Result<Triangulation> {
        let mut curr = self.clone();
        let candidates = NeighborFilter {
            only_fine: filter.only_fine,
            ..NeighborFilter::default()
        };
        for step in 0..n {
            let mut neighbors = curr.neighbor_triangulations(candidates)?;
            neighbors.shuffle(rng);
            let mut next = None;
            for mut t in neighbors {
                if filter.accepts(&mut t)? {
                    next = Some(t);
                    break;
                }
            }
            curr = next.ok_or(TriangError::StuckWalk { step })?;
        }
        Ok(curr)
    }
}

//! Star triangulations about the origin.

use std::collections::HashSet;

use tracing::debug;

use super::Triangulation;
use crate::cfg::MAX_LOWERING_ROUNDS;
use crate::error::{Result, TriangError};
use crate::util::canonicalize;

/// Cone over the boundary: for every facet and every simplex meeting it in `dim`
/// points, the simplex `origin ∪ (simplex ∩ facet)`.
///
/// Only meaningful for reflexive polytopes whose facet points are all in the
/// configuration; the origin must be in the configuration too.
pub(super) fn facet_star(t: &Triangulation) -> Result<Vec<Vec<usize>>> {
    if !t.poly.is_reflexive() {
        return Err(TriangError::unsupported(
            "star triangulations from facets need a reflexive polytope",
        ));
    }
    let origin = t
        .config
        .origin()
        .ok_or_else(|| TriangError::invalid("the point configuration has no origin"))?;
    let d = t.dim();
    let mut out = Vec::new();
    for f in 0..t.poly.facets().len() {
        let facet: HashSet<usize> = t
            .poly
            .facet_points(f)
            .iter()
            .filter_map(|&l| t.config.index_of_label(l))
            .collect();
        for s in &t.simplices {
            let on: Vec<usize> = s.iter().copied().filter(|i| facet.contains(i)).collect();
            if on.len() == d {
                let mut star = Vec::with_capacity(d + 1);
                star.push(origin);
                star.extend(on);
                out.push(star);
            }
        }
    }
    canonicalize(&mut out);
    Ok(out)
}

/// Lower the origin's height until the regular triangulation becomes a star.
///
/// Each round lowers the origin by `max(100, range of the other heights)` and
/// retriangulates with the same backend.
pub(super) fn lower_origin(t: &mut Triangulation) -> Result<()> {
    let origin = t
        .config
        .origin()
        .ok_or_else(|| TriangError::invalid("the point configuration has no origin"))?;
    let mut heights = t
        .heights
        .clone()
        .ok_or_else(|| TriangError::invalid("lowering the origin needs heights"))?;
    let (lo, hi) = heights
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != origin)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, &h)| (lo.min(h), hi.max(h)));
    let step = if lo.is_finite() { (hi - lo).max(100.0) } else { 100.0 };
    let mut rounds = 0;
    while !t.is_star_about(Some(origin)) {
        if rounds == MAX_LOWERING_ROUNDS {
            return Err(TriangError::unsupported(format!(
                "no star triangulation after lowering the origin {rounds} times"
            )));
        }
        heights[origin] -= step;
        t.simplices = t
            .tools
            .triangulate(t.backend, t.config.optimal(), Some(&heights))?;
        rounds += 1;
    }
    debug!(rounds, step, "origin lowered");
    t.heights = Some(heights);
    Ok(())
}

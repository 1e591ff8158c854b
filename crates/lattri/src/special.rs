//! Special lattice polytopes used in tests, benchmarks and demos.
//!
//! Purpose
//! - Provide small, fully explicit configurations whose triangulations are known
//!   by hand, so tests can pin exact simplex lists and invariants.
//!
//! References
//! - 4D reflexive simplex: vertices `e1..e4` and `(-1,-1,-6,-9)`; seven lattice
//!   points, normalized volume 18.
//! - Reflexive square `[-1,1]²`: nine lattice points, dihedral symmetry of order 8.
//! - "Mother of all examples": the triangle `conv((0,0),(4,0),(0,4))`, whose
//!   configuration `{(0,0),(4,0),(0,4),(1,1),(2,1),(1,2)}` has 18 triangulations,
//!   two of them non-regular.

use crate::polytope::{Facet, LatticePolytope};

fn build(points: Vec<Vec<i64>>, facets: Vec<Facet>) -> LatticePolytope {
    LatticePolytope::new(points, facets).expect("fixture polytope")
}

/// The reflexive 4-simplex with seven lattice points; the origin is label 0.
pub fn reflexive_simplex_4d() -> LatticePolytope {
    let points = vec![
        vec![0, 0, 0, 0],
        vec![-1, -1, -6, -9],
        vec![0, 0, 0, 1],
        vec![0, 0, 1, 0],
        vec![0, 1, 0, 0],
        vec![1, 0, 0, 0],
        vec![0, 0, -2, -3],
    ];
    let facets = vec![
        Facet::new(vec![-17, 1, 1, 1], 1),
        Facet::new(vec![1, -17, 1, 1], 1),
        Facet::new(vec![1, 1, -2, 1], 1),
        Facet::new(vec![1, 1, 1, -1], 1),
        Facet::new(vec![1, 1, 1, 1], 1),
    ];
    build(points, facets)
}

/// The square `[-1,1]²` with its eight symmetries; the origin is label 0.
///
/// Labels: `0:(0,0) 1:(-1,-1) 2:(-1,0) 3:(-1,1) 4:(0,-1) 5:(0,1) 6:(1,-1) 7:(1,0) 8:(1,1)`.
pub fn reflexive_square() -> LatticePolytope {
    let mut points = vec![vec![0, 0]];
    for x in -1..=1 {
        for y in -1..=1 {
            if (x, y) != (0, 0) {
                points.push(vec![x, y]);
            }
        }
    }
    let facets = vec![
        Facet::new(vec![1, 0], 1),
        Facet::new(vec![-1, 0], 1),
        Facet::new(vec![0, 1], 1),
        Facet::new(vec![0, -1], 1),
    ];
    let rotation = vec![vec![0, -1], vec![1, 0]];
    let reflection = vec![vec![1, 0], vec![0, -1]];
    build(points, facets)
        .with_linear_symmetries(&[rotation, reflection])
        .expect("fixture symmetries")
}

/// The polygon of the projective plane: `conv((1,0),(0,1),(-1,-1))` with the origin.
pub fn p2_fan() -> LatticePolytope {
    let points = vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![-1, -1]];
    let facets = vec![
        Facet::new(vec![1, 1], 1),
        Facet::new(vec![-2, 1], 1),
        Facet::new(vec![1, -2], 1),
    ];
    build(points, facets)
}

/// The triangle `conv((0,0),(4,0),(0,4))` with all fifteen lattice points.
///
/// The first six labels are `(0,0),(4,0),(0,4),(1,1),(2,1),(1,2)`; the remaining
/// points follow in lexicographic order.
pub fn mother_of_all_examples() -> LatticePolytope {
    let mut points = vec![
        vec![0, 0],
        vec![4, 0],
        vec![0, 4],
        vec![1, 1],
        vec![2, 1],
        vec![1, 2],
    ];
    for x in 0..=4 {
        for y in 0..=4 - x {
            let p = vec![x, y];
            if !points.contains(&p) {
                points.push(p);
            }
        }
    }
    let facets = vec![
        Facet::new(vec![-1, 0], 0),
        Facet::new(vec![0, -1], 0),
        Facet::new(vec![1, 1], 4),
    ];
    build(points, facets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplex_4d_is_reflexive_with_seven_points() {
        let p = reflexive_simplex_4d();
        assert_eq!(p.len(), 7);
        assert_eq!(p.dim(), 4);
        assert!(p.is_reflexive());
        assert_eq!(p.origin(), Some(0));
        assert_eq!(p.facets().len(), 5);
    }

    #[test]
    fn square_carries_the_dihedral_group() {
        let p = reflexive_square();
        assert_eq!(p.len(), 9);
        assert!(p.is_reflexive());
        assert_eq!(p.automorphisms().len(), 8);
        assert_eq!(p.point(8), Some(&[1, 1][..]));
        // every facet edge holds three lattice points
        for i in 0..4 {
            assert_eq!(p.facet_points(i).len(), 3);
        }
    }

    #[test]
    fn mother_is_not_reflexive() {
        let p = mother_of_all_examples();
        assert_eq!(p.len(), 15);
        assert!(!p.is_reflexive());
        assert_eq!(p.label_of(&[2, 1]), Some(4));
    }

    #[test]
    fn p2_fan_is_reflexive() {
        let p = p2_fan();
        assert_eq!(p.len(), 4);
        assert!(p.is_reflexive());
        assert_eq!(p.origin(), Some(0));
    }
}

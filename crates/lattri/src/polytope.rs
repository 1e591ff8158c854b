//! Lattice polytopes as a read-only oracle for triangulations.
//!
//! Purpose
//! - Own the canonical lattice-point ordering that every point configuration and
//!   triangulation indexes into.
//! - Answer the structural questions triangulations ask: facets and their points,
//!   faces by dimension, reflexivity, the automorphism group as point permutations.
//!
//! Why this design
//! - Callers supply both the point list and the facet inequalities `n·x <= c`;
//!   nothing here enumerates lattice points or computes hulls from scratch.
//! - Faces are derived from facet saturation: the point set of every face is an
//!   intersection of facet point sets, so a closure over intersections finds them
//!   all. This requires every vertex to be present in the point list.
//! - Automorphisms are stored as permutations of point labels, identity first, so
//!   that orbit computations never touch coordinates.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use crate::error::{Result, TriangError};
use crate::intmat::{gcd_list, homogenize, rank};

/// Closed half-space `normal · x <= offset` with integer data.
///
/// Invariant (after `LatticePolytope::new`): `normal` is primitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Facet {
    pub normal: Vec<i64>,
    pub offset: i64,
}

impl Facet {
    #[inline]
    pub fn new(normal: Vec<i64>, offset: i64) -> Self {
        Self { normal, offset }
    }

    #[inline]
    pub fn value(&self, p: &[i64]) -> i64 {
        self.normal.iter().zip(p).map(|(a, b)| a * b).sum()
    }

    #[inline]
    pub fn contains(&self, p: &[i64]) -> bool {
        self.value(p) <= self.offset
    }

    #[inline]
    pub fn saturates(&self, p: &[i64]) -> bool {
        self.value(p) == self.offset
    }

    fn make_primitive(&mut self) {
        let g = gcd_list(&self.normal);
        if g > 1 && self.offset % g == 0 {
            for x in self.normal.iter_mut() {
                *x /= g;
            }
            self.offset /= g;
        }
    }
}

/// A lattice polytope given by its lattice points (canonical order) and facets.
#[derive(Clone)]
pub struct LatticePolytope {
    points: Vec<Vec<i64>>,
    index: HashMap<Vec<i64>, usize>,
    facets: Vec<Facet>,
    facet_points: Vec<Vec<usize>>,
    faces: Vec<Vec<Vec<usize>>>,
    dim: usize,
    automorphisms: Vec<Vec<usize>>,
}

impl LatticePolytope {
    /// Build from lattice points and facet inequalities.
    ///
    /// Errors when the point list is empty, ragged, has duplicates, or violates a
    /// facet, and when a facet touches no listed point.
    pub fn new(points: Vec<Vec<i64>>, facets: Vec<Facet>) -> Result<Self> {
        let Some(first) = points.first() else {
            return Err(TriangError::invalid("a polytope needs at least one point"));
        };
        let ambient = first.len();
        if points.iter().any(|p| p.len() != ambient) {
            return Err(TriangError::invalid("points have mixed dimensions"));
        }
        let mut index = HashMap::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if index.insert(p.clone(), i).is_some() {
                return Err(TriangError::invalid(format!("duplicate point {p:?}")));
            }
        }
        let mut facets = facets;
        let mut facet_points = Vec::with_capacity(facets.len());
        for f in facets.iter_mut() {
            if f.normal.len() != ambient {
                return Err(TriangError::invalid("facet normal has the wrong dimension"));
            }
            f.make_primitive();
            if let Some(p) = points.iter().find(|p| !f.contains(p)) {
                return Err(TriangError::invalid(format!(
                    "point {p:?} violates facet {:?} <= {}",
                    f.normal, f.offset
                )));
            }
            let on: Vec<usize> = (0..points.len()).filter(|&i| f.saturates(&points[i])).collect();
            if on.is_empty() {
                return Err(TriangError::invalid(format!(
                    "facet {:?} <= {} contains none of the points",
                    f.normal, f.offset
                )));
            }
            facet_points.push(on);
        }
        let hom: Vec<Vec<i64>> = points.iter().map(|p| homogenize(p)).collect();
        let dim = rank(&hom) - 1;
        let faces = face_lattice(&points, &facet_points, dim);
        let n = points.len();
        Ok(Self {
            points,
            index,
            facets,
            facet_points,
            faces,
            dim,
            automorphisms: vec![(0..n).collect()],
        })
    }

    /// Replace the automorphism group by the given point permutations.
    ///
    /// Each permutation must map facet point sets onto facet point sets. The
    /// identity is added (and moved to the front) if missing.
    pub fn with_automorphisms(mut self, perms: Vec<Vec<usize>>) -> Result<Self> {
        let n = self.points.len();
        let facet_sets: HashSet<BTreeSet<usize>> = self
            .facet_points
            .iter()
            .map(|f| f.iter().copied().collect())
            .collect();
        let identity: Vec<usize> = (0..n).collect();
        let mut autos = vec![identity.clone()];
        for perm in perms {
            if perm.len() != n {
                return Err(TriangError::invalid("automorphism has the wrong length"));
            }
            let mut seen = vec![false; n];
            for &j in &perm {
                if j >= n || std::mem::replace(&mut seen[j], true) {
                    return Err(TriangError::invalid("automorphism is not a permutation"));
                }
            }
            let preserves = self.facet_points.iter().all(|f| {
                let image: BTreeSet<usize> = f.iter().map(|&i| perm[i]).collect();
                facet_sets.contains(&image)
            });
            if !preserves {
                return Err(TriangError::invalid(
                    "automorphism does not map facets onto facets",
                ));
            }
            if perm != identity && !autos.contains(&perm) {
                autos.push(perm);
            }
        }
        self.automorphisms = autos;
        Ok(self)
    }

    /// Automorphism group generated by integer linear maps `x ↦ M x`.
    ///
    /// Every map must send the point set onto itself. The group is closed under
    /// composition; the result lists each element once, identity first.
    pub fn with_linear_symmetries(self, generators: &[Vec<Vec<i64>>]) -> Result<Self> {
        let gens: Vec<Vec<usize>> = generators
            .iter()
            .map(|m| {
                self.permutation_of_linear_map(m).ok_or_else(|| {
                    TriangError::invalid(format!("linear map {m:?} does not preserve the points"))
                })
            })
            .collect::<Result<_>>()?;
        let n = self.points.len();
        let identity: Vec<usize> = (0..n).collect();
        let mut group = vec![identity.clone()];
        let mut seen: HashSet<Vec<usize>> = HashSet::from([identity]);
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        while let Some(i) = queue.pop_front() {
            for g in &gens {
                let composed: Vec<usize> = group[i].iter().map(|&j| g[j]).collect();
                if seen.insert(composed.clone()) {
                    group.push(composed);
                    queue.push_back(group.len() - 1);
                }
            }
        }
        self.with_automorphisms(group)
    }

    /// The permutation of point labels induced by `x ↦ M x`, if it preserves the points.
    pub fn permutation_of_linear_map(&self, m: &[Vec<i64>]) -> Option<Vec<usize>> {
        let d = self.ambient_dim();
        if m.len() != d || m.iter().any(|r| r.len() != d) {
            return None;
        }
        self.points
            .iter()
            .map(|p| {
                let image: Vec<i64> = m
                    .iter()
                    .map(|row| row.iter().zip(p).map(|(a, b)| a * b).sum())
                    .collect();
                self.index.get(&image).copied()
            })
            .collect()
    }

    #[inline]
    pub fn points(&self) -> &[Vec<i64>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn point(&self, label: usize) -> Option<&[i64]> {
        self.points.get(label).map(Vec::as_slice)
    }

    /// Label of a point, if it is one of the listed lattice points.
    #[inline]
    pub fn label_of(&self, p: &[i64]) -> Option<usize> {
        self.index.get(p).copied()
    }

    /// Labels of several points; errors on the first unknown point.
    pub fn labels_of(&self, pts: &[Vec<i64>]) -> Result<Vec<usize>> {
        pts.iter()
            .map(|p| {
                self.label_of(p)
                    .ok_or_else(|| TriangError::invalid(format!("{p:?} is not a point of the polytope")))
            })
            .collect()
    }

    /// Label of the zero vector, if listed.
    pub fn origin(&self) -> Option<usize> {
        self.label_of(&vec![0; self.ambient_dim()])
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.points[0].len()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Labels of the points saturating facet `i`.
    #[inline]
    pub fn facet_points(&self, i: usize) -> &[usize] {
        &self.facet_points[i]
    }

    /// Point-label sets of all faces of dimension `d` (empty for `d > dim`).
    pub fn faces(&self, d: usize) -> &[Vec<usize>] {
        self.faces.get(d).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full-dimensional with every facet at lattice distance one from the origin.
    pub fn is_reflexive(&self) -> bool {
        self.dim == self.ambient_dim()
            && !self.facets.is_empty()
            && self.facets.iter().all(|f| f.offset == 1)
    }

    /// Point permutations; index 0 is the identity.
    #[inline]
    pub fn automorphisms(&self) -> &[Vec<usize>] {
        &self.automorphisms
    }
}

impl PartialEq for LatticePolytope {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points && self.facets == other.facets
    }
}

impl Eq for LatticePolytope {}

impl fmt::Debug for LatticePolytope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatticePolytope")
            .field("dim", &self.dim)
            .field("ambient_dim", &self.ambient_dim())
            .field("points", &self.points.len())
            .field("facets", &self.facets.len())
            .field("automorphisms", &self.automorphisms.len())
            .finish()
    }
}

/// Faces grouped by dimension, each as a sorted label list.
fn face_lattice(points: &[Vec<i64>], facet_points: &[Vec<usize>], dim: usize) -> Vec<Vec<Vec<usize>>> {
    let facet_sets: Vec<BTreeSet<usize>> =
        facet_points.iter().map(|f| f.iter().copied().collect()).collect();
    let mut seen: BTreeSet<BTreeSet<usize>> = BTreeSet::new();
    seen.insert((0..points.len()).collect());
    let mut frontier: Vec<BTreeSet<usize>> = facet_sets.clone();
    while let Some(face) = frontier.pop() {
        if !seen.insert(face.clone()) {
            continue;
        }
        for f in &facet_sets {
            let inter: BTreeSet<usize> = face.intersection(f).copied().collect();
            if !inter.is_empty() && !seen.contains(&inter) {
                frontier.push(inter);
            }
        }
    }
    let mut by_dim: Vec<Vec<Vec<usize>>> = vec![Vec::new(); dim + 1];
    for face in seen {
        let hom: Vec<Vec<i64>> = face.iter().map(|&i| homogenize(&points[i])).collect();
        let d = rank(&hom) - 1;
        if d <= dim {
            by_dim[d].push(face.into_iter().collect());
        }
    }
    by_dim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::{mother_of_all_examples, reflexive_simplex_4d, reflexive_square};

    #[test]
    fn square_faces_and_reflexivity() {
        let sq = reflexive_square();
        assert_eq!(sq.dim(), 2);
        assert!(sq.is_reflexive());
        assert_eq!(sq.faces(0).len(), 4);
        assert_eq!(sq.faces(1).len(), 4);
        assert!(sq.faces(1).iter().all(|e| e.len() == 3));
        assert_eq!(sq.faces(2).len(), 1);
        assert_eq!(sq.origin(), Some(0));
        assert_eq!(sq.automorphisms().len(), 8);
        assert_eq!(sq.automorphisms()[0], (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn simplex_4d_is_reflexive_with_five_facets() {
        let p = reflexive_simplex_4d();
        assert_eq!(p.dim(), 4);
        assert_eq!(p.facets().len(), 5);
        assert!(p.is_reflexive());
        assert_eq!(p.faces(0).len(), 5);
        assert_eq!(p.faces(3).len(), 5);
        // the point (0,0,-2,-3) lies on exactly two facets
        let six = p.label_of(&[0, 0, -2, -3]).unwrap();
        let on: usize = (0..5).filter(|&f| p.facet_points(f).contains(&six)).count();
        assert_eq!(on, 2);
    }

    #[test]
    fn triangle_is_not_reflexive() {
        let p = mother_of_all_examples();
        assert!(!p.is_reflexive());
        assert_eq!(p.len(), 15);
        assert_eq!(p.faces(1).len(), 3);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(LatticePolytope::new(vec![], vec![]).is_err());
        let pts = vec![vec![0, 0], vec![1, 0], vec![0, 1]];
        let bad = vec![Facet::new(vec![1, 1], 0)];
        assert!(matches!(
            LatticePolytope::new(pts.clone(), bad),
            Err(TriangError::InvalidInput { .. })
        ));
        let dup = vec![vec![0, 0], vec![0, 0]];
        assert!(LatticePolytope::new(dup, vec![]).is_err());
        let p = LatticePolytope::new(pts, vec![]).unwrap();
        assert!(p.clone().with_automorphisms(vec![vec![0, 0, 1]]).is_err());
    }

    #[test]
    fn facet_normals_become_primitive() {
        let pts = vec![vec![0, 0], vec![1, 0], vec![0, 1]];
        let facets = vec![
            Facet::new(vec![-2, 0], 0),
            Facet::new(vec![0, -1], 0),
            Facet::new(vec![3, 3], 3),
        ];
        let p = LatticePolytope::new(pts, facets).unwrap();
        assert_eq!(p.facets()[0].normal, vec![-1, 0]);
        assert_eq!(p.facets()[2], Facet::new(vec![1, 1], 1));
    }
}

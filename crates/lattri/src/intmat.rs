//! Exact integer linear algebra on small dense matrices.
//!
//! Purpose
//! - Determinants, ranks and nullspaces of homogenized point matrices, where the
//!   answers feed combinatorial decisions (simplex volumes, wall normals) and must
//!   be exact.
//! - A unimodular lattice chart for point sets that do not span their ambient space.
//!
//! Why this design
//! - Matrices here are at most a few dozen entries wide, so fraction-free
//!   elimination in `i128` stays exact without big integers.
//! - Nullspaces are only ever needed for full-rank `r × (r+1)` matrices, where the
//!   signed maximal minors give the (unique up to scale) kernel vector directly.

/// Greatest common divisor, always non-negative.
#[inline]
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a as i64
}

/// gcd of all entries; 0 for an empty or all-zero slice.
pub fn gcd_list(v: &[i64]) -> i64 {
    v.iter().fold(0, |g, &x| gcd(g, x))
}

/// Divide by the gcd of the entries (no-op for the zero vector).
pub fn primitive(v: &mut [i64]) {
    let g = gcd_list(v);
    if g > 1 {
        for x in v.iter_mut() {
            *x /= g;
        }
    }
}

/// Determinant of a square integer matrix (Bareiss fraction-free elimination).
///
/// Rows must all have length `m.len()`. The empty matrix has determinant 1.
pub fn det(m: &[Vec<i64>]) -> i128 {
    let n = m.len();
    if n == 0 {
        return 1;
    }
    let mut a: Vec<Vec<i128>> = m
        .iter()
        .map(|r| r.iter().map(|&x| x as i128).collect())
        .collect();
    let mut sign = 1i128;
    let mut prev = 1i128;
    for k in 0..n - 1 {
        if a[k][k] == 0 {
            let Some(p) = (k + 1..n).find(|&i| a[i][k] != 0) else {
                return 0;
            };
            a.swap(k, p);
            sign = -sign;
        }
        for i in k + 1..n {
            for j in k + 1..n {
                a[i][j] = (a[i][j] * a[k][k] - a[i][k] * a[k][j]) / prev;
            }
        }
        prev = a[k][k];
    }
    sign * a[n - 1][n - 1]
}

/// Rank of an integer matrix (any shape).
pub fn rank(m: &[Vec<i64>]) -> usize {
    let rows = m.len();
    if rows == 0 {
        return 0;
    }
    let cols = m[0].len();
    let mut a: Vec<Vec<i128>> = m
        .iter()
        .map(|r| r.iter().map(|&x| x as i128).collect())
        .collect();
    let mut r = 0;
    for c in 0..cols {
        if r == rows {
            break;
        }
        let Some(p) = (r..rows).find(|&i| a[i][c] != 0) else {
            continue;
        };
        a.swap(r, p);
        for i in r + 1..rows {
            if a[i][c] == 0 {
                continue;
            }
            let (piv, lead) = (a[r][c], a[i][c]);
            for j in c..cols {
                a[i][j] = a[i][j] * piv - a[r][j] * lead;
            }
            reduce_row(&mut a[i]);
        }
        r += 1;
    }
    r
}

fn reduce_row(row: &mut [i128]) {
    let mut g: u128 = 0;
    for &x in row.iter() {
        let (mut p, mut q) = (g, x.unsigned_abs());
        while q != 0 {
            (p, q) = (q, p % q);
        }
        g = p;
    }
    if g > 1 {
        for x in row.iter_mut() {
            *x /= g as i128;
        }
    }
}

/// Primitive kernel vector of a full-rank `r × (r+1)` integer matrix.
///
/// Entry `j` is `(-1)^j · det(M without column j)`, divided by the gcd. Returns
/// `None` when the matrix has the wrong shape or is rank deficient (all minors vanish).
/// The sign is not normalized.
pub fn nullspace_vector(m: &[Vec<i64>]) -> Option<Vec<i64>> {
    let r = m.len();
    if m.iter().any(|row| row.len() != r + 1) {
        return None;
    }
    let mut v = Vec::with_capacity(r + 1);
    for j in 0..=r {
        let minor: Vec<Vec<i64>> = m
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(c, _)| c != j)
                    .map(|(_, &x)| x)
                    .collect()
            })
            .collect();
        let d = det(&minor);
        let d = i64::try_from(d).ok()?;
        v.push(if j % 2 == 0 { d } else { -d });
    }
    if v.iter().all(|&x| x == 0) {
        return None;
    }
    primitive(&mut v);
    Some(v)
}

/// Affine lattice coordinates for a point set of rank `k` below its ambient dimension.
///
/// Centers at the first point, then runs unimodular column operations (extended
/// Euclid on each row in turn) until only `k` nonzero columns remain. The returned
/// rows have length `k`; lattice distances and volumes in the affine span are preserved.
pub fn lattice_chart(points: &[Vec<i64>]) -> Vec<Vec<i64>> {
    let Some(base) = points.first() else {
        return Vec::new();
    };
    let cols = base.len();
    let mut a: Vec<Vec<i64>> = points
        .iter()
        .map(|p| p.iter().zip(base).map(|(x, b)| x - b).collect())
        .collect();
    let mut k = 0;
    for r in 0..a.len() {
        if k == cols {
            break;
        }
        loop {
            let pivot = (k..cols)
                .filter(|&c| a[r][c] != 0)
                .min_by_key(|&c| a[r][c].unsigned_abs());
            let Some(p) = pivot else { break };
            swap_cols(&mut a, k, p);
            let mut clean = true;
            for c in k + 1..cols {
                if a[r][c] == 0 {
                    continue;
                }
                let q = a[r][c] / a[r][k];
                for row in a.iter_mut() {
                    row[c] -= q * row[k];
                }
                if a[r][c] != 0 {
                    clean = false;
                }
            }
            if clean {
                break;
            }
        }
        if a[r][k] != 0 {
            k += 1;
        }
    }
    a.into_iter().map(|mut row| {
        row.truncate(k);
        row
    })
    .collect()
}

fn swap_cols(a: &mut [Vec<i64>], i: usize, j: usize) {
    if i != j {
        for row in a.iter_mut() {
            row.swap(i, j);
        }
    }
}

/// `(p, 1)`.
#[inline]
pub(crate) fn homogenize(p: &[i64]) -> Vec<i64> {
    let mut h = Vec::with_capacity(p.len() + 1);
    h.extend_from_slice(p);
    h.push(1);
    h
}

/// Normalized volume of the simplex on `verts` (absolute determinant of the
/// homogenized vertex matrix). `verts` must hold `dim + 1` points of dimension `dim`.
pub(crate) fn simplex_volume(verts: &[&[i64]]) -> u64 {
    let m: Vec<Vec<i64>> = verts.iter().map(|p| homogenize(p)).collect();
    det(&m).unsigned_abs() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(12, -18), 6);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd_list(&[4, 6, -10]), 2);
        let mut v = vec![-6, 9, 0];
        primitive(&mut v);
        assert_eq!(v, vec![-2, 3, 0]);
    }

    #[test]
    fn det_small_matrices() {
        assert_eq!(det(&[]), 1);
        assert_eq!(det(&[vec![3]]), 3);
        assert_eq!(det(&[vec![1, 2], vec![3, 4]]), -2);
        // needs a row swap
        assert_eq!(det(&[vec![0, 1, 0], vec![1, 0, 0], vec![0, 0, 1]]), -1);
        assert_eq!(det(&[vec![1, 2], vec![2, 4]]), 0);
    }

    #[test]
    fn rank_detects_dependencies() {
        assert_eq!(rank(&[vec![1, 2, 3], vec![2, 4, 6]]), 1);
        assert_eq!(rank(&[vec![0, 0], vec![0, 1], vec![1, 0]]), 2);
        assert_eq!(rank(&[vec![0, 0, 0]]), 0);
    }

    #[test]
    fn nullspace_of_affine_circuit() {
        // (0,0),(1,0),(0,1),(1,1) homogenized: relation p0 - p1 - p2 + p3 = 0
        let m = vec![vec![0, 1, 0, 1], vec![0, 0, 1, 1], vec![1, 1, 1, 1]];
        let v = nullspace_vector(&m).unwrap();
        let v = if v[0] < 0 { v.iter().map(|x| -x).collect() } else { v };
        assert_eq!(v, vec![1, -1, -1, 1]);
        assert!(nullspace_vector(&[vec![1, 1, 1], vec![2, 2, 2]]).is_none());
    }

    #[test]
    fn chart_of_plane_in_space() {
        let pts = vec![vec![0, 0, 1], vec![1, 0, 1], vec![0, 1, 1], vec![1, 1, 1]];
        let chart = lattice_chart(&pts);
        assert!(chart.iter().all(|r| r.len() == 2));
        let hom: Vec<Vec<i64>> = chart.iter().map(|p| homogenize(p)).collect();
        assert_eq!(rank(&hom), 3);
        // unit square keeps normalized area 2 under a unimodular chart
        let a = simplex_volume(&[&chart[0], &chart[1], &chart[2]]);
        let b = simplex_volume(&[&chart[1], &chart[2], &chart[3]]);
        assert_eq!(a + b, 2);
    }

    proptest! {
        #[test]
        fn nullspace_annihilates(rows in proptest::collection::vec(
            proptest::collection::vec(-5i64..=5, 4), 3)) {
            if let Some(v) = nullspace_vector(&rows) {
                for row in &rows {
                    let s: i64 = row.iter().zip(&v).map(|(a, b)| a * b).sum();
                    prop_assert_eq!(s, 0);
                }
                prop_assert_eq!(gcd_list(&v), 1);
            } else {
                prop_assert!(rank(&rows) < 3);
            }
        }

        #[test]
        fn chart_preserves_rank(pts in proptest::collection::vec(
            proptest::collection::vec(-4i64..=4, 3), 1..6)) {
            // embed into a hyperplane x3 = 2 x1 - x2 to force a drop in rank
            let pts: Vec<Vec<i64>> = pts.iter().map(|p| vec![p[0], p[1], 2 * p[0] - p[1]]).collect();
            let hom: Vec<Vec<i64>> = pts.iter().map(|p| homogenize(p)).collect();
            let chart = lattice_chart(&pts);
            let hom_chart: Vec<Vec<i64>> = chart.iter().map(|p| homogenize(p)).collect();
            prop_assert_eq!(rank(&hom), rank(&hom_chart));
            prop_assert_eq!(chart[0].len() + 1, rank(&hom));
        }
    }
}

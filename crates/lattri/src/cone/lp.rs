//! Exact phase-one simplex for `H x >= 1` over the rationals.
//!
//! Variables are `x = p - q` with `p, q >= 0`, one surplus `s_i` and one artificial
//! `a_i` per row: `H p - H q - s + a = 1`. Minimizing `sum(a)` from the artificial
//! basis reaches zero iff the system is feasible. Bland's rule (lowest index
//! enters, lowest basic index breaks ratio ties) terminates in exact arithmetic,
//! so there is no iteration cap.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// A rational point with `h·x >= 1` for every row `h`, or `None` if there is none.
///
/// Every row must have length `n`.
pub(crate) fn strictly_feasible_point(rows: &[Vec<i64>], n: usize) -> Option<Vec<BigRational>> {
    let m = rows.len();
    if m == 0 {
        return Some(vec![BigRational::zero(); n]);
    }
    let cols = 2 * n + 2 * m;
    let rhs = cols;
    let int = |v: i64| BigRational::from_integer(BigInt::from(v));
    let mut t: Vec<Vec<BigRational>> = Vec::with_capacity(m);
    for (i, h) in rows.iter().enumerate() {
        debug_assert_eq!(h.len(), n);
        let mut row = vec![BigRational::zero(); cols + 1];
        for (j, &v) in h.iter().enumerate() {
            row[j] = int(v);
            row[n + j] = int(-v);
        }
        row[2 * n + i] = int(-1);
        row[2 * n + m + i] = BigRational::one();
        row[rhs] = BigRational::one();
        t.push(row);
    }
    // reduced costs of sum(a) against the artificial basis; obj[rhs] = -sum(a)
    let mut obj = vec![BigRational::zero(); cols + 1];
    for row in &t {
        for j in 0..2 * n + m {
            obj[j] -= &row[j];
        }
        obj[rhs] -= &row[rhs];
    }
    let mut basis: Vec<usize> = (2 * n + m..cols).collect();
    while let Some(enter) = (0..cols).find(|&j| obj[j].is_negative()) {
        let mut leave: Option<(BigRational, usize)> = None;
        for i in 0..m {
            if !t[i][enter].is_positive() {
                continue;
            }
            let ratio = &t[i][rhs] / &t[i][enter];
            let better = match &leave {
                None => true,
                Some((best, k)) => ratio < *best || (ratio == *best && basis[i] < basis[*k]),
            };
            if better {
                leave = Some((ratio, i));
            }
        }
        // the phase-one objective is bounded below by zero
        let (_, row) = leave?;
        pivot(&mut t, &mut obj, row, enter);
        basis[row] = enter;
    }
    if !obj[rhs].is_zero() {
        return None;
    }
    let mut x = vec![BigRational::zero(); n];
    for (i, &var) in basis.iter().enumerate() {
        if var < n {
            x[var] += &t[i][rhs];
        } else if var < 2 * n {
            x[var - n] -= &t[i][rhs];
        }
    }
    Some(x)
}

fn pivot(t: &mut [Vec<BigRational>], obj: &mut [BigRational], row: usize, col: usize) {
    let p = t[row][col].clone();
    for v in t[row].iter_mut() {
        *v /= &p;
    }
    let pivot_row = t[row].clone();
    let eliminate = |target: &mut [BigRational]| {
        let f = target[col].clone();
        if f.is_zero() {
            return;
        }
        for (v, w) in target.iter_mut().zip(&pivot_row) {
            if !w.is_zero() {
                *v -= &f * w;
            }
        }
    };
    for (i, r) in t.iter_mut().enumerate() {
        if i != row {
            eliminate(r.as_mut_slice());
        }
    }
    eliminate(obj);
}

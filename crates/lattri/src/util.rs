//! Simplex canonicalization.

/// Sort every simplex, then the collection, and drop duplicates.
pub(crate) fn canonicalize(simplices: &mut Vec<Vec<usize>>) {
    for s in simplices.iter_mut() {
        s.sort_unstable();
    }
    simplices.sort();
    simplices.dedup();
}

/// Apply a point permutation to a simplex list and return the canonical image.
pub(crate) fn permute_simplices(simplices: &[Vec<usize>], perm: &[usize]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = simplices
        .iter()
        .map(|s| s.iter().map(|&i| perm[i]).collect())
        .collect();
    canonicalize(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_sorts_and_dedups() {
        let mut s = vec![vec![2, 0, 1], vec![1, 0, 2], vec![0, 3, 1]];
        canonicalize(&mut s);
        assert_eq!(s, vec![vec![0, 1, 2], vec![0, 1, 3]]);
    }

    #[test]
    fn permute_is_canonical() {
        let s = vec![vec![0, 1], vec![1, 2]];
        assert_eq!(permute_simplices(&s, &[2, 1, 0]), vec![vec![0, 1], vec![1, 2]]);
    }
}

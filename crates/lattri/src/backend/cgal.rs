//! CGAL regular triangulations over a process boundary.
//!
//! Protocol: stdin is the point literal immediately followed by the heights as a
//! parenthesized tuple, e.g. `[[0, 0], [1, 0], [0, 1]](0.0, 1.0, 1.0)`; stdout is a
//! nested list of simplices. Any stderr output or nonzero exit is a failure.

use std::path::Path;

use crate::error::{Result, TriangError};
use crate::util::canonicalize;

use super::process::{describe_exit, list_literal, parse_simplices, run, tool_path};

/// Executable name for points of dimension `dim`.
pub fn binary_name(dim: usize) -> String {
    if (2..=5).contains(&dim) {
        format!("cgal-triangulate-{dim}d")
    } else {
        "cgal-triangulate".to_string()
    }
}

/// Regular triangulation of `points` lifted by `heights` (canonical order).
pub fn triangulate(dir: &Path, points: &[Vec<i64>], heights: &[f64]) -> Result<Vec<Vec<usize>>> {
    if heights.len() != points.len() {
        return Err(TriangError::invalid(format!(
            "{} heights for {} points",
            heights.len(),
            points.len()
        )));
    }
    let dim = points.first().map_or(0, Vec::len);
    let name = binary_name(dim);
    let heights_str: Vec<String> = heights.iter().map(|h| format!("{h:?}")).collect();
    let input = format!("{}({})", list_literal(points), heights_str.join(", "));
    let out = run(&tool_path(dir, &name), &[], &input)?;
    if !out.stderr.trim().is_empty() {
        return Err(TriangError::tool(&name, out.stderr.trim()));
    }
    if !out.status.success() {
        return Err(TriangError::tool(&name, describe_exit(&out.status)));
    }
    let mut simplices = parse_simplices(&name, &out.stdout)?;
    canonicalize(&mut simplices);
    Ok(simplices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_names_by_dimension() {
        assert_eq!(binary_name(2), "cgal-triangulate-2d");
        assert_eq!(binary_name(5), "cgal-triangulate-5d");
        assert_eq!(binary_name(6), "cgal-triangulate");
        assert_eq!(binary_name(1), "cgal-triangulate");
    }
}

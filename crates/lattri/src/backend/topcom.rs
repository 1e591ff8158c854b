//! TOPCOM over a process boundary: fine regular triangulations, flip neighbors,
//! and full enumeration.
//!
//! Protocol (all commands): stdin starts with the homogenized point literal
//! `[[x, y, 1], …]` followed by an empty symmetry list `[]`.
//! - `topcom-points2finetriang --regular`: stdout is one triangulation in braces.
//! - `topcom-points2flips`: the request appends the seed triangulation in braces
//!   and `(-1)` (unbounded flip depth); stdout has one neighbor per line.
//! - `topcom-points2alltriangs` / `topcom-points2allfinetriangs`: one
//!   `T[i] := {…};`-style record per line.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TriangError};
use crate::util::canonicalize;

use super::process::{
    brace_literal, describe_exit, homogenized_literal, parse_simplices, run, tool_path,
};
use super::FlipOracle;

const FINE_TRIANG: &str = "topcom-points2finetriang";
const FLIPS: &str = "topcom-points2flips";
const ALL_TRIANGS: &str = "topcom-points2alltriangs";
const ALL_FINE_TRIANGS: &str = "topcom-points2allfinetriangs";

/// A fine regular triangulation of `points` (canonical order).
pub fn fine_regular_triangulation(dir: &Path, points: &[Vec<i64>]) -> Result<Vec<Vec<usize>>> {
    let input = format!("{}[]", homogenized_literal(points));
    let out = run(&tool_path(dir, FINE_TRIANG), &["--regular"], &input)?;
    if !out.status.success() {
        return Err(TriangError::tool(
            FINE_TRIANG,
            format!("{}: {}", describe_exit(&out.status), out.stderr.trim()),
        ));
    }
    let mut simplices = parse_simplices(FINE_TRIANG, &out.stdout)?;
    canonicalize(&mut simplices);
    Ok(simplices)
}

/// Every triangulation of `points` (only fine ones if `only_fine`), each canonical.
///
/// Single-shot: a nonzero exit is an error.
pub fn all_triangulations(
    dir: &Path,
    points: &[Vec<i64>],
    only_fine: bool,
) -> Result<Vec<Vec<Vec<usize>>>> {
    let name = if only_fine { ALL_FINE_TRIANGS } else { ALL_TRIANGS };
    let input = format!("{}[]", homogenized_literal(points));
    let out = run(&tool_path(dir, name), &[], &input)?;
    if !out.status.success() {
        return Err(TriangError::tool(
            name,
            format!("{}: {}", describe_exit(&out.status), out.stderr.trim()),
        ));
    }
    let mut triangs = Vec::new();
    for line in out.stdout.lines() {
        let Some(body) = braced_record(line) else {
            continue;
        };
        let mut t = parse_simplices(name, body)?;
        canonicalize(&mut t);
        triangs.push(t);
    }
    debug!(tool = name, count = triangs.len(), "enumerated triangulations");
    Ok(triangs)
}

/// The outermost `{…}` of a record line, provided no `:` sits inside it.
fn braced_record(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    let body = &line[start..=end];
    (end > start && !body.contains(':')).then_some(body)
}

/// Flip oracle backed by `topcom-points2flips`.
#[derive(Clone, Debug, Default)]
pub struct TopcomFlips {
    dir: PathBuf,
}

impl TopcomFlips {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl FlipOracle for TopcomFlips {
    fn flips(&self, points: &[Vec<i64>], simplices: &[Vec<usize>]) -> Result<Vec<Vec<Vec<usize>>>> {
        let input = format!(
            "{}[]{}(-1)",
            homogenized_literal(points),
            brace_literal(simplices)
        );
        let out = run(&tool_path(&self.dir, FLIPS), &[], &input)?;
        if !out.status.success() {
            warn!(
                tool = FLIPS,
                status = %describe_exit(&out.status),
                "flip enumeration failed; returning no neighbors"
            );
            return Ok(Vec::new());
        }
        if !out.stderr.trim().is_empty() {
            debug!(tool = FLIPS, stderr = %out.stderr.trim(), "tool diagnostics");
        }
        out.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| parse_simplices(FLIPS, l))
            .collect()
    }
}

//! Triangulation providers and the flip oracle.
//!
//! Purpose
//! - One closed set of providers (`Backend`) that turn a lifted point set into a
//!   list of simplices, so triangulation code never branches on where a result
//!   came from, only on its shape.
//! - One capability (`FlipOracle`) for enumerating bistellar-flip neighbors.
//!
//! Why this design
//! - `Native` runs in-process and is the default; `Cgal` and `Topcom` shell out to
//!   external executables with a literal-text protocol (see `process`).
//! - Tool locations live in a `Toolchain` value passed to whoever needs it, not in
//!   global state. Tests swap in their own `FlipOracle`.

pub mod cgal;
pub mod native;
pub(crate) mod process;
pub mod topcom;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, TriangError};

pub use topcom::TopcomFlips;

/// Environment variable naming the directory with the `cgal-triangulate-*` executables.
pub const CGAL_DIR_ENV: &str = "LATTRI_CGAL_DIR";
/// Environment variable naming the directory with the `topcom-*` executables.
pub const TOPCOM_DIR_ENV: &str = "LATTRI_TOPCOM_DIR";

/// Regular-triangulation provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// In-process lower hull of the lifted points (accepts the name `"qhull"` too).
    #[default]
    Native,
    /// External `cgal-triangulate-{d}d`.
    Cgal,
    /// External `topcom-points2finetriang --regular`; ignores heights.
    Topcom,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Cgal => "cgal",
            Self::Topcom => "topcom",
        }
    }

    /// Whether the provider consumes a height vector.
    #[inline]
    pub fn takes_heights(self) -> bool {
        !matches!(self, Self::Topcom)
    }

    /// Heights used when the caller supplies none: Delaunay `|p|²` for height
    /// providers, nothing for `Topcom`.
    pub fn default_heights(self, points: &[Vec<i64>]) -> Option<Vec<f64>> {
        self.takes_heights().then(|| delaunay_heights(points))
    }
}

impl FromStr for Backend {
    type Err = TriangError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "qhull" => Ok(Self::Native),
            "cgal" => Ok(Self::Cgal),
            "topcom" => Ok(Self::Topcom),
            other => Err(TriangError::invalid(format!(
                "unknown backend {other:?}; options are native (qhull), cgal, topcom"
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `|p|²` per point.
pub fn delaunay_heights(points: &[Vec<i64>]) -> Vec<f64> {
    points
        .iter()
        .map(|p| p.iter().map(|&x| (x * x) as f64).sum())
        .collect()
}

/// Enumerates triangulations one bistellar flip away.
pub trait FlipOracle: Send + Sync {
    /// `points` are affine coordinates (not homogenized); `simplices` index into them.
    ///
    /// A tool that runs but fails should yield `Ok(vec![])`; unreadable output is an error.
    fn flips(&self, points: &[Vec<i64>], simplices: &[Vec<usize>]) -> Result<Vec<Vec<Vec<usize>>>>;
}

/// Where the external executables live, plus an optional flip-oracle override.
#[derive(Clone, Default)]
pub struct Toolchain {
    /// Directory of the CGAL executables; empty means `PATH` lookup.
    pub cgal_dir: PathBuf,
    /// Directory of the TOPCOM executables; empty means `PATH` lookup.
    pub topcom_dir: PathBuf,
    flip_oracle: Option<Arc<dyn FlipOracle>>,
}

impl Toolchain {
    /// Read `LATTRI_CGAL_DIR` and `LATTRI_TOPCOM_DIR` (unset means `PATH` lookup).
    pub fn from_env() -> Self {
        let dir = |key: &str| std::env::var_os(key).map(PathBuf::from).unwrap_or_default();
        Self {
            cgal_dir: dir(CGAL_DIR_ENV),
            topcom_dir: dir(TOPCOM_DIR_ENV),
            flip_oracle: None,
        }
    }

    /// Use `oracle` for flip enumeration instead of TOPCOM.
    pub fn with_flip_oracle(mut self, oracle: Arc<dyn FlipOracle>) -> Self {
        self.flip_oracle = Some(oracle);
        self
    }

    /// The configured flip oracle (TOPCOM `points2flips` unless overridden).
    pub fn flip_oracle(&self) -> Arc<dyn FlipOracle> {
        match &self.flip_oracle {
            Some(o) => Arc::clone(o),
            None => Arc::new(TopcomFlips::new(self.topcom_dir.clone())),
        }
    }

    /// Run `backend` on affine `points` with optional `heights`; returns canonical simplices.
    ///
    /// Height providers require heights; `Topcom` rejects them.
    pub fn triangulate(
        &self,
        backend: Backend,
        points: &[Vec<i64>],
        heights: Option<&[f64]>,
    ) -> Result<Vec<Vec<usize>>> {
        match (backend, heights) {
            (Backend::Native, Some(h)) => native::regular_triangulation(points, h),
            (Backend::Cgal, Some(h)) => cgal::triangulate(&self.cgal_dir, points, h),
            (Backend::Topcom, None) => topcom::fine_regular_triangulation(&self.topcom_dir, points),
            (Backend::Topcom, Some(_)) => Err(TriangError::invalid(
                "heights can only be given to the native or cgal backends",
            )),
            (b, None) => Err(TriangError::invalid(format!("the {b} backend needs heights"))),
        }
    }
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolchain")
            .field("cgal_dir", &self.cgal_dir)
            .field("topcom_dir", &self.topcom_dir)
            .field("custom_flip_oracle", &self.flip_oracle.is_some())
            .finish()
    }
}

//! Triangulations of lattice point configurations.
//!
//! Purpose
//! - Own one point configuration and a canonical simplex list, and answer the
//!   structural questions about it: validity, fineness, starness, regularity,
//!   secondary cone and heights, flip neighbors, symmetry orbits, GKZ vector and
//!   Stanley–Reisner ideal.
//!
//! Why this design
//! - Simplices are canonicalized once at construction (each sorted, list sorted,
//!   duplicates dropped); equality and hashing use that form directly.
//! - After construction (and the optional star-ification that belongs to it) the
//!   simplex list never changes. Every query is cache population on `&mut self`.
//! - Providers are resolved through `Backend` and `Toolchain`; nothing here
//!   branches on how a simplex list was produced.
//!
//! Layout
//! - `validity`: fineness, starness, validity, height checks, face restriction.
//! - `secondary`: secondary cone, regularity, heights.
//! - `star`: star-ification.
//! - `flips`: neighbor enumeration and random walks.
//! - `symmetry`: automorphism orbits and equivalence.
//! - `invariants`: GKZ vector and Stanley–Reisner ideal.

mod flips;
mod invariants;
mod secondary;
mod star;
mod symmetry;
mod validity;


use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{Backend, Toolchain};
use crate::cone::Cone;
use crate::error::{Result, TriangError};
use crate::points::PointConfig;
use crate::polytope::LatticePolytope;
use crate::util::canonicalize;

pub use flips::NeighborFilter;
pub use secondary::ConeMethod;

/// How to build a triangulation.
///
/// Either `simplices` are given (and `heights` must be `None`), or the `backend`
/// computes a regular triangulation from `heights` (defaults per backend).
#[derive(Clone, Debug)]
pub struct TriangulateOpts {
    pub heights: Option<Vec<f64>>,
    pub simplices: Option<Vec<Vec<usize>>>,
    /// Turn the result into a star triangulation about the origin (ignored when the
    /// configuration has no origin).
    pub make_star: bool,
    /// Require supplied simplices to pass `is_valid`.
    pub check_input_simplices: bool,
    /// Drop heights that sit within tolerance of a secondary-cone wall.
    pub check_heights: bool,
    pub backend: Backend,
    pub tools: Toolchain,
}

impl Default for TriangulateOpts {
    fn default() -> Self {
        Self {
            heights: None,
            simplices: None,
            make_star: false,
            check_input_simplices: true,
            check_heights: true,
            backend: Backend::default(),
            tools: Toolchain::from_env(),
        }
    }
}

impl TriangulateOpts {
    pub fn with_heights(heights: Vec<f64>) -> Self {
        Self {
            heights: Some(heights),
            ..Self::default()
        }
    }

    pub fn with_simplices(simplices: Vec<Vec<usize>>) -> Self {
        Self {
            simplices: Some(simplices),
            ..Self::default()
        }
    }

    pub fn star(mut self, make_star: bool) -> Self {
        self.make_star = make_star;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn tools(mut self, tools: Toolchain) -> Self {
        self.tools = tools;
        self
    }

    pub fn check_input_simplices(mut self, check: bool) -> Self {
        self.check_input_simplices = check;
        self
    }

    pub fn check_heights(mut self, check: bool) -> Self {
        self.check_heights = check;
        self
    }
}

/// Lazily filled query results. Cleared only by `Triangulation::clear_cache`.
#[derive(Clone, Debug, Default)]
struct Cache {
    fine: Option<bool>,
    star: Option<bool>,
    regular: Option<bool>,
    valid: Option<bool>,
    /// Indexed by "include points not in the triangulation".
    cones: [Option<Cone>; 2],
    gkz: Option<Vec<i64>>,
    sr_ideal: Option<Vec<Vec<usize>>>,
    orbits: HashMap<(Option<Vec<usize>>, usize), Vec<Vec<Vec<usize>>>>,
    restricted: HashMap<usize, Vec<BTreeSet<Vec<usize>>>>,
}

/// A triangulation of a point configuration drawn from a lattice polytope.
///
/// Invariants:
/// - Every simplex has `dim() + 1` distinct local indices, sorted ascending.
/// - The simplex list is sorted and duplicate-free.
/// - `heights`, when present, has one entry per configuration point and realizes
///   the simplices as the lower hull of the lifted points.
#[derive(Clone, Debug)]
pub struct Triangulation {
    poly: Arc<LatticePolytope>,
    config: PointConfig,
    simplices: Vec<Vec<usize>>,
    heights: Option<Vec<f64>>,
    backend: Backend,
    tools: Toolchain,
    cache: Cache,
}

impl Triangulation {
    /// Triangulate the points with polytope labels `labels`.
    pub fn new(poly: Arc<LatticePolytope>, labels: &[usize], opts: TriangulateOpts) -> Result<Self> {
        let config = PointConfig::new(&poly, labels)?;
        let make_star = opts.make_star && config.origin().is_some();
        let mut t = Self {
            poly,
            config,
            simplices: Vec::new(),
            heights: None,
            backend: opts.backend,
            tools: opts.tools,
            cache: Cache::default(),
        };
        match opts.simplices {
            Some(simplices) => {
                if opts.heights.is_some() {
                    return Err(TriangError::invalid(
                        "give either simplices or heights, not both",
                    ));
                }
                t.simplices = t.checked_simplices(simplices)?;
                if make_star {
                    t.simplices = star::facet_star(&t)?;
                }
                if opts.check_input_simplices && !t.is_valid()? {
                    return Err(TriangError::invalid(
                        "simplices do not form a valid triangulation",
                    ));
                }
            }
            None => t.triangulate_from_heights(opts.heights, make_star, opts.check_heights)?,
        }
        Ok(t)
    }

    /// Trusted-or-checked construction from explicit simplices.
    pub fn from_simplices(
        poly: Arc<LatticePolytope>,
        labels: &[usize],
        simplices: Vec<Vec<usize>>,
        check: bool,
    ) -> Result<Self> {
        Self::new(
            poly,
            labels,
            TriangulateOpts::with_simplices(simplices).check_input_simplices(check),
        )
    }

    fn triangulate_from_heights(
        &mut self,
        heights: Option<Vec<f64>>,
        make_star: bool,
        check_heights: bool,
    ) -> Result<()> {
        let defaulted = heights.is_none();
        let heights = match heights {
            Some(h) if h.len() != self.config.len() => {
                return Err(TriangError::invalid(format!(
                    "need one height per point: got {} for {} points",
                    h.len(),
                    self.config.len()
                )));
            }
            Some(_) if !self.backend.takes_heights() => {
                return Err(TriangError::invalid(format!(
                    "the {} backend does not accept heights",
                    self.backend
                )));
            }
            Some(h) => Some(h),
            None => self.backend.default_heights(self.config.optimal()),
        };
        self.heights = heights;
        self.simplices =
            self.tools
                .triangulate(self.backend, self.config.optimal(), self.heights.as_deref())?;
        canonicalize(&mut self.simplices);
        self.check_shape()?;
        let mut presumed_regular = true;
        if make_star {
            if self.backend.takes_heights() {
                star::lower_origin(self)?;
            } else {
                self.simplices = star::facet_star(self)?;
                presumed_regular = false;
            }
        }
        canonicalize(&mut self.simplices);
        self.check_shape()?;
        if presumed_regular {
            self.cache.regular = Some(true);
        }
        self.cache.valid = Some(true);
        if check_heights && self.heights.is_some() {
            self.check_heights_logged(defaulted);
        }
        debug!(
            backend = %self.backend,
            simplices = self.simplices.len(),
            points = self.config.len(),
            "triangulated from heights"
        );
        Ok(())
    }

    /// Same configuration, new simplices, empty caches. Input is canonicalized.
    pub(crate) fn sibling(&self, mut simplices: Vec<Vec<usize>>) -> Self {
        canonicalize(&mut simplices);
        Self {
            poly: Arc::clone(&self.poly),
            config: self.config.clone(),
            simplices,
            heights: None,
            backend: self.backend,
            tools: self.tools.clone(),
            cache: Cache::default(),
        }
    }

    /// Shape checks that every later query relies on: uniform size `dim + 1`,
    /// indices in range, no repeated vertex. Returns the canonical form.
    fn checked_simplices(&self, mut simplices: Vec<Vec<usize>>) -> Result<Vec<Vec<usize>>> {
        canonicalize(&mut simplices);
        check_simplex_shape(&simplices, self.dim(), self.config.len())?;
        Ok(simplices)
    }

    fn check_shape(&self) -> Result<()> {
        check_simplex_shape(&self.simplices, self.dim(), self.config.len())
    }

    /// Drop every lazily computed result. Heights and simplices are kept.
    pub fn clear_cache(&mut self) {
        self.cache = Cache::default();
    }

    #[inline]
    pub fn polytope(&self) -> &Arc<LatticePolytope> {
        &self.poly
    }

    #[inline]
    pub fn config(&self) -> &PointConfig {
        &self.config
    }

    /// Ambient coordinates of the configuration points, in local index order.
    #[inline]
    pub fn points(&self) -> &[Vec<i64>] {
        self.config.points()
    }

    /// Polytope labels of the configuration points, in local index order.
    #[inline]
    pub fn point_labels(&self) -> &[usize] {
        self.config.labels()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.config.dim()
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.config.ambient_dim()
    }

    #[inline]
    pub fn is_full_dim(&self) -> bool {
        self.config.is_full_dim()
    }

    /// Canonical simplex list (local indices).
    #[inline]
    pub fn simplices(&self) -> &[Vec<usize>] {
        &self.simplices
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[inline]
    pub fn tools(&self) -> &Toolchain {
        &self.tools
    }

    /// Heights known without further computation.
    #[inline]
    pub fn known_heights(&self) -> Option<&[f64]> {
        self.heights.as_deref()
    }

    /// Local indices of ambient points.
    pub fn points_to_indices(&self, pts: &[Vec<i64>]) -> Result<Vec<usize>> {
        self.config.indices_of(pts)
    }

    /// Polytope labels of local indices.
    pub fn indices_to_labels(&self, indices: &[usize]) -> Result<Vec<usize>> {
        indices
            .iter()
            .map(|&i| {
                self.config.labels().get(i).copied().ok_or_else(|| {
                    TriangError::invalid(format!("index {i} out of range for {} points", self.config.len()))
                })
            })
            .collect()
    }

    /// Local indices of polytope labels.
    pub fn labels_to_indices(&self, labels: &[usize]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|&l| {
                self.config.index_of_label(l).ok_or_else(|| {
                    TriangError::invalid(format!("label {l} is not in the point configuration"))
                })
            })
            .collect()
    }

    /// One simplex whose vertices are all the points.
    #[inline]
    pub(crate) fn is_trivial(&self) -> bool {
        self.simplices.len() == 1 && self.simplices[0].len() == self.config.len()
    }

    /// `check_heights` that logs near-wall heights at debug level only.
    pub(crate) fn check_heights_quietly(&mut self) {
        self.check_heights_logged(true);
    }

    fn check_heights_logged(&mut self, quiet: bool) {
        match self.check_heights_inner(quiet) {
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "could not verify heights against the secondary cone; dropping them");
                self.heights = None;
            }
        }
    }
}

fn check_simplex_shape(simplices: &[Vec<usize>], dim: usize, n: usize) -> Result<()> {
    if simplices.is_empty() {
        return Err(TriangError::invalid("a triangulation needs at least one simplex"));
    }
    let k = dim + 1;
    for s in simplices {
        if s.len() != k {
            return Err(TriangError::invalid(format!(
                "simplex {s:?} has {} vertices; a {dim}-dimensional configuration needs {k}",
                s.len()
            )));
        }
        if let Some(&bad) = s.iter().find(|&&i| i >= n) {
            return Err(TriangError::invalid(format!(
                "simplex index {bad} out of range for {n} points"
            )));
        }
        if s.windows(2).any(|w| w[0] == w[1]) {
            return Err(TriangError::invalid(format!("simplex {s:?} repeats a vertex")));
        }
    }
    Ok(())
}

impl PartialEq for Triangulation {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.poly, &other.poly) || *self.poly == *other.poly)
            && self.simplices == other.simplices
    }
}

impl Eq for Triangulation {}

impl Hash for Triangulation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.simplices.hash(state);
    }
}

impl fmt::Display for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fine = self.cache.fine.unwrap_or_else(|| self.covers_all_points());
        write!(f, "A {}", if fine { "fine" } else { "non-fine" })?;
        if let Some(regular) = self.cache.regular {
            write!(f, ", {}", if regular { "regular" } else { "irregular" })?;
        }
        if self.poly.is_reflexive() {
            let star = self
                .cache
                .star
                .unwrap_or_else(|| self.is_star_about(self.config.origin()));
            write!(f, ", {}", if star { "star" } else { "non-star" })?;
        }
        write!(
            f,
            " triangulation of a {}-dimensional point configuration with {} points in ZZ^{}",
            self.dim(),
            self.config.len(),
            self.ambient_dim()
        )
    }
}

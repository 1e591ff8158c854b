//! Triangulations of lattice point configurations.
//!
//! Layers
//! - `intmat`, `polytope`, `points`: exact integer geometry of the input.
//! - `cone`, `backend`: the collaborators a triangulation consults (secondary-cone
//!   solidity, regular-subdivision providers, flip enumeration).
//! - `triangulation`: the `Triangulation` object with its validity, regularity,
//!   star, flip, symmetry and invariant queries.
//! - `generate`: enumeration and random sampling of whole triangulations.
//!
//! API Policy
//! - This crate has no stable public API yet; `api` is the curated surface.

pub mod api;
pub mod backend;
pub(crate) mod cfg;
pub mod cone;
pub mod error;
pub mod generate;
pub mod intmat;
pub mod points;
pub mod polytope;
pub mod special;
pub mod triangulation;
pub(crate) mod util;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Result, TriangError};
pub use polytope::{Facet, LatticePolytope};
pub use triangulation::{TriangulateOpts, Triangulation};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::backend::{Backend, FlipOracle, Toolchain};
    pub use crate::cone::Cone;
    pub use crate::error::{Result, TriangError};
    pub use crate::polytope::{Facet, LatticePolytope};
    pub use crate::triangulation::{ConeMethod, NeighborFilter, TriangulateOpts, Triangulation};
}

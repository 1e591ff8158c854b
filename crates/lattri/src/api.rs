//! Curated internal API (UNSTABLE).
//!
//! Important
//! - Not a stability promise. Breaking changes are allowed and expected.
//! - Prefer these re-exports for clarity and consistency across callers.

// Polytope oracle and point configurations
pub use crate::points::PointConfig;
pub use crate::polytope::{Facet, LatticePolytope};
// Cones
pub use crate::cone::Cone;
// Providers
pub use crate::backend::{Backend, FlipOracle, Toolchain, TopcomFlips};
// Triangulations
pub use crate::triangulation::{ConeMethod, NeighborFilter, TriangulateOpts, Triangulation};
// Whole-configuration generators
pub use crate::generate::{
    all_triangulations, all_triangulations_raw, EnumerateOpts, FairSampler, FairSamplerCfg,
    FastSampler, FastSamplerCfg,
};
// Integer helpers
pub use crate::intmat::{det, gcd, gcd_list, lattice_chart, nullspace_vector, rank};
// Fixtures
pub use crate::special::{
    mother_of_all_examples, p2_fan, reflexive_simplex_4d, reflexive_square,
};
pub use crate::error::{Result, TriangError};

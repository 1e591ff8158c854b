//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants. Combinatorial predicates and cone solidity are exact, so the
//!   only tolerance guards the floating-point height checks.

/// A height vector closer than this to a secondary-cone wall is discarded.
pub(crate) const WALL_EPS: f64 = 1e-6;
/// Seed of the secondary lifting; fixed so that the native backend is deterministic.
pub(crate) const TIE_BREAK_SEED: u64 = 0x1a77_1ce5;
/// Tie-break heights are drawn from `0..2^TIE_BREAK_BITS`.
pub(crate) const TIE_BREAK_BITS: u32 = 31;
/// Upper bound on origin-lowering rounds when building star triangulations from heights.
pub(crate) const MAX_LOWERING_ROUNDS: usize = 64;
/// Largest power-of-two scale tried when rounding fractional heights to integers.
pub(crate) const MAX_INTEGRAL_SCALE_BITS: u32 = 40;

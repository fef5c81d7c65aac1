//! # ql-math
//!
//! Numeric containers for the finite-difference engines: the
//! nalgebra-backed [`Array`], the [`SampledCurve`] grid/value pair, and
//! the linear interpolation used to regrid curves.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// One-dimensional real vector.
pub mod array;

/// 1D interpolation.
pub mod interpolation;

/// Functions sampled on a grid.
pub mod sampled_curve;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use interpolation::{Interpolation1D, LinearInterpolation};
pub use sampled_curve::{bounded_log_grid, SampledCurve};

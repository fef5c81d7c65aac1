//! # ql-methods
//!
//! Finite-difference machinery for backward PDE integration: spatial
//! operators, boundary and step conditions, θ-scheme evolvers and the
//! rollback model driven by the multi-period pricing engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite difference methods: operators, conditions, evolvers, rollback.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    bsm_operator, AmericanCondition, BoundaryCondition, BoundaryConditionSet, BoundarySide,
    BsmCoefficients, FdmScheme, FiniteDifferenceModel, FlatBsmCoefficients, NullCondition,
    RollbackModel, StepCondition, TridiagonalOperator,
};

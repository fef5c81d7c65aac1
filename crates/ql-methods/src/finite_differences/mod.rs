//! Finite difference methods for PDE-based option pricing.
//!
//! # Overview
//!
//! * [`TridiagonalOperator`]: tridiagonal matrix with Thomas-algorithm solver,
//!   optionally time dependent through a [`TimeSetter`]
//! * [`bsm_operator`]: Black-Scholes-Merton generator on a log grid
//! * [`BoundaryCondition`] / [`BoundaryConditionSet`]: Neumann and Dirichlet edges
//! * [`StepCondition`]: corrections applied after every sub-step
//! * [`MixedScheme`]: explicit, implicit, or Crank-Nicolson evolver
//! * [`RollbackModel`] / [`FiniteDifferenceModel`]: backward integration
//!   over an interval

pub mod boundary_condition;
pub mod bsm_operator;
pub mod model;
pub mod scheme;
pub mod step_condition;
pub mod tridiagonal;

pub use boundary_condition::{
    BoundaryCondition, BoundaryConditionSet, BoundarySide, DirichletBc, NeumannBc,
};
pub use bsm_operator::{bsm_operator, BsmCoefficients, BsmTimeSetter, FlatBsmCoefficients};
pub use model::{FiniteDifferenceModel, RollbackModel};
pub use scheme::{FdmScheme, MixedScheme};
pub use step_condition::{
    AmericanCondition, BarrierDirection, BarrierKnockOut, CompositeCondition, NullCondition,
    StepCondition,
};
pub use tridiagonal::{TimeSetter, TridiagonalOperator};

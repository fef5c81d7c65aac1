//! Step conditions: in-place corrections applied to the rolled-back
//! values after every sub-step.
//!
//! Conditions only see the value array and the time reached; anything
//! else they need (intrinsic values, barrier level, grid) is fixed when
//! they are built.

use std::fmt;

use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;

/// A correction applied to the values at a given time.
pub trait StepCondition: fmt::Debug + Send + Sync {
    /// Correct `values` in place; `t` is the time the values refer to.
    fn apply(&self, values: &mut Array, t: Time);

    /// Check that the condition fits a grid of `size` points.
    ///
    /// Rollback models call this before touching any values.  Conditions
    /// built for a particular grid fail with [`Error::DimensionMismatch`].
    fn check_size(&self, size: usize) -> Result<()> {
        let _ = size;
        Ok(())
    }
}

fn same_size(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, actual })
    }
}

/// Leaves the values untouched (European exercise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullCondition;

impl StepCondition for NullCondition {
    fn apply(&self, _values: &mut Array, _t: Time) {}
}

/// Early exercise: the option is worth at least its intrinsic value.
#[derive(Debug, Clone, PartialEq)]
pub struct AmericanCondition {
    intrinsic: Array,
}

impl AmericanCondition {
    /// Clamp to precomputed intrinsic values (one per grid point).
    pub fn new(intrinsic: Array) -> Self {
        Self { intrinsic }
    }

    /// Clamp to `payoff` evaluated on `grid`.
    pub fn from_payoff<F: Fn(Real) -> Real>(grid: &Array, payoff: F) -> Self {
        Self::new(grid.map(payoff))
    }

    /// The exercise values.
    pub fn intrinsic(&self) -> &Array {
        &self.intrinsic
    }
}

impl StepCondition for AmericanCondition {
    fn apply(&self, values: &mut Array, _t: Time) {
        values.max_in_place(&self.intrinsic);
    }

    fn check_size(&self, size: usize) -> Result<()> {
        same_size(self.intrinsic.size(), size)
    }
}

/// Direction of a knock-out barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierDirection {
    /// Knocked out when the underlying is at or below the barrier.
    Down,
    /// Knocked out when the underlying is at or above the barrier.
    Up,
}

/// Replaces values beyond a barrier with a rebate.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrierKnockOut {
    knocked_out: Vec<usize>,
    grid_size: usize,
    rebate: Real,
}

impl BarrierKnockOut {
    /// Build the condition for the points of `grid` on the far side of
    /// `barrier`.
    pub fn new(grid: &Array, barrier: Real, direction: BarrierDirection, rebate: Real) -> Self {
        let knocked_out = grid
            .iter()
            .enumerate()
            .filter(|&(_, &s)| match direction {
                BarrierDirection::Down => s <= barrier,
                BarrierDirection::Up => s >= barrier,
            })
            .map(|(i, _)| i)
            .collect();
        Self {
            knocked_out,
            grid_size: grid.size(),
            rebate,
        }
    }

    /// Number of grid points beyond the barrier.
    pub fn knocked_out_points(&self) -> usize {
        self.knocked_out.len()
    }
}

impl StepCondition for BarrierKnockOut {
    fn apply(&self, values: &mut Array, _t: Time) {
        for &i in &self.knocked_out {
            values[i] = self.rebate;
        }
    }

    fn check_size(&self, size: usize) -> Result<()> {
        same_size(self.grid_size, size)
    }
}

/// Applies several conditions in order.
#[derive(Debug, Default)]
pub struct CompositeCondition {
    conditions: Vec<Box<dyn StepCondition>>,
}

impl CompositeCondition {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition; it runs after those already added.
    pub fn with(mut self, condition: Box<dyn StepCondition>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Number of component conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the composite has no components.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl StepCondition for CompositeCondition {
    fn apply(&self, values: &mut Array, t: Time) {
        for condition in &self.conditions {
            condition.apply(values, t);
        }
    }

    fn check_size(&self, size: usize) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.check_size(size))
    }
}

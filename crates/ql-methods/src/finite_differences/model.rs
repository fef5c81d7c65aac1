//! Rollback models: integrate the discretised PDE backward over an
//! interval, applying boundary and step conditions after every sub-step.

use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;
use tracing::trace;

use super::boundary_condition::BoundaryConditionSet;
use super::scheme::{FdmScheme, MixedScheme};
use super::step_condition::StepCondition;
use super::tridiagonal::TridiagonalOperator;

/// Backward time integration of a value array.
///
/// The multi-period engines only talk to this trait, so tests can swap
/// in a recording model.
pub trait RollbackModel {
    /// Roll `values` back from `from` to `to` in `steps` equal sub-steps.
    ///
    /// After each sub-step the boundary conditions are enforced, then
    /// `condition` is applied at the time reached.  When `from == to` no
    /// evolution takes place but both are still applied once.
    ///
    /// # Errors
    /// * [`Error::DegenerateStep`] if `steps == 0`, before `values` is touched;
    /// * [`Error::Precondition`] if `to > from`;
    /// * [`Error::DimensionMismatch`] if `values` does not fit the operator
    ///   or `condition`.
    fn rollback(
        &mut self,
        values: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        condition: &dyn StepCondition,
    ) -> Result<()>;
}

/// θ-scheme rollback over a tridiagonal operator.
///
/// Optional stopping times split any sub-step that straddles them, so
/// the step condition is also applied exactly at those times.
#[derive(Debug)]
pub struct FiniteDifferenceModel {
    evolver: MixedScheme,
    stopping_times: Vec<Time>,
}

impl FiniteDifferenceModel {
    /// Create a model for `operator` and `bcs` using `scheme`.
    pub fn new(operator: TridiagonalOperator, bcs: BoundaryConditionSet, scheme: FdmScheme) -> Self {
        Self {
            evolver: MixedScheme::new(operator, bcs, scheme),
            stopping_times: Vec::new(),
        }
    }

    /// Add times at which the step condition must also be applied.
    pub fn with_stopping_times(mut self, mut times: Vec<Time>) -> Self {
        times.sort_by(|a, b| b.total_cmp(a));
        times.dedup();
        self.stopping_times = times;
        self
    }

    /// Stopping times, latest first.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The underlying evolver.
    pub fn evolver(&self) -> &MixedScheme {
        &self.evolver
    }

    /// Evolve from `now` to `next`, then enforce boundaries and the condition.
    fn advance(
        &mut self,
        values: &mut Array,
        now: Time,
        next: Time,
        condition: &dyn StepCondition,
    ) -> Result<()> {
        self.evolver.step(values, now, now - next)?;
        self.evolver.boundary_conditions().apply(values, next);
        condition.apply(values, next);
        Ok(())
    }
}

impl RollbackModel for FiniteDifferenceModel {
    fn rollback(
        &mut self,
        values: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        condition: &dyn StepCondition,
    ) -> Result<()> {
        if steps < 1 {
            return Err(Error::DegenerateStep { steps });
        }
        ql_core::ensure!(
            from >= to,
            "rollback runs backward in time: from ({from}) must not precede to ({to})"
        );
        if values.size() != self.evolver.size() {
            return Err(Error::DimensionMismatch {
                expected: self.evolver.size(),
                actual: values.size(),
            });
        }
        condition.check_size(values.size())?;

        trace!(from, to, steps, "rollback");

        if from == to {
            self.evolver.boundary_conditions().apply(values, to);
            condition.apply(values, to);
            return Ok(());
        }

        let dt = (from - to) / steps as Real;
        let mut now = from;
        for i in 0..steps {
            let next = if i + 1 == steps { to } else { from - (i + 1) as Real * dt };
            let inside: Vec<Time> = self
                .stopping_times
                .iter()
                .copied()
                .filter(|&s| s < now && s > next)
                .collect();
            for stop in inside {
                trace!(stop, "stopping time inside sub-step");
                self.advance(values, now, stop, condition)?;
                now = stop;
            }
            self.advance(values, now, next, condition)?;
            now = next;
        }
        Ok(())
    }
}

//! Multi-period finite-difference engine.
//!
//! Rolls a price curve back from the horizon to the valuation date,
//! stopping at every scheduled event (dividend payment, exercise date) to
//! hand the curve to an [`EventHandler`].  Price, delta and gamma are read
//! from the centre of the final curve.
//!
//! # Schedule walk
//!
//! With events `t₀ ≤ … ≤ tₙ₋₁`, horizon `T` and `m` sub-steps per period:
//!
//! 1. an event on the horizon is handled at `T` before any evolution;
//! 2. each remaining event `tⱼ`, latest first, ends a leg of `m`
//!    sub-steps and is then handled;
//! 3. the lowest leg ends at the internal step `dt`, followed by one
//!    sub-step from `dt` to `0`;
//! 4. an event at time zero is handled last, on the valuation-date curve.

use std::collections::HashMap;
use std::fmt;

use ql_core::{
    errors::{Error, Result},
    Real, Size, Time,
};
use ql_instruments::PricingResults;
use ql_math::SampledCurve;
use ql_methods::{FiniteDifferenceModel, NullCondition, RollbackModel, StepCondition};
use tracing::{debug, instrument, trace};

use crate::event_schedule::EventSchedule;
use crate::fd_settings::DateTolerances;

/// Key of the priced curve among the auxiliary results.
pub const PRICE_CURVE: &str = "priceCurve";

/// Per-event correction applied by the engine.
///
/// Closures `FnMut(usize, Time, &mut SampledCurve) -> Result<()>`
/// implement this trait.
pub trait EventHandler {
    /// Correct `curve` for event `index`; `t` is the time the curve refers to.
    fn on_event(&mut self, index: Size, t: Time, curve: &mut SampledCurve) -> Result<()>;
}

impl<F> EventHandler for F
where
    F: FnMut(Size, Time, &mut SampledCurve) -> Result<()>,
{
    fn on_event(&mut self, index: Size, t: Time, curve: &mut SampledCurve) -> Result<()> {
        self(index, t, curve)
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEventHandler;

impl EventHandler for NoEventHandler {
    fn on_event(&mut self, _index: Size, _t: Time, _curve: &mut SampledCurve) -> Result<()> {
        Ok(())
    }
}

/// Output of one multi-period run.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPeriodResults {
    /// Price at the centre of the grid.
    pub value: Real,
    /// First derivative with respect to the underlying at the centre.
    pub delta: Real,
    /// Second derivative with respect to the underlying at the centre.
    pub gamma: Real,
    /// Named auxiliary curves; the final curve is stored under [`PRICE_CURVE`].
    pub additional_curves: HashMap<String, SampledCurve>,
}

impl MultiPeriodResults {
    /// The full curve at the valuation date.
    pub fn price_curve(&self) -> Option<&SampledCurve> {
        self.additional_curves.get(PRICE_CURVE)
    }

    /// NPV with `delta` and `gamma` as named results.
    pub fn to_pricing_results(&self) -> PricingResults {
        PricingResults::from_npv(self.value)
            .with_result("delta", self.delta)
            .with_result("gamma", self.gamma)
    }
}

/// Schedule-walking rollback driver.
///
/// The engine exclusively owns its curve for the whole run; `calculate`
/// may be invoked once per instance.
pub struct FdMultiPeriodEngine<M: RollbackModel = FiniteDifferenceModel> {
    prices: SampledCurve,
    model: M,
    step_condition: Box<dyn StepCondition>,
    event_handler: Box<dyn EventHandler>,
    event_times: Vec<Time>,
    residual_time: Time,
    time_steps_per_period: Size,
    tolerances: DateTolerances,
    schedule: Option<EventSchedule>,
    results: Option<MultiPeriodResults>,
}

impl<M: RollbackModel> FdMultiPeriodEngine<M> {
    /// Create an engine rolling `prices` (holding the payoff at `T`) back
    /// with `model`.
    ///
    /// The step condition defaults to [`NullCondition`], events are
    /// ignored until a handler is set, and tolerances take their defaults.
    pub fn new(
        prices: SampledCurve,
        model: M,
        event_times: Vec<Time>,
        residual_time: Time,
        time_steps_per_period: Size,
    ) -> Self {
        Self {
            prices,
            model,
            step_condition: Box::new(NullCondition),
            event_handler: Box::new(NoEventHandler),
            event_times,
            residual_time,
            time_steps_per_period,
            tolerances: DateTolerances::default(),
            schedule: None,
            results: None,
        }
    }

    /// Apply `condition` after every rollback sub-step.
    pub fn with_step_condition(mut self, condition: Box<dyn StepCondition>) -> Self {
        self.step_condition = condition;
        self
    }

    /// Call `handler` once per event.
    pub fn with_event_handler(mut self, handler: Box<dyn EventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Override the event classification tolerances.
    pub fn with_tolerances(mut self, tolerances: DateTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// The rollback model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The price curve (the payoff before `calculate`, the priced curve after).
    pub fn prices(&self) -> &SampledCurve {
        &self.prices
    }

    /// The resolved schedule, once `calculate` has validated it.
    pub fn schedule(&self) -> Option<&EventSchedule> {
        self.schedule.as_ref()
    }

    /// Results of the last successful run.
    pub fn results(&self) -> Option<&MultiPeriodResults> {
        self.results.as_ref()
    }

    /// Run the rollback and store the results.
    ///
    /// # Errors
    /// * [`Error::Precondition`] if the engine has already been run;
    /// * [`Error::DegenerateStep`] if fewer than one sub-step per period
    ///   was configured;
    /// * [`Error::InvalidSchedule`] for an invalid event schedule;
    /// * any error raised by the model or the event handler.
    #[instrument(
        level = "debug",
        skip(self),
        fields(events = self.event_times.len(), horizon = self.residual_time)
    )]
    pub fn calculate(&mut self) -> Result<&MultiPeriodResults> {
        ql_core::ensure!(
            self.results.is_none() && self.schedule.is_none(),
            "multi-period engine already calculated; build a new engine to price again"
        );
        let m = self.time_steps_per_period;
        if m < 1 {
            return Err(Error::DegenerateStep { steps: m });
        }
        self.tolerances.validate()?;

        let schedule = EventSchedule::resolve(
            std::mem::take(&mut self.event_times),
            self.residual_time,
            &self.tolerances,
        )?;
        debug!(
            first_event_is_zero = schedule.first_event_is_zero(),
            last_event_is_horizon = schedule.last_event_is_horizon(),
            first_non_zero_time = schedule.first_non_zero_time(),
            "resolved event schedule"
        );

        let outcome = self.roll_back(&schedule, m);
        self.schedule = Some(schedule);
        outcome?;

        let value = self.prices.value_at_center();
        let delta = self.prices.first_derivative_at_center();
        let gamma = self.prices.second_derivative_at_center();
        debug!(value, delta, gamma, "multi-period rollback finished");

        let mut additional_curves = HashMap::new();
        additional_curves.insert(PRICE_CURVE.to_string(), self.prices.clone());
        Ok(&*self.results.insert(MultiPeriodResults {
            value,
            delta,
            gamma,
            additional_curves,
        }))
    }

    fn roll_back(&mut self, schedule: &EventSchedule, m: Size) -> Result<()> {
        let t_end = schedule.residual_time();
        let times = schedule.times();

        if schedule.is_empty() {
            trace!(from = t_end, to = 0.0, steps = m, "single-period rollback");
            return self.rollback_leg(t_end, 0.0, m);
        }

        let dt = schedule.step_size(m);
        trace!(dt, "internal step size");

        if schedule.last_event_is_horizon() {
            let last = times.len() - 1;
            trace!(index = last, t = t_end, "event on the horizon");
            self.event_handler.on_event(last, t_end, &mut self.prices)?;
        }

        let (first_index, last_index) = (schedule.first_index(), schedule.last_index());
        let mut j = last_index;
        loop {
            let begin = if j == last_index {
                t_end
            } else {
                times[(j + 1) as usize]
            };
            let event = schedule.is_loop_event(j);
            let end = if event { times[j as usize] } else { dt };
            trace!(leg = j, from = begin, to = end, steps = m, "rollback leg");
            self.rollback_leg(begin, end, m)?;
            if event {
                trace!(index = j, t = end, "event");
                self.event_handler
                    .on_event(j as usize, end, &mut self.prices)?;
            }
            j -= 1;
            if j < first_index {
                break;
            }
        }

        trace!(from = dt, to = 0.0, "final rollback");
        self.rollback_leg(dt, 0.0, 1)?;

        // a lone event at zero that is also on the horizon was handled at T
        if schedule.first_event_is_zero() && !(schedule.last_event_is_horizon() && times.len() == 1)
        {
            trace!(index = 0, t = 0.0, "event at time zero");
            self.event_handler.on_event(0, 0.0, &mut self.prices)?;
        }
        Ok(())
    }

    fn rollback_leg(&mut self, from: Time, to: Time, steps: Size) -> Result<()> {
        self.model.rollback(
            self.prices.values_mut(),
            from,
            to,
            steps,
            self.step_condition.as_ref(),
        )
    }
}

impl<M: RollbackModel + fmt::Debug> fmt::Debug for FdMultiPeriodEngine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdMultiPeriodEngine")
            .field("grid_points", &self.prices.size())
            .field("model", &self.model)
            .field("step_condition", &self.step_condition)
            .field("residual_time", &self.residual_time)
            .field("time_steps_per_period", &self.time_steps_per_period)
            .field("calculated", &self.results.is_some())
            .finish_non_exhaustive()
    }
}

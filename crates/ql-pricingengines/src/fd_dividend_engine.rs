//! Finite-difference engines for options on an underlying paying cash
//! dividends.
//!
//! Each dividend is an event of the multi-period rollback.  Just before
//! the payment the holder of the option faces the price that will drop
//! by the dividend, so the curve is moved to `V(S) ← V(S − D)`.

use ql_core::{
    errors::{Error, Result},
    Real, Size, Time,
};
use ql_instruments::{ExerciseType, OneAssetOptionArguments, PricingEngine, PricingResults};
use ql_math::{Array, SampledCurve};
use ql_methods::{AmericanCondition, NullCondition, StepCondition};
use tracing::{instrument, trace};

use crate::black_scholes_inputs::BlackScholesInputs;
use crate::fd_multi_period_engine::{EventHandler, MultiPeriodResults};
use crate::fd_settings::FdEngineSettings;
use crate::fd_vanilla_engine::FdVanillaEngine;

/// Shifts the curve by the cash amount of each dividend event.
///
/// With an exercise floor the curve is also clamped to it after the
/// shift, since the option may be exercised just before the payment.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendShift {
    amounts: Vec<Real>,
    floor: Option<Array>,
}

impl DividendShift {
    /// Shift by `amounts[i]` on event `i`.
    pub fn new(amounts: Vec<Real>) -> Self {
        Self {
            amounts,
            floor: None,
        }
    }

    /// Also floor the shifted values at `intrinsic`.
    pub fn with_exercise_floor(mut self, intrinsic: Array) -> Self {
        self.floor = Some(intrinsic);
        self
    }
}

impl EventHandler for DividendShift {
    fn on_event(&mut self, index: Size, t: Time, curve: &mut SampledCurve) -> Result<()> {
        let amount = *self.amounts.get(index).ok_or(Error::IndexOutOfRange {
            index,
            size: self.amounts.len(),
        })?;
        trace!(index, t, amount, "dividend shift");
        let grid = curve.grid().clone();
        curve.shift_grid(amount);
        curve.regrid(grid)?;
        if let Some(floor) = &self.floor {
            curve.values_mut().max_in_place(floor);
        }
        Ok(())
    }
}

fn price_with_dividends(
    fd: &FdVanillaEngine,
    args: &OneAssetOptionArguments,
    expected: ExerciseType,
) -> Result<MultiPeriodResults> {
    if args.exercise.exercise_type() != expected {
        return Err(Error::UnsupportedConfiguration(format!(
            "dividend {expected:?} engine given {} exercise",
            args.exercise
        )));
    }
    let t = args.residual_time()?;
    let dividends = args.dividends_paid_by(t + fd.settings().tolerances.absolute);
    let times = dividends.iter().map(|d| d.time).collect();
    let amounts: Vec<Real> = dividends.iter().map(|d| d.amount).collect();
    let american = expected == ExerciseType::American;

    fd.price_multi_period(
        args,
        times,
        |intrinsic: &SampledCurve| -> Box<dyn StepCondition> {
            if american {
                Box::new(AmericanCondition::new(intrinsic.values().clone()))
            } else {
                Box::new(NullCondition)
            }
        },
        |intrinsic: &SampledCurve| -> Box<dyn EventHandler> {
            let shift = DividendShift::new(amounts);
            if american {
                Box::new(shift.with_exercise_floor(intrinsic.values().clone()))
            } else {
                Box::new(shift)
            }
        },
    )
}

/// European options on a dividend-paying underlying.
#[derive(Debug, Clone)]
pub struct FdDividendEuropeanEngine {
    fd: FdVanillaEngine,
}

impl FdDividendEuropeanEngine {
    /// Create the engine.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self {
            fd: FdVanillaEngine::new(market, settings),
        }
    }

    /// Price and keep the full curve.
    #[instrument(level = "debug", skip_all, name = "fd_dividend_european")]
    pub fn multi_period_results(&self, args: &OneAssetOptionArguments) -> Result<MultiPeriodResults> {
        price_with_dividends(&self.fd, args, ExerciseType::European)
    }
}

impl PricingEngine<OneAssetOptionArguments> for FdDividendEuropeanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        Ok(self.multi_period_results(args)?.to_pricing_results())
    }
}

/// American options on a dividend-paying underlying.
#[derive(Debug, Clone)]
pub struct FdDividendAmericanEngine {
    fd: FdVanillaEngine,
}

impl FdDividendAmericanEngine {
    /// Create the engine.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self {
            fd: FdVanillaEngine::new(market, settings),
        }
    }

    /// Price and keep the full curve.
    #[instrument(level = "debug", skip_all, name = "fd_dividend_american")]
    pub fn multi_period_results(&self, args: &OneAssetOptionArguments) -> Result<MultiPeriodResults> {
        price_with_dividends(&self.fd, args, ExerciseType::American)
    }
}

impl PricingEngine<OneAssetOptionArguments> for FdDividendAmericanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        Ok(self.multi_period_results(args)?.to_pricing_results())
    }
}

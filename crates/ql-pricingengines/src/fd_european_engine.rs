//! Finite-difference European engine.

use ql_core::errors::{Error, Result};
use ql_instruments::{ExerciseType, OneAssetOptionArguments, PricingEngine, PricingResults};
use ql_methods::NullCondition;
use tracing::instrument;

use crate::black_scholes_inputs::BlackScholesInputs;
use crate::fd_multi_period_engine::{MultiPeriodResults, NoEventHandler};
use crate::fd_settings::FdEngineSettings;
use crate::fd_vanilla_engine::FdVanillaEngine;

/// Rolls the payoff back from expiry to today in one period.
#[derive(Debug, Clone)]
pub struct FdEuropeanEngine {
    fd: FdVanillaEngine,
}

impl FdEuropeanEngine {
    /// Create the engine.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self {
            fd: FdVanillaEngine::new(market, settings),
        }
    }

    /// Price and keep the full curve.
    #[instrument(level = "debug", skip_all, name = "fd_european")]
    pub fn multi_period_results(&self, args: &OneAssetOptionArguments) -> Result<MultiPeriodResults> {
        require_plain(args, ExerciseType::European)?;
        self.fd.price_multi_period(
            args,
            Vec::new(),
            |_| Box::new(NullCondition),
            |_| Box::new(NoEventHandler),
        )
    }
}

impl PricingEngine<OneAssetOptionArguments> for FdEuropeanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        Ok(self.multi_period_results(args)?.to_pricing_results())
    }
}

/// Reject exercise styles and dividend schedules an engine was not built for.
pub(crate) fn require_plain(args: &OneAssetOptionArguments, expected: ExerciseType) -> Result<()> {
    if args.exercise.exercise_type() != expected {
        return Err(Error::UnsupportedConfiguration(format!(
            "{expected:?} engine given {} exercise",
            args.exercise
        )));
    }
    if !args.dividends.is_empty() {
        return Err(Error::UnsupportedConfiguration(format!(
            "{expected:?} engine given {} cash dividends; use a dividend engine",
            args.dividends.len()
        )));
    }
    Ok(())
}

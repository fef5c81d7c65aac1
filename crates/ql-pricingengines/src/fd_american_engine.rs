//! Finite-difference American engine.
//!
//! Early exercise is enforced after every rollback sub-step by clamping
//! the values to the payoff sampled on the grid.

use ql_core::errors::Result;
use ql_instruments::{ExerciseType, OneAssetOptionArguments, PricingEngine, PricingResults};
use ql_methods::AmericanCondition;
use tracing::instrument;

use crate::black_scholes_inputs::BlackScholesInputs;
use crate::fd_european_engine::require_plain;
use crate::fd_multi_period_engine::{MultiPeriodResults, NoEventHandler};
use crate::fd_settings::FdEngineSettings;
use crate::fd_vanilla_engine::FdVanillaEngine;

/// American options without discrete dividends.
#[derive(Debug, Clone)]
pub struct FdAmericanEngine {
    fd: FdVanillaEngine,
}

impl FdAmericanEngine {
    /// Create the engine.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self {
            fd: FdVanillaEngine::new(market, settings),
        }
    }

    /// Price and keep the full curve.
    #[instrument(level = "debug", skip_all, name = "fd_american")]
    pub fn multi_period_results(&self, args: &OneAssetOptionArguments) -> Result<MultiPeriodResults> {
        require_plain(args, ExerciseType::American)?;
        self.fd.price_multi_period(
            args,
            Vec::new(),
            |intrinsic| Box::new(AmericanCondition::new(intrinsic.values().clone())),
            |_| Box::new(NoEventHandler),
        )
    }
}

impl PricingEngine<OneAssetOptionArguments> for FdAmericanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        Ok(self.multi_period_results(args)?.to_pricing_results())
    }
}

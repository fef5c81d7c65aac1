//! Finite-difference Bermudan engine.
//!
//! The exercise times are the events of the multi-period rollback; at
//! each of them the curve is floored at the intrinsic value.

use ql_core::{
    errors::{Error, Result},
    Size, Time,
};
use ql_instruments::{ExerciseType, OneAssetOptionArguments, PricingEngine, PricingResults};
use ql_math::{Array, SampledCurve};
use ql_methods::NullCondition;
use tracing::instrument;

use crate::black_scholes_inputs::BlackScholesInputs;
use crate::fd_multi_period_engine::{EventHandler, MultiPeriodResults};
use crate::fd_settings::FdEngineSettings;
use crate::fd_vanilla_engine::FdVanillaEngine;

/// Floors the curve at fixed exercise values on every event.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseFloor {
    intrinsic: Array,
}

impl ExerciseFloor {
    /// Floor at `intrinsic` (one value per grid point).
    pub fn new(intrinsic: Array) -> Self {
        Self { intrinsic }
    }
}

impl EventHandler for ExerciseFloor {
    fn on_event(&mut self, _index: Size, _t: Time, curve: &mut SampledCurve) -> Result<()> {
        if curve.size() != self.intrinsic.size() {
            return Err(Error::DimensionMismatch {
                expected: curve.size(),
                actual: self.intrinsic.size(),
            });
        }
        curve.values_mut().max_in_place(&self.intrinsic);
        Ok(())
    }
}

/// Options exercisable on a discrete set of times.
#[derive(Debug, Clone)]
pub struct FdBermudanEngine {
    fd: FdVanillaEngine,
}

impl FdBermudanEngine {
    /// Create the engine.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self {
            fd: FdVanillaEngine::new(market, settings),
        }
    }

    /// Price and keep the full curve.
    ///
    /// A European exercise is accepted as a one-date Bermudan.
    #[instrument(level = "debug", skip_all, name = "fd_bermudan")]
    pub fn multi_period_results(&self, args: &OneAssetOptionArguments) -> Result<MultiPeriodResults> {
        match args.exercise.exercise_type() {
            ExerciseType::Bermudan | ExerciseType::European => {}
            ExerciseType::American => {
                return Err(Error::UnsupportedConfiguration(format!(
                    "Bermudan engine given {} exercise",
                    args.exercise
                )))
            }
        }
        if !args.dividends.is_empty() {
            return Err(Error::UnsupportedConfiguration(
                "Bermudan engine does not handle cash dividends".into(),
            ));
        }
        self.fd.price_multi_period(
            args,
            args.exercise.times().to_vec(),
            |_| Box::new(NullCondition),
            |intrinsic| Box::new(ExerciseFloor::new(intrinsic.values().clone())),
        )
    }
}

impl PricingEngine<OneAssetOptionArguments> for FdBermudanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        Ok(self.multi_period_results(args)?.to_pricing_results())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_instruments::{OptionType, VanillaOption};

    #[test]
    fn floor_clamps_values() {
        let mut floor = ExerciseFloor::new(Array::from_slice(&[3.0, 0.0, 0.0]));
        let mut curve = SampledCurve::from_grid_and_values(
            Array::from_slice(&[1.0, 2.0, 3.0]),
            Array::from_slice(&[1.0, 1.0, 1.0]),
        )
        .unwrap();
        floor.on_event(0, 0.5, &mut curve).unwrap();
        assert_eq!(curve.values().as_slice(), &[3.0, 1.0, 1.0]);
    }

    #[test]
    fn unordered_exercise_dates_are_rejected() {
        let engine = FdBermudanEngine::new(
            BlackScholesInputs::new(100.0, 0.05, 0.0, 0.2),
            FdEngineSettings::default(),
        );
        let option = VanillaOption::bermudan(OptionType::Put, 100.0, vec![0.5, 0.25, 1.0]);
        assert!(matches!(
            option.price(&engine),
            Err(Error::InvalidSchedule(_))
        ));
    }
}

//! One-asset options priced on a finite-difference grid.

use crate::dividend::CashDividend;
use crate::exercise::{Exercise, ExerciseType};
use crate::instrument::{PricingEngine, PricingResults};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use std::sync::Arc;

/// Arguments needed for pricing a one-asset option.
#[derive(Debug, Clone)]
pub struct OneAssetOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise terms.
    pub exercise: Exercise,
    /// Cash dividends paid before expiry, in payment order.
    pub dividends: Vec<CashDividend>,
}

impl OneAssetOptionArguments {
    /// Arguments for an option without discrete dividends.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            dividends: Vec::new(),
        }
    }

    /// Attach a dividend schedule.
    pub fn with_dividends(mut self, dividends: Vec<CashDividend>) -> Self {
        self.dividends = dividends;
        self
    }

    /// Time to expiry (the last exercise time).
    ///
    /// # Errors
    /// Fails if the exercise has no times or the expiry is not positive.
    pub fn residual_time(&self) -> Result<Time> {
        let expiry = self
            .exercise
            .last_time()
            .ok_or_else(|| Error::InvalidArgument("exercise has no dates".into()))?;
        if expiry <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "option expiry must be in the future, got t = {expiry}"
            )));
        }
        Ok(expiry)
    }

    /// Dividends paid no later than `cutoff`, in the order given.
    ///
    /// Payments after the option has expired cannot affect it.
    pub fn dividends_paid_by(&self, cutoff: Time) -> Vec<CashDividend> {
        self.dividends
            .iter()
            .copied()
            .filter(|d| d.time <= cutoff)
            .collect()
    }
}

/// A plain vanilla option on a single underlying asset.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    dividends: Vec<CashDividend>,
}

impl VanillaOption {
    /// Create a new vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            dividends: Vec::new(),
        }
    }

    /// A call or put exercisable only at `expiry`.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::european(expiry),
        )
    }

    /// A call or put exercisable at any time up to `expiry`.
    pub fn american(option_type: OptionType, strike: Real, expiry: Time) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::american(expiry),
        )
    }

    /// A call or put exercisable at each of `times`.
    pub fn bermudan(option_type: OptionType, strike: Real, times: Vec<Time>) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::bermudan(times),
        )
    }

    /// Attach cash dividends paid by the underlying before expiry.
    pub fn with_dividends(mut self, dividends: Vec<CashDividend>) -> Self {
        self.dividends = dividends;
        self
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The option type (call/put).
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The exercise type.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise.exercise_type()
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.payoff
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The dividend schedule.
    pub fn dividends(&self) -> &[CashDividend] {
        &self.dividends
    }

    /// Get the arguments for a pricing engine.
    pub fn arguments(&self) -> OneAssetOptionArguments {
        OneAssetOptionArguments::new(Arc::clone(&self.payoff), self.exercise.clone())
            .with_dividends(self.dividends.clone())
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<OneAssetOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_carry_the_contract_terms() {
        let option = VanillaOption::american(OptionType::Put, 95.0, 0.75)
            .with_dividends(vec![CashDividend::new(0.5, 2.0)]);
        let args = option.arguments();
        assert_eq!(args.payoff.strike(), 95.0);
        assert_eq!(args.exercise.exercise_type(), ExerciseType::American);
        assert_eq!(args.residual_time().unwrap(), 0.75);
        assert_eq!(args.dividends_paid_by(0.75), vec![CashDividend::new(0.5, 2.0)]);
    }

    #[test]
    fn dividends_after_the_cutoff_are_dropped() {
        let args = VanillaOption::european(OptionType::Call, 100.0, 1.0)
            .with_dividends(vec![
                CashDividend::new(0.5, 1.0),
                CashDividend::new(1.0, 0.5),
                CashDividend::new(1.5, 1.0),
            ])
            .arguments();
        let paid = args.dividends_paid_by(1.0);
        assert_eq!(paid.len(), 2);
        assert_eq!(paid[1].time, 1.0);
        assert!(args.dividends_paid_by(0.25).is_empty());
    }

    #[test]
    fn residual_time_requires_a_future_expiry() {
        let expired = VanillaOption::european(OptionType::Call, 100.0, 0.0);
        assert!(expired.arguments().residual_time().is_err());
        let empty = VanillaOption::bermudan(OptionType::Call, 100.0, vec![]);
        assert!(empty.arguments().residual_time().is_err());
    }
}

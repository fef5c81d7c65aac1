//! Finite-difference setup shared by the vanilla engines.
//!
//! Builds everything the multi-period engine consumes for a one-asset
//! option under flat Black-Scholes-Merton dynamics: the log-spaced price
//! grid around the spot, the payoff sampled on it, the BSM operator, and
//! Neumann edges matching the payoff slope.

use std::sync::Arc;

use ql_core::{
    errors::{Error, Result},
    Real, Size, Time,
};
use ql_instruments::{OneAssetOptionArguments, StrikedPayoff};
use ql_math::{Array, SampledCurve};
use ql_methods::{
    bsm_operator, BoundaryConditionSet, FiniteDifferenceModel, StepCondition, TridiagonalOperator,
};
use tracing::debug;

use crate::black_scholes_inputs::BlackScholesInputs;
use crate::fd_multi_period_engine::{EventHandler, FdMultiPeriodEngine, MultiPeriodResults};
use crate::fd_settings::FdEngineSettings;

const MIN_GRID_POINTS: Size = 10;
const MIN_GRID_POINTS_PER_YEAR: Real = 2.0;
/// The strike is kept at least this factor inside the grid ends.
const SAFETY_ZONE_FACTOR: Real = 1.1;

/// Lower and upper end of the price grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLimits {
    /// Lowest underlying price on the grid.
    pub s_min: Real,
    /// Highest underlying price on the grid.
    pub s_max: Real,
}

impl GridLimits {
    /// Widen the limits so `strike` sits inside the safety zone, keeping
    /// `center` at the geometric middle of the grid.
    pub fn ensure_strike_in_grid(mut self, center: Real, strike: Real) -> Self {
        if self.s_min > strike / SAFETY_ZONE_FACTOR {
            self.s_min = strike / SAFETY_ZONE_FACTOR;
            self.s_max = center / (self.s_min / center);
        }
        if self.s_max < strike * SAFETY_ZONE_FACTOR {
            self.s_max = strike * SAFETY_ZONE_FACTOR;
            self.s_min = center / (self.s_max / center);
        }
        self
    }
}

/// Grid and model construction for one-asset BSM options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdVanillaEngine {
    market: BlackScholesInputs,
    settings: FdEngineSettings,
}

impl FdVanillaEngine {
    /// Set up for the given market and discretisation.
    pub fn new(market: BlackScholesInputs, settings: FdEngineSettings) -> Self {
        Self { market, settings }
    }

    /// The market data.
    pub fn market(&self) -> &BlackScholesInputs {
        &self.market
    }

    /// The discretisation settings.
    pub fn settings(&self) -> &FdEngineSettings {
        &self.settings
    }

    /// Grid size actually used for a horizon of `t` years: at least ten
    /// points, plus two per year beyond the first.
    pub fn safe_grid_points(grid_points: Size, t: Time) -> Size {
        let minimum = if t > 1.0 {
            (MIN_GRID_POINTS as Real + (t - 1.0) * MIN_GRID_POINTS_PER_YEAR) as Size
        } else {
            MIN_GRID_POINTS
        };
        grid_points.max(minimum)
    }

    /// Grid limits `center·exp(∓4·(1 + 0.02/σ√t)·σ√t)`.
    pub fn grid_limits(&self, center: Real, t: Time) -> Result<GridLimits> {
        ql_core::ensure!(center > 0.0, "negative or null underlying given: {center}");
        ql_core::ensure!(t > 0.0, "negative or zero residual time: {t}");
        let vol_sqrt_time = self.market.volatility * t.sqrt();
        let prefactor = 1.0 + 0.02 / vol_sqrt_time;
        let factor = (4.0 * prefactor * vol_sqrt_time).exp();
        Ok(GridLimits {
            s_min: center / factor,
            s_max: center * factor,
        })
    }

    /// The payoff sampled on a log grid centred on the spot.
    ///
    /// The returned curve doubles as the intrinsic values used by
    /// early-exercise conditions.
    pub fn initial_condition(&self, payoff: &dyn StrikedPayoff, t: Time) -> Result<SampledCurve> {
        let strike = payoff.strike();
        if !(strike > 0.0 && strike.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "strike must be positive, got {strike}"
            )));
        }
        let center = self.market.spot;
        let limits = self.grid_limits(center, t)?.ensure_strike_in_grid(center, strike);
        let points = Self::safe_grid_points(self.settings.grid_points, t);
        debug!(
            s_min = limits.s_min,
            s_max = limits.s_max,
            points,
            "price grid"
        );
        let mut curve = SampledCurve::log_grid(limits.s_min, limits.s_max, points)?;
        curve.sample(|s| payoff.value(s));
        Ok(curve)
    }

    /// The BSM generator on `grid`, frozen at `t` unless the settings ask
    /// for time-dependent coefficients.
    pub fn operator(&self, grid: &Array, t: Time) -> Result<TridiagonalOperator> {
        bsm_operator(
            grid,
            Arc::new(self.market.coefficients()),
            t,
            self.settings.time_dependent,
        )
    }

    /// Neumann edges carrying the slope of the intrinsic values.
    pub fn boundary_conditions(intrinsic: &SampledCurve) -> Result<BoundaryConditionSet> {
        let v = intrinsic.values();
        let n = v.size();
        if n < 2 {
            return Err(Error::UnsupportedConfiguration(format!(
                "Neumann edges need at least 2 grid points, got {n}"
            )));
        }
        Ok(BoundaryConditionSet::neumann(v[1] - v[0], v[n - 1] - v[n - 2]))
    }

    /// The rollback model for `intrinsic`'s grid.
    pub fn model(&self, intrinsic: &SampledCurve, t: Time) -> Result<FiniteDifferenceModel> {
        let operator = self.operator(intrinsic.grid(), t)?;
        let bcs = Self::boundary_conditions(intrinsic)?;
        Ok(FiniteDifferenceModel::new(operator, bcs, self.settings.scheme))
    }

    /// Price `args` on the multi-period engine.
    ///
    /// `step_condition` and `event_handler` are built from the intrinsic
    /// curve once the grid is known.
    pub fn price_multi_period<C, H>(
        &self,
        args: &OneAssetOptionArguments,
        event_times: Vec<Time>,
        step_condition: C,
        event_handler: H,
    ) -> Result<MultiPeriodResults>
    where
        C: FnOnce(&SampledCurve) -> Box<dyn StepCondition>,
        H: FnOnce(&SampledCurve) -> Box<dyn EventHandler>,
    {
        self.market.validate()?;
        self.settings.validate()?;
        let t = args.residual_time()?;
        let intrinsic = self.initial_condition(args.payoff.as_ref(), t)?;
        let model = self.model(&intrinsic, t)?;
        let condition = step_condition(&intrinsic);
        let handler = event_handler(&intrinsic);

        let mut engine =
            FdMultiPeriodEngine::new(intrinsic, model, event_times, t, self.settings.time_steps)
                .with_step_condition(condition)
                .with_event_handler(handler)
                .with_tolerances(self.settings.tolerances);
        engine.calculate().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    fn engine() -> FdVanillaEngine {
        FdVanillaEngine::new(
            BlackScholesInputs::new(100.0, 0.05, 0.0, 0.2),
            FdEngineSettings::default().with_grid_points(101),
        )
    }

    #[test]
    fn safe_grid_points_grow_with_maturity() {
        assert_eq!(FdVanillaEngine::safe_grid_points(3, 0.5), 10);
        assert_eq!(FdVanillaEngine::safe_grid_points(3, 6.0), 20);
        assert_eq!(FdVanillaEngine::safe_grid_points(100, 6.0), 100);
    }

    #[test]
    fn grid_limits_are_symmetric_in_log_space() {
        let limits = engine().grid_limits(100.0, 1.0).unwrap();
        let factor = (4.0_f64 * (1.0 + 0.02 / 0.2) * 0.2).exp();
        assert_relative_eq!(limits.s_min, 100.0 / factor, epsilon = 1e-12);
        assert_relative_eq!(limits.s_max, 100.0 * factor, epsilon = 1e-10);
        assert!(engine().grid_limits(0.0, 1.0).is_err());
        assert!(engine().grid_limits(100.0, 0.0).is_err());
    }

    #[test]
    fn far_strikes_widen_the_grid() {
        let limits = GridLimits {
            s_min: 50.0,
            s_max: 200.0,
        };
        let wide = limits.ensure_strike_in_grid(100.0, 400.0);
        assert_relative_eq!(wide.s_max, 440.0, epsilon = 1e-12);
        assert_relative_eq!(wide.s_min * wide.s_max, 100.0 * 100.0, epsilon = 1e-9);
        let low = limits.ensure_strike_in_grid(100.0, 20.0);
        assert_relative_eq!(low.s_min, 20.0 / 1.1, epsilon = 1e-12);
        assert_eq!(limits.ensure_strike_in_grid(100.0, 100.0), limits);
    }

    #[test]
    fn initial_condition_is_the_payoff_on_a_centred_grid() {
        let payoff = PlainVanillaPayoff::new(OptionType::Put, 100.0);
        let curve = engine().initial_condition(&payoff, 1.0).unwrap();
        assert_eq!(curve.size(), 101);
        assert_relative_eq!(curve.grid()[curve.center()], 100.0, epsilon = 1e-9);
        let first = curve.grid()[0];
        assert_relative_eq!(curve.values()[0], 100.0 - first, epsilon = 1e-12);
        assert_eq!(curve.values()[100], 0.0);
    }

    #[test]
    fn boundary_conditions_follow_the_payoff_slope() {
        let payoff = PlainVanillaPayoff::new(OptionType::Call, 100.0);
        let curve = engine().initial_condition(&payoff, 1.0).unwrap();
        let bcs = FdVanillaEngine::boundary_conditions(&curve).unwrap();
        let mut v = curve.values().clone();
        v[100] = 0.0;
        bcs.apply(&mut v, 1.0);
        assert_relative_eq!(v[100], curve.values()[100], epsilon = 1e-9);
    }
}

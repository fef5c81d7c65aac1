//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Serves as the closed-form reference the finite-difference engines are
//! checked against.

use ql_core::{
    errors::{Error, Result},
    Real,
};
use ql_instruments::{ExerciseType, OneAssetOptionArguments, OptionType, PricingEngine, PricingResults};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::black_scholes_inputs::BlackScholesInputs;

/// Price and Greeks of a European vanilla option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Option value.
    pub price: Real,
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ (per 1.0 absolute vol).
    pub vega: Real,
    /// ∂V/∂t (per year).
    pub theta: Real,
    /// ∂V/∂r (per 1.0 rate shift).
    pub rho: Real,
}

/// Analytic pricing engine for European vanilla options.
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
#[derive(Debug, Clone)]
pub struct AnalyticEuropeanEngine {
    market: BlackScholesInputs,
}

impl AnalyticEuropeanEngine {
    /// Create a new engine on flat market data.
    pub fn new(market: BlackScholesInputs) -> Self {
        Self { market }
    }
}

/// Compute Black-Scholes price and Greeks for a European option.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return BlackScholesGreeks {
            price: intrinsic,
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        };
    }

    let (r, q, sigma) = (risk_free_rate, dividend_yield, volatility);
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let n = Normal::standard();
    let nd1 = n.cdf(phi * d1);
    let nd2 = n.cdf(phi * d2);
    let npd1 = n.pdf(d1);

    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let theta = {
        let decay = if sqrt_t > 0.0 {
            -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t)
        } else {
            0.0
        };
        decay - phi * r * strike * df_r * nd2 + phi * q * spot * df_q * nd1
    };

    BlackScholesGreeks {
        price: phi * (spot * df_q * nd1 - strike * df_r * nd2),
        delta: phi * df_q * nd1,
        gamma,
        vega: spot * df_q * npd1 * sqrt_t,
        theta,
        rho: phi * strike * t * df_r * nd2,
    }
}

impl PricingEngine<OneAssetOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &OneAssetOptionArguments) -> Result<PricingResults> {
        self.market.validate()?;
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedConfiguration(format!(
                "analytic engine prices European exercise only, got {}",
                args.exercise
            )));
        }
        if !args.dividends.is_empty() {
            return Err(Error::UnsupportedConfiguration(
                "analytic engine does not handle cash dividends".into(),
            ));
        }
        let t = args.residual_time()?;
        let m = &self.market;
        let g = black_scholes_merton(
            args.payoff.option_type(),
            m.spot,
            args.payoff.strike(),
            m.risk_free_rate,
            m.dividend_yield,
            m.volatility,
            t,
        );

        Ok(PricingResults::from_npv(g.price)
            .with_result("delta", g.delta)
            .with_result("gamma", g.gamma)
            .with_result("vega", g.vega)
            .with_result("theta", g.theta)
            .with_result("rho", g.rho))
    }
}

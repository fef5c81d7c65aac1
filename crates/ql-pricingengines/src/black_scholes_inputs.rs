//! Flat Black-Scholes-Merton market data.

use ql_core::{
    errors::{Error, Result},
    Price, Rate, Volatility,
};
use ql_methods::FlatBsmCoefficients;

/// Spot, continuous rates and volatility of a one-asset BSM market.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackScholesInputs {
    /// Spot price of the underlying.
    pub spot: Price,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: Rate,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Black volatility.
    pub volatility: Volatility,
}

impl BlackScholesInputs {
    /// Bundle the market data.
    pub fn new(spot: Price, risk_free_rate: Rate, dividend_yield: Rate, volatility: Volatility) -> Self {
        Self {
            spot,
            risk_free_rate,
            dividend_yield,
            volatility,
        }
    }

    /// Reject a non-positive spot or volatility and non-finite rates.
    pub fn validate(&self) -> Result<()> {
        if !(self.spot > 0.0 && self.spot.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "spot must be positive, got {}",
                self.spot
            )));
        }
        if !(self.volatility > 0.0 && self.volatility.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "volatility must be positive, got {}",
                self.volatility
            )));
        }
        if !(self.risk_free_rate.is_finite() && self.dividend_yield.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "rates must be finite, got r = {}, q = {}",
                self.risk_free_rate, self.dividend_yield
            )));
        }
        Ok(())
    }

    /// The PDE coefficients implied by these inputs.
    pub fn coefficients(&self) -> FlatBsmCoefficients {
        FlatBsmCoefficients {
            rate: self.risk_free_rate,
            dividend_yield: self.dividend_yield,
            volatility: self.volatility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(BlackScholesInputs::new(100.0, 0.05, 0.0, 0.2).validate().is_ok());
        assert!(BlackScholesInputs::new(0.0, 0.05, 0.0, 0.2).validate().is_err());
        assert!(BlackScholesInputs::new(100.0, 0.05, 0.0, 0.0).validate().is_err());
        assert!(BlackScholesInputs::new(100.0, f64::NAN, 0.0, 0.2).validate().is_err());
    }
}

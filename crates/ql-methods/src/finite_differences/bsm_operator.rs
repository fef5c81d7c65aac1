//! Black-Scholes-Merton generator on a log-spaced price grid.
//!
//! In `x = ln S` the pricing PDE reads
//! `∂V/∂t + α·∂²V/∂x² + β·∂V/∂x − r·V = 0` with `α = σ²/2` and
//! `β = r − q − σ²/2`.  Central differences on a uniform `x` grid give
//! the interior rows
//!
//! * lower: `α/dx² − β/(2dx)`
//! * diag:  `−2α/dx² − r`
//! * upper: `α/dx² + β/(2dx)`
//!
//! The first and last rows are left at zero and are owned by the
//! boundary conditions.

use std::fmt;
use std::sync::Arc;

use ql_core::{
    errors::{Error, Result},
    Rate, Real, Time, Volatility,
};
use ql_math::Array;

use super::tridiagonal::{TimeSetter, TridiagonalOperator};

/// Relative tolerance used to check that a grid is evenly spaced in log.
const LOG_SPACING_TOLERANCE: Real = 1e-8;

/// Market coefficients of the Black-Scholes-Merton PDE as functions of time.
pub trait BsmCoefficients: fmt::Debug + Send + Sync {
    /// Instantaneous risk-free rate at `t`.
    fn rate(&self, t: Time) -> Rate;
    /// Instantaneous dividend yield at `t`.
    fn dividend_yield(&self, t: Time) -> Rate;
    /// Local volatility at `t`.
    fn volatility(&self, t: Time) -> Volatility;
}

/// Constant rate, dividend yield and volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatBsmCoefficients {
    /// Risk-free rate.
    pub rate: Rate,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Volatility.
    pub volatility: Volatility,
}

impl BsmCoefficients for FlatBsmCoefficients {
    fn rate(&self, _t: Time) -> Rate {
        self.rate
    }

    fn dividend_yield(&self, _t: Time) -> Rate {
        self.dividend_yield
    }

    fn volatility(&self, _t: Time) -> Volatility {
        self.volatility
    }
}

/// Rebuilds the BSM rows for the coefficients valid at a given time.
#[derive(Debug, Clone)]
pub struct BsmTimeSetter {
    dx: Real,
    coefficients: Arc<dyn BsmCoefficients>,
}

impl TimeSetter for BsmTimeSetter {
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator) {
        fill_interior(
            op,
            self.dx,
            self.coefficients.rate(t),
            self.coefficients.dividend_yield(t),
            self.coefficients.volatility(t),
        );
    }
}

/// Build the BSM generator on `grid` (prices, log-spaced).
///
/// With `time_dependent` set the returned operator recomputes its rows
/// whenever the evolver moves it to a new time; otherwise it is frozen
/// at the coefficients for `t`.
///
/// # Errors
/// [`Error::UnsupportedConfiguration`] if the grid has fewer than three
/// points, is not positive, or is not evenly spaced in `ln S`.
pub fn bsm_operator(
    grid: &Array,
    coefficients: Arc<dyn BsmCoefficients>,
    t: Time,
    time_dependent: bool,
) -> Result<TridiagonalOperator> {
    let dx = log_spacing(grid)?;
    let setter = BsmTimeSetter { dx, coefficients };
    let mut op = TridiagonalOperator::new(grid.size());
    setter.set_time(t, &mut op);
    if time_dependent {
        op = op.with_time_setter(Arc::new(setter));
    }
    Ok(op)
}

fn fill_interior(op: &mut TridiagonalOperator, dx: Real, r: Rate, q: Rate, sigma: Volatility) {
    let alpha = 0.5 * sigma * sigma;
    let beta = r - q - alpha;
    let a = alpha / (dx * dx) - beta / (2.0 * dx);
    let b = -2.0 * alpha / (dx * dx) - r;
    let c = alpha / (dx * dx) + beta / (2.0 * dx);
    for i in 1..op.size() - 1 {
        op.set_mid_row(i, a, b, c);
    }
}

fn log_spacing(grid: &Array) -> Result<Real> {
    let n = grid.size();
    if n < 3 {
        return Err(Error::UnsupportedConfiguration(format!(
            "the BSM operator needs at least 3 grid points, got {n}"
        )));
    }
    if grid[0] <= 0.0 {
        return Err(Error::UnsupportedConfiguration(format!(
            "the BSM operator needs a positive price grid, got grid[0] = {}",
            grid[0]
        )));
    }
    let dx = (grid[n - 1].ln() - grid[0].ln()) / (n - 1) as Real;
    for i in 1..n {
        let step = grid[i].ln() - grid[i - 1].ln();
        if (step - dx).abs() > LOG_SPACING_TOLERANCE * dx.abs().max(1.0) {
            return Err(Error::UnsupportedConfiguration(format!(
                "the BSM operator needs a log-uniform grid: step {i} is {step}, expected {dx}"
            )));
        }
    }
    Ok(dx)
}

//! `SampledCurve`: a function of the underlying sampled on a grid.
//!
//! The curve pairs a strictly increasing `grid` with a `values` array of
//! the same length.  Finite-difference engines mutate `values` in place
//! while rolling back, then read the price and the first two spatial
//! derivatives at the centre of the grid.
//!
//! The centre index is `n / 2`.  It is fixed when the curve is built;
//! none of the mutators below can change the number of points.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use crate::array::Array;
use crate::interpolation::{Interpolation1D, LinearInterpolation};

/// Paired grid / value arrays with centre-point finite-difference estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    grid: Array,
    values: Array,
    center: usize,
}

impl SampledCurve {
    /// Create a curve on `grid` with all values set to zero.
    ///
    /// # Errors
    /// Fails if `grid` is empty or not strictly increasing.
    pub fn new(grid: Array) -> Result<Self> {
        check_grid(&grid)?;
        let n = grid.size();
        Ok(Self {
            grid,
            values: Array::zeros(n),
            center: n / 2,
        })
    }

    /// Create a curve from a grid and matching values.
    pub fn from_grid_and_values(grid: Array, values: Array) -> Result<Self> {
        let mut curve = Self::new(grid)?;
        curve.set_values(values)?;
        Ok(curve)
    }

    /// Create an `n`-point curve on a logarithmically spaced grid in
    /// `[min, max]`.
    pub fn log_grid(min: Real, max: Real, n: usize) -> Result<Self> {
        Self::new(bounded_log_grid(min, max, n)?)
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// The centre index used by the `*_at_center` estimates.
    pub fn center(&self) -> usize {
        self.center
    }

    /// The grid abscissas.
    pub fn grid(&self) -> &Array {
        &self.grid
    }

    /// The sampled values.
    pub fn values(&self) -> &Array {
        &self.values
    }

    /// Mutable access to the values; the grid stays untouched.
    pub fn values_mut(&mut self) -> &mut Array {
        &mut self.values
    }

    /// Grid abscissa at index `i`.
    pub fn grid_value(&self, i: usize) -> Result<Real> {
        if i >= self.size() {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: self.size(),
            });
        }
        Ok(self.grid[i])
    }

    /// Replace the value sequence.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if `values` does not have one entry
    /// per grid point.
    pub fn set_values(&mut self, values: Array) -> Result<()> {
        if values.size() != self.size() {
            return Err(Error::DimensionMismatch {
                expected: self.size(),
                actual: values.size(),
            });
        }
        self.values = values;
        Ok(())
    }

    /// Replace the grid, keeping the values.
    pub fn set_grid(&mut self, grid: Array) -> Result<()> {
        if grid.size() != self.size() {
            return Err(Error::DimensionMismatch {
                expected: self.size(),
                actual: grid.size(),
            });
        }
        check_grid(&grid)?;
        self.grid = grid;
        Ok(())
    }

    /// Replace the grid with a log-spaced one on `[min, max]`.
    pub fn set_log_grid(&mut self, min: Real, max: Real) -> Result<()> {
        let grid = bounded_log_grid(min, max, self.size())?;
        self.grid = grid;
        Ok(())
    }

    /// Set every value to `f(grid[i])`.
    pub fn sample<F: Fn(Real) -> Real>(&mut self, f: F) {
        for (v, &x) in self.values.iter_mut().zip(self.grid.iter()) {
            *v = f(x);
        }
    }

    /// Linear interpolation of the curve at `x` (extrapolated beyond the
    /// grid ends).
    pub fn value_at(&self, x: Real) -> Result<Real> {
        if self.size() == 1 {
            return Ok(self.values[0]);
        }
        let interp = LinearInterpolation::new(self.grid.as_slice(), self.values.as_slice())?;
        Ok(interp.value(x))
    }

    /// Translate every grid point by `shift`.
    pub fn shift_grid(&mut self, shift: Real) {
        self.grid.apply_in_place(|x| x + shift);
    }

    /// Multiply every grid point by `factor` (must be positive).
    pub fn scale_grid(&mut self, factor: Real) -> Result<()> {
        ql_core::ensure!(factor > 0.0, "grid scale factor must be positive, got {factor}");
        self.grid.apply_in_place(|x| x * factor);
        Ok(())
    }

    /// Move the curve onto `new_grid`, interpolating the current values.
    ///
    /// The new grid must have the same number of points so that the
    /// centre index stays valid.
    pub fn regrid(&mut self, new_grid: Array) -> Result<()> {
        if new_grid.size() != self.size() {
            return Err(Error::DimensionMismatch {
                expected: self.size(),
                actual: new_grid.size(),
            });
        }
        check_grid(&new_grid)?;
        if self.size() > 1 {
            let interp = LinearInterpolation::new(self.grid.as_slice(), self.values.as_slice())?;
            let moved = new_grid.map(|x| interp.value(x));
            self.values = moved;
        }
        self.grid = new_grid;
        Ok(())
    }

    /// Value at the centre of the grid.
    ///
    /// For an even number of points this is the average of the two
    /// middle values.
    pub fn value_at_center(&self) -> Real {
        let (v, j) = (&self.values, self.center);
        if self.size() % 2 == 1 {
            v[j]
        } else {
            0.5 * (v[j] + v[j - 1])
        }
    }

    /// First derivative at the centre of the grid.
    ///
    /// Central difference over `j-1, j+1` for an odd number of points,
    /// the slope between the two middle points otherwise.  A one-point
    /// curve has no slope and returns zero.
    pub fn first_derivative_at_center(&self) -> Real {
        let (g, v, j) = (&self.grid, &self.values, self.center);
        match self.size() {
            1 => 0.0,
            n if n % 2 == 1 => (v[j + 1] - v[j - 1]) / (g[j + 1] - g[j - 1]),
            _ => (v[j] - v[j - 1]) / (g[j] - g[j - 1]),
        }
    }

    /// Second derivative at the centre of the grid.
    ///
    /// Curves with fewer than three points return zero.
    pub fn second_derivative_at_center(&self) -> Real {
        let (g, v, j) = (&self.grid, &self.values, self.center);
        match self.size() {
            1 | 2 => 0.0,
            n if n % 2 == 1 => {
                let delta_plus = (v[j + 1] - v[j]) / (g[j + 1] - g[j]);
                let delta_minus = (v[j] - v[j - 1]) / (g[j] - g[j - 1]);
                let ds = 0.5 * (g[j + 1] - g[j - 1]);
                (delta_plus - delta_minus) / ds
            }
            _ => {
                let delta_plus = (v[j + 1] - v[j - 1]) / (g[j + 1] - g[j - 1]);
                let delta_minus = (v[j] - v[j - 2]) / (g[j] - g[j - 2]);
                (delta_plus - delta_minus) / (g[j] - g[j - 1])
            }
        }
    }
}

/// An `n`-point grid whose logarithms are evenly spaced on `[min, max]`.
pub fn bounded_log_grid(min: Real, max: Real, n: usize) -> Result<Array> {
    ql_core::ensure!(n >= 2, "a log grid needs at least 2 points, got {n}");
    ql_core::ensure!(
        min > 0.0 && max > min,
        "log grid bounds must satisfy 0 < min < max, got [{min}, {max}]"
    );
    let (log_min, log_max) = (min.ln(), max.ln());
    let dx = (log_max - log_min) / (n - 1) as Real;
    let mut grid = Array::from_fn(n, |i| (log_min + i as Real * dx).exp());
    // pin the end points against rounding in exp(ln(x))
    grid[0] = min;
    grid[n - 1] = max;
    Ok(grid)
}

fn check_grid(grid: &Array) -> Result<()> {
    if grid.is_empty() {
        return Err(Error::InvalidArgument("sampled curve grid is empty".into()));
    }
    let s = grid.as_slice();
    if let Some(i) = (1..s.len()).find(|&i| s[i] <= s[i - 1]) {
        return Err(Error::InvalidArgument(format!(
            "grid must be strictly increasing: grid[{}] = {} >= grid[{}] = {}",
            i - 1,
            s[i - 1],
            i,
            s[i]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn curve(grid: &[Real], values: &[Real]) -> SampledCurve {
        SampledCurve::from_grid_and_values(Array::from_slice(grid), Array::from_slice(values))
            .unwrap()
    }

    #[test]
    fn linear_values_have_unit_slope_and_no_curvature() {
        let c = curve(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(c.center(), 1);
        assert_eq!(c.value_at_center(), 2.0);
        assert_eq!(c.first_derivative_at_center(), 1.0);
        assert_eq!(c.second_derivative_at_center(), 0.0);
    }

    #[test]
    fn quadratic_curvature_on_odd_grid() {
        let c = curve(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 1.0, 4.0, 9.0, 16.0]);
        assert_abs_diff_eq!(c.value_at_center(), 4.0);
        assert_abs_diff_eq!(c.first_derivative_at_center(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.second_derivative_at_center(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn even_grid_uses_the_two_middle_points() {
        let c = curve(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0]);
        assert_eq!(c.center(), 2);
        assert_abs_diff_eq!(c.value_at_center(), 2.5);
        assert_abs_diff_eq!(c.first_derivative_at_center(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.second_derivative_at_center(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tiny_curves_have_zero_derivatives() {
        let one = curve(&[5.0], &[7.0]);
        assert_eq!(one.value_at_center(), 7.0);
        assert_eq!(one.first_derivative_at_center(), 0.0);
        assert_eq!(one.second_derivative_at_center(), 0.0);

        let two = curve(&[0.0, 2.0], &[1.0, 5.0]);
        assert_eq!(two.value_at_center(), 3.0);
        assert_eq!(two.first_derivative_at_center(), 2.0);
        assert_eq!(two.second_derivative_at_center(), 0.0);
    }

    #[test]
    fn set_values_rejects_wrong_length() {
        let mut c = curve(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        let err = c.set_values(Array::from_slice(&[1.0, 2.0])).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
        // untouched after the failed call
        assert_eq!(c.values().as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn grid_must_be_strictly_increasing() {
        assert!(SampledCurve::new(Array::from_slice(&[0.0, 1.0, 1.0])).is_err());
        assert!(SampledCurve::new(Array::zeros(0)).is_err());
    }

    #[test]
    fn log_grid_has_even_log_spacing() {
        let c = SampledCurve::log_grid(50.0, 200.0, 3).unwrap();
        assert_abs_diff_eq!(c.grid()[0], 50.0);
        assert_abs_diff_eq!(c.grid()[1], 100.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c.grid()[2], 200.0);
        assert!(SampledCurve::log_grid(0.0, 1.0, 3).is_err());
    }

    #[test]
    fn shift_and_regrid_translate_the_function() {
        let grid = Array::from_slice(&[0.0, 1.0, 2.0, 3.0]);
        let mut c = SampledCurve::new(grid.clone()).unwrap();
        c.sample(|x| 2.0 * x);
        c.shift_grid(0.5);
        c.regrid(grid).unwrap();
        // f(x) = 2 (x - 0.5) on the original grid
        assert_abs_diff_eq!(c.values()[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.values()[3], 5.0, epsilon = 1e-12);
        // extrapolated below the shifted grid
        assert_abs_diff_eq!(c.values()[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn value_at_interpolates() {
        let c = curve(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(c.value_at(0.25).unwrap(), 1.25);
        assert!(c.grid_value(3).is_err());
    }
}

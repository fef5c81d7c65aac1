//! Linear interpolation used to move sampled curves between grids.

use ql_core::{errors::Result, Real};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    ///
    /// Points outside `[x_min, x_max]` are extrapolated from the nearest
    /// interval.
    fn value(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Piecewise-linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone)]
pub struct LinearInterpolation<'a> {
    xs: &'a [Real],
    ys: &'a [Real],
}

impl<'a> LinearInterpolation<'a> {
    /// Borrow sorted `xs` and the corresponding `ys`.
    ///
    /// # Errors
    /// Fails if the slices have different lengths or fewer than 2 points.
    pub fn new(xs: &'a [Real], ys: &'a [Real]) -> Result<Self> {
        ql_core::ensure!(xs.len() >= 2, "need at least 2 points for interpolation");
        ql_core::ensure!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must have the same length",
            xs.len(),
            ys.len()
        );
        Ok(Self { xs, ys })
    }

    /// Index `i` of the interval `[x[i], x[i+1]]` used for `x`.
    fn locate(&self, x: Real) -> usize {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return 0;
        }
        if x >= self.xs[n - 1] {
            return n - 2;
        }
        // first index with xs[i] > x, minus one
        self.xs.partition_point(|&xi| xi <= x) - 1
    }
}

impl Interpolation1D for LinearInterpolation<'_> {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = self.locate(x);
        let dx = self.xs[i + 1] - self.xs[i];
        if dx.abs() < f64::EPSILON {
            return self.ys[i];
        }
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

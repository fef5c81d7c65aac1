//! Tridiagonal operators and the Thomas-algorithm solver.

use std::fmt;
use std::sync::Arc;

use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;

/// Recomputes the coefficients of a time-dependent operator.
///
/// The setter is handed the operator itself so that it can rewrite the
/// interior rows for time `t`; edge rows are left to the boundary
/// conditions.
pub trait TimeSetter: fmt::Debug + Send + Sync {
    /// Fill `op` with the coefficients valid at time `t`.
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator);
}

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands. Used for 1-D finite
/// difference discretisations of second-order PDEs.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused, starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused, ends at row n−2).
    pub upper: Vec<Real>,
    time_setter: Option<Arc<dyn TimeSetter>>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            time_setter: None,
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut op = Self::new(n);
        op.diag.fill(1.0);
        op
    }

    /// Attach a time setter, making the operator time dependent.
    pub fn with_time_setter(mut self, setter: Arc<dyn TimeSetter>) -> Self {
        self.time_setter = Some(setter);
        self
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Whether the coefficients change with time.
    pub fn is_time_dependent(&self) -> bool {
        self.time_setter.is_some()
    }

    /// Recompute the coefficients for time `t` (no-op for constant operators).
    pub fn set_time(&mut self, t: Time) {
        if let Some(setter) = self.time_setter.clone() {
            setter.set_time(t, self);
        }
    }

    /// Overwrite the first row with `[diag, upper, 0, …]`.
    pub fn set_first_row(&mut self, diag: Real, upper: Real) {
        self.diag[0] = diag;
        self.upper[0] = upper;
    }

    /// Overwrite interior row `i` with `[…, lower, diag, upper, …]`.
    pub fn set_mid_row(&mut self, i: usize, lower: Real, diag: Real, upper: Real) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Overwrite the last row with `[…, 0, lower, diag]`.
    pub fn set_last_row(&mut self, lower: Real, diag: Real) {
        let n = self.size();
        self.lower[n - 1] = lower;
        self.diag[n - 1] = diag;
    }

    /// Return `I + factor · A` (the time setter is not carried over).
    pub fn identity_plus(&self, factor: Real) -> Self {
        let scale = |band: &[Real]| band.iter().map(|v| factor * v).collect::<Vec<_>>();
        let mut op = Self {
            lower: scale(&self.lower),
            diag: scale(&self.diag),
            upper: scale(&self.upper),
            time_setter: None,
        };
        for d in &mut op.diag {
            *d += 1.0;
        }
        op
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &Array) -> Result<Array> {
        let n = self.size();
        check_size(n, x)?;
        Ok(Array::from_fn(n, |i| {
            let mut y = self.diag[i] * x[i];
            if i > 0 {
                y += self.lower[i] * x[i - 1];
            }
            if i + 1 < n {
                y += self.upper[i] * x[i + 1];
            }
            y
        }))
    }

    /// Solve `A · x = rhs` using the Thomas algorithm.
    ///
    /// # Errors
    /// Fails on a size mismatch or a vanishing pivot.
    pub fn solve(&self, rhs: &Array) -> Result<Array> {
        let n = self.size();
        check_size(n, rhs)?;
        if n == 0 {
            return Ok(Array::zeros(0));
        }

        // Forward sweep
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        let pivot = checked_pivot(self.diag[0], 0)?;
        c_prime[0] = self.upper[0] / pivot;
        d_prime[0] = rhs[0] / pivot;

        for i in 1..n {
            let m = checked_pivot(self.diag[i] - self.lower[i] * c_prime[i - 1], i)?;
            if i < n - 1 {
                c_prime[i] = self.upper[i] / m;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        // Back substitution
        let mut x = Array::zeros(n);
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        Ok(x)
    }
}

fn check_size(n: usize, x: &Array) -> Result<()> {
    if x.size() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: x.size(),
        });
    }
    Ok(())
}

fn checked_pivot(pivot: Real, row: usize) -> Result<Real> {
    if pivot.abs() < f64::MIN_POSITIVE {
        return Err(Error::Runtime(format!(
            "tridiagonal solve: zero pivot at row {row}"
        )));
    }
    Ok(pivot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct DiagonalIsTime;

    impl TimeSetter for DiagonalIsTime {
        fn set_time(&self, t: Time, op: &mut TridiagonalOperator) {
            op.diag.fill(t);
        }
    }

    #[test]
    fn thomas_algorithm_solves_identity() {
        let op = TridiagonalOperator::identity(4);
        let rhs = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let x = op.solve(&rhs).unwrap();
        assert_eq!(x, rhs);
    }

    #[test]
    fn thomas_algorithm_solves_tridiagonal() {
        // A = [[2, -1, 0], [-1, 2, -1], [0, -1, 2]], x = [1, 2, 3], Ax = [0, 0, 4]
        let mut op = TridiagonalOperator::new(3);
        op.set_first_row(2.0, -1.0);
        op.set_mid_row(1, -1.0, 2.0, -1.0);
        op.set_last_row(-1.0, 2.0);
        let x = op.solve(&Array::from_slice(&[0.0, 0.0, 4.0])).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
        assert!((x[2] - 3.0).abs() < 1e-12);

        let back = op.apply(&x).unwrap();
        assert!((back[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn identity_plus_scales_then_adds_identity() {
        let mut op = TridiagonalOperator::new(3);
        op.set_mid_row(1, 1.0, -2.0, 1.0);
        let shifted = op.identity_plus(0.5);
        assert_eq!(shifted.diag, vec![1.0, 0.0, 1.0]);
        assert_eq!(shifted.lower[1], 0.5);
        assert_eq!(shifted.upper[1], 0.5);
    }

    #[test]
    fn size_mismatch_and_zero_pivot_are_errors() {
        let op = TridiagonalOperator::new(3);
        assert!(matches!(
            op.apply(&Array::zeros(2)),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert!(op.solve(&Array::zeros(3)).is_err());
    }

    #[test]
    fn time_setter_rewrites_coefficients() {
        let mut op = TridiagonalOperator::new(2).with_time_setter(Arc::new(DiagonalIsTime));
        assert!(op.is_time_dependent());
        op.set_time(0.25);
        assert_eq!(op.diag, vec![0.25, 0.25]);
        assert!(!op.identity_plus(1.0).is_time_dependent());
    }
}

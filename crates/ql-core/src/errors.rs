//! Error types for the finite-difference toolkit.
//!
//! A single `thiserror`-derived enum covers every failure the pricing
//! stack can report.  The `ensure!`, `ensure_post!` and `fail!` macros
//! provide the usual precondition / postcondition / failure shorthands.

use thiserror::Error;

/// The error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Event times are out of order, or the first event is not positive.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A value sequence does not match the length of its grid.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Length required by the grid.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A rollback was requested with fewer than one sub-step.
    #[error("degenerate step count: {steps} (at least one step required)")]
    DegenerateStep {
        /// The rejected step count.
        steps: usize,
    },

    /// A correction / operator combination that cannot be priced.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> ql_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_steps(steps: usize) -> Result<usize> {
        if steps < 1 {
            return Err(Error::DegenerateStep { steps });
        }
        Ok(steps)
    }

    #[test]
    fn messages_name_the_offending_values() {
        let e = Error::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(e.to_string(), "dimension mismatch: expected 3 values, got 2");

        let e = Error::InvalidSchedule("0.5 is not smaller than 0.3".into());
        assert!(e.to_string().contains("0.5"));
        assert!(e.to_string().contains("0.3"));
    }

    #[test]
    fn degenerate_step_is_reported() {
        assert_eq!(needs_steps(0), Err(Error::DegenerateStep { steps: 0 }));
        assert_eq!(needs_steps(4), Ok(4));
    }
}

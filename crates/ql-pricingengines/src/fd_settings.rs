//! Configuration shared by the finite-difference engines.

use ql_core::{
    errors::{Error, Result},
    Real, Size,
};
use ql_methods::FdmScheme;

/// Tolerances used to classify event times near the ends of the horizon.
///
/// An event earlier than `relative × T` is treated as paid at time zero;
/// an event within `absolute` of `T` is treated as falling on the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTolerances {
    /// Fraction of the residual time below which an event counts as zero.
    pub relative: Real,
    /// Absolute distance from the residual time within which an event is
    /// on the horizon.
    pub absolute: Real,
}

impl Default for DateTolerances {
    fn default() -> Self {
        Self {
            relative: 1e-6,
            absolute: 1e-6,
        }
    }
}

impl DateTolerances {
    /// Check both tolerances are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("relative", self.relative), ("absolute", self.absolute)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidArgument(format!(
                    "{name} date tolerance must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Discretisation settings for the finite-difference engines.
///
/// # Example
/// ```
/// use ql_pricingengines::FdEngineSettings;
/// use ql_methods::FdmScheme;
///
/// let settings = FdEngineSettings::default()
///     .with_time_steps(200)
///     .with_grid_points(201)
///     .with_scheme(FdmScheme::Implicit);
/// assert!(settings.validate().is_ok());
/// assert_eq!(settings.time_steps, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdEngineSettings {
    /// Sub-steps per rollback period (between consecutive events).
    pub time_steps: Size,
    /// Requested number of price grid points; raised for long maturities.
    pub grid_points: Size,
    /// Re-evaluate the operator coefficients at every sub-step.
    pub time_dependent: bool,
    /// θ-scheme used for each sub-step.
    pub scheme: FdmScheme,
    /// Event classification tolerances.
    pub tolerances: DateTolerances,
}

impl Default for FdEngineSettings {
    fn default() -> Self {
        Self {
            time_steps: 100,
            grid_points: 100,
            time_dependent: false,
            scheme: FdmScheme::CrankNicolson,
            tolerances: DateTolerances::default(),
        }
    }
}

impl FdEngineSettings {
    /// Set the sub-steps per period.
    pub fn with_time_steps(mut self, time_steps: Size) -> Self {
        self.time_steps = time_steps;
        self
    }

    /// Set the requested grid size.
    pub fn with_grid_points(mut self, grid_points: Size) -> Self {
        self.grid_points = grid_points;
        self
    }

    /// Toggle time-dependent operator coefficients.
    pub fn with_time_dependent(mut self, time_dependent: bool) -> Self {
        self.time_dependent = time_dependent;
        self
    }

    /// Set the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the event classification tolerances.
    pub fn with_tolerances(mut self, tolerances: DateTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Reject settings no engine can run with.
    ///
    /// # Errors
    /// * [`Error::DegenerateStep`] if `time_steps == 0`;
    /// * [`Error::InvalidArgument`] for fewer than three grid points or
    ///   invalid tolerances.
    pub fn validate(&self) -> Result<()> {
        if self.time_steps < 1 {
            return Err(Error::DegenerateStep {
                steps: self.time_steps,
            });
        }
        if self.grid_points < 3 {
            return Err(Error::InvalidArgument(format!(
                "at least 3 grid points required, got {}",
                self.grid_points
            )));
        }
        self.tolerances.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = FdEngineSettings::default();
        assert_eq!(s.time_steps, 100);
        assert_eq!(s.grid_points, 100);
        assert!(!s.time_dependent);
        assert_eq!(s.scheme, FdmScheme::CrankNicolson);
        assert_eq!(s.tolerances.relative, 1e-6);
        assert_eq!(s.tolerances.absolute, 1e-6);
    }

    #[test]
    fn validation_catches_degenerate_settings() {
        let zero_steps = FdEngineSettings::default().with_time_steps(0);
        assert_eq!(zero_steps.validate(), Err(Error::DegenerateStep { steps: 0 }));

        let tiny_grid = FdEngineSettings::default().with_grid_points(2);
        assert!(matches!(tiny_grid.validate(), Err(Error::InvalidArgument(_))));

        let bad_tol = FdEngineSettings::default().with_tolerances(DateTolerances {
            relative: -1.0,
            absolute: 1e-6,
        });
        assert!(bad_tol.validate().is_err());
    }
}

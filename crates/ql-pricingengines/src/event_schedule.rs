//! Resolution of an event schedule against the pricing horizon.
//!
//! The multi-period engine walks events from the latest to the earliest.
//! Two events get special treatment: one so close to the valuation date
//! that it is effectively paid at time zero, and one falling on the
//! horizon itself.  Both are pulled out of the main rollback loop.

use ql_core::{
    errors::{Error, Result},
    Real, Size, Time,
};

use crate::fd_settings::DateTolerances;

/// Event times checked and classified for one pricing run.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSchedule {
    times: Vec<Time>,
    residual_time: Time,
    first_event_is_zero: bool,
    last_event_is_horizon: bool,
    first_non_zero_time: Time,
}

impl EventSchedule {
    /// Check `times` against the horizon `residual_time` and classify its
    /// end points.
    ///
    /// # Errors
    /// * [`Error::InvalidArgument`] if the horizon is not positive;
    /// * [`Error::InvalidSchedule`] if the first event is not positive,
    ///   two events are out of order, or an event lies beyond the horizon.
    ///
    /// Events after the horizon but within the absolute tolerance of it
    /// are moved onto the horizon, so no rollback leg runs forward.
    pub fn resolve(
        mut times: Vec<Time>,
        residual_time: Time,
        tolerances: &DateTolerances,
    ) -> Result<Self> {
        if !(residual_time > 0.0 && residual_time.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "residual time must be positive, got {residual_time}"
            )));
        }

        let Some((&first, &last)) = times.first().zip(times.last()) else {
            return Ok(Self {
                times,
                residual_time,
                first_event_is_zero: false,
                last_event_is_horizon: false,
                first_non_zero_time: residual_time,
            });
        };

        if first.is_nan() || first <= 0.0 {
            return Err(Error::InvalidSchedule(format!(
                "first event time ({first}) must be positive"
            )));
        }
        if let Some(w) = times.windows(2).find(|w| !(w[0] <= w[1])) {
            return Err(Error::InvalidSchedule(format!(
                "event times must be non-decreasing: {} is followed by {}",
                w[0], w[1]
            )));
        }

        let last_event_is_horizon = (last - residual_time).abs() < tolerances.absolute;
        if last > residual_time && !last_event_is_horizon {
            return Err(Error::InvalidSchedule(format!(
                "last event time ({last}) lies beyond the horizon ({residual_time})"
            )));
        }

        for t in times.iter_mut().filter(|t| **t > residual_time) {
            *t = residual_time;
        }
        let first = first.min(residual_time);

        let first_event_is_zero = first < residual_time * tolerances.relative;
        let first_non_zero_time = if first_event_is_zero {
            times.get(1).copied().unwrap_or(residual_time)
        } else {
            first
        };

        Ok(Self {
            times,
            residual_time,
            first_event_is_zero,
            last_event_is_horizon,
            first_non_zero_time,
        })
    }

    /// The event times, earliest first.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Number of events.
    pub fn len(&self) -> Size {
        self.times.len()
    }

    /// Whether there are no events.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The pricing horizon `T`.
    pub fn residual_time(&self) -> Time {
        self.residual_time
    }

    /// The first event is within the relative tolerance of time zero.
    pub fn first_event_is_zero(&self) -> bool {
        self.first_event_is_zero
    }

    /// The last event is within the absolute tolerance of the horizon.
    pub fn last_event_is_horizon(&self) -> bool {
        self.last_event_is_horizon
    }

    /// The earliest event time not treated as zero, or the horizon if
    /// there is none.
    pub fn first_non_zero_time(&self) -> Time {
        self.first_non_zero_time
    }

    /// Lowest index visited by the rollback loop: `0` when the first event
    /// is at zero, `-1` otherwise (the leg that ends just before zero).
    pub fn first_index(&self) -> isize {
        if self.first_event_is_zero {
            0
        } else {
            -1
        }
    }

    /// Highest index visited by the rollback loop; the horizon event, if
    /// any, is excluded.
    pub fn last_index(&self) -> isize {
        let n = self.times.len() as isize;
        if self.last_event_is_horizon {
            n - 2
        } else {
            n - 1
        }
    }

    /// Whether event `j` ends a rollback leg of its own.
    ///
    /// An event at zero is reached by the final rollback instead.
    pub fn is_loop_event(&self, j: isize) -> bool {
        j > 0 || (j == 0 && !self.first_event_is_zero)
    }

    /// Internal step size: `T / (m·(n + 1))`, halved below the first
    /// non-zero event time when it would reach it.
    pub fn step_size(&self, steps_per_period: Size) -> Time {
        let dt = self.residual_time / (steps_per_period * (self.times.len() + 1)) as Real;
        if self.first_non_zero_time <= dt {
            self.first_non_zero_time / 2.0
        } else {
            dt
        }
    }
}

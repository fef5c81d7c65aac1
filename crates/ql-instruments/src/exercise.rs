//! Option exercise rights, expressed in year fractions from the
//! valuation date.
//!
//! Converting calendar dates to times is the caller's job; the engines
//! only ever see the resulting reals.

use ql_core::Time;
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
    /// Can be exercised on specific dates.
    Bermudan,
}

/// Exercise terms of an option.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    /// - European: the expiry.
    /// - American: expiry only (exercisable over `(0, expiry]`).
    /// - Bermudan: the exercise times as given, expiry last.
    times: Vec<Time>,
}

impl Exercise {
    /// Exercise at `expiry` only.
    pub fn european(expiry: Time) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        }
    }

    /// Exercise at any time up to `expiry`.
    pub fn american(expiry: Time) -> Self {
        Self {
            exercise_type: ExerciseType::American,
            times: vec![expiry],
        }
    }

    /// Exercise at each of `times`.
    ///
    /// The times are kept in the order given; the pricing engines reject
    /// unordered schedules instead of reordering them.
    pub fn bermudan(times: Vec<Time>) -> Self {
        Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        }
    }

    /// The last exercise time, if any.
    pub fn last_time(&self) -> Option<Time> {
        self.times.last().copied()
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.exercise_type, self.last_time()) {
            (_, None) => write!(f, "{:?}(no dates)", self.exercise_type),
            (ExerciseType::European, Some(t)) => write!(f, "European({t})"),
            (ExerciseType::American, Some(t)) => write!(f, "American(0 – {t})"),
            (ExerciseType::Bermudan, Some(_)) => write!(f, "Bermudan({} dates)", self.times.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn european_and_american_end_at_expiry() {
        let eu = Exercise::european(1.5);
        assert_eq!(eu.exercise_type(), ExerciseType::European);
        assert_eq!(eu.last_time(), Some(1.5));
        assert_eq!(Exercise::american(2.0).to_string(), "American(0 – 2)");
    }

    #[test]
    fn bermudan_keeps_the_given_order() {
        let ex = Exercise::bermudan(vec![0.5, 0.25, 1.0]);
        assert_eq!(ex.times(), &[0.5, 0.25, 1.0]);
        assert_eq!(ex.last_time(), Some(1.0));
        assert_eq!(ex.to_string(), "Bermudan(3 dates)");
        assert_eq!(Exercise::bermudan(vec![]).last_time(), None);
    }
}

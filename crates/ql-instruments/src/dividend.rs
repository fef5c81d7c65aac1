//! Discrete cash dividends paid by the underlying.

use ql_core::{Real, Time};

/// A cash amount paid at a given time from the valuation date.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashDividend {
    /// Payment time in years.
    pub time: Time,
    /// Amount per share.
    pub amount: Real,
}

impl CashDividend {
    /// Create a dividend of `amount` paid at `time`.
    pub fn new(time: Time, amount: Real) -> Self {
        Self { time, amount }
    }
}

/// Build a dividend schedule from parallel slices of times and amounts.
///
/// Extra entries in the longer slice are ignored.
pub fn dividend_vector(times: &[Time], amounts: &[Real]) -> Vec<CashDividend> {
    times
        .iter()
        .zip(amounts)
        .map(|(&t, &a)| CashDividend::new(t, a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paired_schedule() {
        let divs = dividend_vector(&[0.25, 0.75], &[1.0, 1.5]);
        assert_eq!(divs.len(), 2);
        assert_eq!(divs[1], CashDividend::new(0.75, 1.5));
    }
}

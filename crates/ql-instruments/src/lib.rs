//! # ql-instruments
//!
//! One-asset options as seen by the finite-difference engines: payoffs,
//! exercise rights in year fractions, cash dividends, and the
//! arguments/results envelope exchanged with pricing engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dividend;
pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use dividend::{dividend_vector, CashDividend};
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::{OneAssetOptionArguments, VanillaOption};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};

//! # ql-pricingengines
//!
//! Finite-difference pricing engines for one-asset options, built around
//! the multi-period rollback driver.
//!
//! ## Engines
//!
//! - [`FdMultiPeriodEngine`]: schedule-walking rollback with per-event corrections
//! - [`FdEuropeanEngine`]: European exercise
//! - [`FdAmericanEngine`]: American exercise (clamp at every sub-step)
//! - [`FdBermudanEngine`]: exercise on a discrete schedule
//! - [`FdDividendEuropeanEngine`] / [`FdDividendAmericanEngine`]: cash dividends
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton closed form

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod black_scholes_inputs;
pub mod event_schedule;
pub mod fd_american_engine;
pub mod fd_bermudan_engine;
pub mod fd_dividend_engine;
pub mod fd_european_engine;
pub mod fd_multi_period_engine;
pub mod fd_settings;
pub mod fd_vanilla_engine;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine, BlackScholesGreeks};
pub use black_scholes_inputs::BlackScholesInputs;
pub use event_schedule::EventSchedule;
pub use fd_american_engine::FdAmericanEngine;
pub use fd_bermudan_engine::{ExerciseFloor, FdBermudanEngine};
pub use fd_dividend_engine::{DividendShift, FdDividendAmericanEngine, FdDividendEuropeanEngine};
pub use fd_european_engine::FdEuropeanEngine;
pub use fd_multi_period_engine::{
    EventHandler, FdMultiPeriodEngine, MultiPeriodResults, NoEventHandler, PRICE_CURVE,
};
pub use fd_settings::{DateTolerances, FdEngineSettings};
pub use fd_vanilla_engine::{FdVanillaEngine, GridLimits};

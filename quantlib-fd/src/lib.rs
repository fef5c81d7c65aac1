//! # quantlib-fd
//!
//! Finite-difference option pricing in the QuantLib tradition.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib_fd::instruments::{OptionType, VanillaOption};
//! use quantlib_fd::pricingengines::{BlackScholesInputs, FdAmericanEngine, FdEngineSettings};
//!
//! let market = BlackScholesInputs::new(100.0, 0.05, 0.0, 0.2);
//! let engine = FdAmericanEngine::new(market, FdEngineSettings::default());
//! let put = VanillaOption::american(OptionType::Put, 100.0, 1.0);
//! let results = put.price(&engine)?;
//! assert!(results.npv > 5.0 && results.npv < 7.0);
//! # Ok::<(), quantlib_fd::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, sampled curves and interpolation.
pub use ql_math as math;

/// Finite-difference operators, conditions and rollback models.
pub use ql_methods as methods;

/// Payoffs, exercise schedules and dividends.
pub use ql_instruments as instruments;

/// Multi-period and vanilla finite-difference engines.
pub use ql_pricingengines as pricingengines;

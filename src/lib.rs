//! Sedori engine - decision-support calculations for reseller businesses.
//!
//! This crate is the side-effect-free core behind a reseller ("sedori")
//! management application: it turns raw price and form inputs into
//! validated business metrics, classifies price histories into trends with
//! forward predictions and recommendations, and ranks product candidates
//! for search. Persistence, transport, and authentication live in the
//! calling application, not here.
//!
//! # Modules
//!
//! - [`config`] - Engine tuning loaded from TOML, with logging setup
//! - [`domain`] - Money, profitability, price trends, candidate ranking
//! - [`error`] - The closed error taxonomy every failure maps into
//! - [`validation`] - Field rules and whole-form validation pipelines
//! - [`cli`] - Command-line front end for the `sedori` binary
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use sedori_engine::domain::{compute_profit, Money};
//!
//! let cost = Money::try_new(dec!(1000))?;
//! let price = Money::try_new(dec!(1500))?;
//! let report = compute_profit(&cost, &price);
//!
//! assert!(report.is_profitable());
//! assert_eq!(report.margin_display(), "33.3");
//! # Ok::<(), sedori_engine::error::AppError>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod validation;

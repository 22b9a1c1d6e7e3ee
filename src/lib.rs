//! # tributo
//!
//! Calculation core for the Brazilian consumption-tax reform (EC 132/2023,
//! LC 214/2025): legacy ICMS/PIS/COFINS, the IBS/CBS phase-in from 2026 to
//! 2033, multi-year burden simulation, and PIS/COFINS non-cumulative
//! credits.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Every operation is pure and returns a [`Result`]; only the credit
//! use case talks to the outside world, through a repository port.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tributo::core::*;
//! use rust_decimal_macros::dec;
//!
//! let base = BaseCalculo::create_with_reduction(
//!     Money::brl(dec!(1000)),
//!     Aliquota::from_percentage(dec!(20)).unwrap(),
//! )
//! .unwrap();
//! let icms = TaxAmount::calculate(base, Aliquota::from_percentage(dec!(18)).unwrap());
//! assert_eq!(icms.value().amount(), dec!(144.00));
//!
//! let regime = RegimeResolver::resolve(NaiveDate::from_ymd_opt(2030, 6, 15).unwrap());
//! assert_eq!(regime, Regime::Transition);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Money, rates, bases, tax amounts, UF/CFOP/NCM, regime resolver |
//! | `calculation` (default) | Rate tables, transition schedule, item orchestrator |
//! | `simulation` (default) | Multi-year legacy vs. reform comparison |
//! | `credits` (default) | PIS/COFINS credit calculator and processing use case |
//! | `json` | Load calculation configuration from JSON |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "calculation")]
pub mod calculation;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "credits")]
pub mod credits;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

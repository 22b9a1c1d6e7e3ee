//! Core value objects and regime classification.
//!
//! Everything here is immutable and validated on construction: money,
//! rates, taxable bases, tax amounts, fiscal classification codes, and
//! the date-to-regime resolver.

mod aliquota;
mod base_calculo;
mod classification;
mod error;
mod money;
mod regime;
mod tax_amount;
mod tolerance;

pub use aliquota::{Aliquota, RATE_SCALE};
pub use base_calculo::BaseCalculo;
pub use classification::{Cfop, Direction, Ncm, OperationScope, Region, Uf};
pub use error::{ErrorCategory, FieldError, TaxError};
#[cfg(feature = "credits")]
pub(crate) use error::structural_from;
pub use money::{CurrencyCode, MONEY_SCALE, Money};
pub use regime::{
    NEW_REGIME_START_YEAR, Regime, RegimeInfo, RegimeResolver, TRANSITION_START_YEAR,
};
pub use tax_amount::TaxAmount;
pub use tolerance::{TAX_VALUE_TOLERANCE, within_tolerance};
#[cfg(feature = "simulation")]
pub(crate) use tolerance::round_half_up;

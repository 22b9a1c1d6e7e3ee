//! Item-level tax calculation.
//!
//! [`TaxCalculationOrchestrator`] resolves the regime of an operation date
//! and produces the legacy breakdown (ICMS, PIS, COFINS), the IBS/CBS
//! breakdown, or both weighted by the [`TransitionSchedule`].
//!
//! # Example
//!
//! ```
//! use tributo::calculation::{TaxCalculationInput, TaxCalculationOrchestrator};
//! use tributo::core::{Cfop, Money, Regime, Uf};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let orchestrator = TaxCalculationOrchestrator::default();
//! let input = TaxCalculationInput::new(
//!     "item-1",
//!     Money::brl(dec!(1000)),
//!     NaiveDate::from_ymd_opt(2033, 2, 1).unwrap(),
//!     Cfop::parse("5102").unwrap(),
//!     None,
//!     Uf::SP,
//!     Uf::SP,
//! );
//! let result = orchestrator.calculate(&input).unwrap();
//! assert_eq!(result.regime, Regime::New);
//! assert_eq!(result.total_tax.amount(), dec!(265.00));
//! ```

mod config;
mod ibs_cbs;
mod legacy;
mod orchestrator;

pub use config::{
    CalculationConfig, CalculationConfigBuilder, LegacyRates, NewRegimeRates, PhaseIn,
    TransitionSchedule,
};
pub use ibs_cbs::{
    Deferral, GovernmentEntity, GovernmentPurchase, IbsCbsGroup, IbsCbsGroupBuilder,
    PresumedCredit, RateReduction, Refund,
};
pub use legacy::{LegacyTaxes, calculate_legacy, icms_rate};
pub use orchestrator::{ItemTaxResult, TaxCalculationInput, TaxCalculationOrchestrator};

//! PIS/COFINS non-cumulative credits on entry documents.
//!
//! [`TaxCreditCalculator`] turns one [`FiscalDocumentData`] into a
//! [`TaxCreditResult`]; [`ProcessTaxCreditsUseCase`] drives it over the
//! pending documents of an organization through a [`TaxCreditRepository`].
//!
//! ```
//! use tributo::credits::*;
//! use tributo::core::Money;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let document = FiscalDocumentData::new(
//!     "NF-1",
//!     "org-1",
//!     NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
//!     OperationType::Entry,
//! )
//! .with_item(DocumentItem::new("1", "1102", "84713012", Money::brl(dec!(1000))));
//!
//! let credit = TaxCreditCalculator::default().calculate(&document).unwrap();
//! assert!(credit.has_credit().unwrap());
//! assert_eq!(credit.get_total_credit().unwrap().amount(), dec!(92.50));
//! ```

mod calculator;
mod document;
mod repository;
mod result;
mod rules;
mod use_case;

pub use calculator::{CreditCalculation, TaxCreditCalculator};
pub use document::{DocumentItem, FiscalDocumentData, OperationType};
pub use repository::{InMemoryTaxCreditRepository, RegisteredCredit, TaxCreditRepository};
pub use result::{CreditLine, IneligibleItem, TaxCreditResult};
pub use rules::{
    CreditKind, CreditRates, FIXED_ASSET_INSTALLMENTS, PresumedCreditRule, classify_entry,
    presumed_credit_rule,
};
pub use use_case::{
    DocumentError, ProcessTaxCreditsRequest, ProcessTaxCreditsSummary, ProcessTaxCreditsUseCase,
};

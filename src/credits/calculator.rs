use rust_decimal::Decimal;

use crate::core::{
    BaseCalculo, Cfop, CurrencyCode, Direction, FieldError, Money, Ncm, TaxAmount,
    TaxError, structural_from,
};

use super::document::{DocumentItem, FiscalDocumentData, OperationType};
use super::result::{CreditLine, IneligibleItem, TaxCreditResult};
use super::rules::{
    CreditKind, CreditRates, FIXED_ASSET_INSTALLMENTS, classify_entry, presumed_credit_rule,
};

/// Rule engine for PIS/COFINS non-cumulative credits of one document.
///
/// Fails only on structurally invalid documents, reporting every problem
/// at once. Ineligible items and exit documents are normal outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxCreditCalculator {
    rates: CreditRates,
}

/// Turns one fiscal document into its credit aggregate.
///
/// [`ProcessTaxCreditsUseCase`](super::ProcessTaxCreditsUseCase) is generic
/// over this, with [`TaxCreditCalculator`] as the default.
pub trait CreditCalculation: Send + Sync {
    fn calculate(&self, document: &FiscalDocumentData) -> Result<TaxCreditResult, TaxError>;
}

impl CreditCalculation for TaxCreditCalculator {
    fn calculate(&self, document: &FiscalDocumentData) -> Result<TaxCreditResult, TaxError> {
        TaxCreditCalculator::calculate(self, document)
    }
}

/// An item whose classification fields passed structural checks.
struct CheckedItem<'a> {
    item: &'a DocumentItem,
    cfop: Cfop,
    ncm: Ncm,
    credit_base: Money,
}

impl TaxCreditCalculator {
    pub fn new(rates: CreditRates) -> Self {
        Self { rates }
    }

    pub fn calculate(&self, document: &FiscalDocumentData) -> Result<TaxCreditResult, TaxError> {
        let (operation, currency, items) = check_document(document)?;

        let mut lines = Vec::new();
        let mut ineligible = Vec::new();
        for checked in items {
            if operation == OperationType::Exit {
                ineligible.push(IneligibleItem {
                    item_id: checked.item.item_id.clone(),
                    reason: "exit operations do not earn credit".into(),
                });
                continue;
            }
            match classify_entry(checked.cfop) {
                Ok(kind) => lines.push(self.credit_line(&checked, kind)?),
                Err(reason) => ineligible.push(IneligibleItem {
                    item_id: checked.item.item_id.clone(),
                    reason,
                }),
            }
        }

        TaxCreditResult::new(
            document.document_id.clone(),
            document.organization_id.clone(),
            currency,
            lines,
            ineligible,
        )
    }

    fn credit_line(
        &self,
        checked: &CheckedItem<'_>,
        mut kind: CreditKind,
    ) -> Result<CreditLine, TaxError> {
        let base = BaseCalculo::create(checked.credit_base)?;
        let mut pis_rate = self.rates.pis;
        let mut cofins_rate = self.rates.cofins;
        let mut legal_basis = None;

        if kind == CreditKind::Inputs {
            if let Some(rule) = presumed_credit_rule(&checked.ncm) {
                pis_rate = pis_rate.scaled_by(&rule.share);
                cofins_rate = cofins_rate.scaled_by(&rule.share);
                kind = CreditKind::Presumed;
                legal_basis = Some(rule.legal_basis.to_string());
            }
        }

        let mut pis = TaxAmount::calculate(base, pis_rate).value();
        let mut cofins = TaxAmount::calculate(base, cofins_rate).value();
        let installments = if kind == CreditKind::FixedAsset {
            let months = Decimal::from(FIXED_ASSET_INSTALLMENTS);
            pis = Money::of(pis.amount() / months, pis.currency());
            cofins = Money::of(cofins.amount() / months, cofins.currency());
            Some(FIXED_ASSET_INSTALLMENTS)
        } else {
            None
        };

        Ok(CreditLine {
            item_id: checked.item.item_id.clone(),
            cfop: checked.cfop,
            kind,
            base: base.effective(),
            pis,
            cofins,
            total: pis.add(&cofins)?,
            installments,
            legal_basis,
        })
    }
}

/// Collect every structural problem, or return the parsed items.
fn check_document(
    document: &FiscalDocumentData,
) -> Result<(OperationType, CurrencyCode, Vec<CheckedItem<'_>>), TaxError> {
    let mut errors = Vec::new();

    if document.document_id.trim().is_empty() {
        errors.push(FieldError::new("document_id", "is required"));
    }
    if document.operation_type.is_none() {
        errors.push(FieldError::new("operation_type", "is required"));
    }
    if document.items.is_empty() {
        errors.push(FieldError::new("items", "at least one item is required"));
    }

    let currency = document
        .items
        .first()
        .map_or(CurrencyCode::BRL, |i| i.value.currency());
    let mut checked = Vec::with_capacity(document.items.len());

    for (idx, item) in document.items.iter().enumerate() {
        let field = |name: &str| format!("items[{idx}].{name}");
        let before = errors.len();

        if item.item_id.trim().is_empty() {
            errors.push(FieldError::new(field("item_id"), "is required"));
        }

        let cfop = match item.cfop.as_deref() {
            None => {
                errors.push(FieldError::new(field("cfop"), "is required"));
                None
            }
            Some(code) => match Cfop::parse(code) {
                Ok(cfop) => Some(cfop),
                Err(e) => {
                    errors.push(FieldError::new(field("cfop"), e.to_string()));
                    None
                }
            },
        };
        if let (Some(cfop), Some(op)) = (cfop, document.operation_type) {
            let (expected, label) = match op {
                OperationType::Entry => (Direction::Entry, "entry"),
                OperationType::Exit => (Direction::Exit, "exit"),
            };
            if cfop.direction() != expected {
                errors.push(FieldError::new(
                    field("cfop"),
                    format!("CFOP {cfop} is not valid on an {label} document"),
                ));
            }
        }

        let ncm = match item.ncm.as_deref() {
            None => {
                errors.push(FieldError::new(field("ncm"), "is required"));
                None
            }
            Some(code) => match Ncm::parse(code) {
                Ok(ncm) => Some(ncm),
                Err(e) => {
                    errors.push(FieldError::new(field("ncm"), e.to_string()));
                    None
                }
            },
        };

        if item.value.currency() != currency {
            errors.push(FieldError::new(
                field("value"),
                format!(
                    "currency {} differs from document currency {currency}",
                    item.value.currency()
                ),
            ));
        }
        if item.value.is_negative() {
            errors.push(FieldError::new(field("value"), "must not be negative"));
        }

        let icms = item
            .icms_amount
            .unwrap_or_else(|| Money::zero(item.value.currency()));
        if icms.currency() != item.value.currency() {
            errors.push(FieldError::new(
                field("icms_amount"),
                "currency differs from item value",
            ));
        } else if icms.is_negative() {
            errors.push(FieldError::new(field("icms_amount"), "must not be negative"));
        } else if icms.amount() > item.value.amount() {
            errors.push(FieldError::new(
                field("icms_amount"),
                format!("{icms} exceeds item value {}", item.value),
            ));
        }

        if errors.len() == before {
            if let (Some(cfop), Some(ncm)) = (cfop, ncm) {
                checked.push(CheckedItem {
                    item,
                    cfop,
                    ncm,
                    credit_base: item.value.subtract(&icms)?,
                });
            }
        }
    }

    match document.operation_type {
        Some(op) if errors.is_empty() => Ok((op, currency, checked)),
        _ => Err(structural_from(&errors)),
    }
}

//! Credit aggregate for one fiscal document.
//!
//! Every read re-reconciles the stored components, so a result that was
//! deserialized or held across an await point is never trusted blindly.

use serde::{Deserialize, Serialize};

use super::rules::CreditKind;
use crate::core::{Cfop, CurrencyCode, Money, TaxError};

/// Credit earned by one document item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLine {
    pub item_id: String,
    pub cfop: Cfop,
    pub kind: CreditKind,
    /// Item value minus ICMS.
    pub base: Money,
    pub pis: Money,
    pub cofins: Money,
    /// `pis + cofins`.
    pub total: Money,
    /// Number of monthly installments when the credit is spread; the
    /// amounts above are one installment.
    pub installments: Option<u32>,
    pub legal_basis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IneligibleItem {
    pub item_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCreditResult {
    document_id: String,
    organization_id: String,
    currency: CurrencyCode,
    lines: Vec<CreditLine>,
    ineligible: Vec<IneligibleItem>,
    total_pis: Money,
    total_cofins: Money,
    total_credit: Money,
}

impl TaxCreditResult {
    pub(crate) fn new(
        document_id: String,
        organization_id: String,
        currency: CurrencyCode,
        lines: Vec<CreditLine>,
        ineligible: Vec<IneligibleItem>,
    ) -> Result<Self, TaxError> {
        let total_pis = Money::sum(currency, lines.iter().map(|l| &l.pis))?;
        let total_cofins = Money::sum(currency, lines.iter().map(|l| &l.cofins))?;
        let total_credit = total_pis.add(&total_cofins)?;
        let result = Self {
            document_id,
            organization_id,
            currency,
            lines,
            ineligible,
            total_pis,
            total_cofins,
            total_credit,
        };
        result.validate()?;
        Ok(result)
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn lines(&self) -> &[CreditLine] {
        &self.lines
    }

    pub fn ineligible_items(&self) -> &[IneligibleItem] {
        &self.ineligible
    }

    /// Whether any credit was earned; fails if the aggregate does not
    /// reconcile.
    pub fn has_credit(&self) -> Result<bool, TaxError> {
        self.validate()?;
        Ok(self.total_credit.is_positive())
    }

    /// Total PIS + COFINS credit; fails if the aggregate does not reconcile.
    pub fn get_total_credit(&self) -> Result<Money, TaxError> {
        self.validate()?;
        Ok(self.total_credit)
    }

    /// Check currencies, signs, line totals and aggregate totals.
    pub fn validate(&self) -> Result<(), TaxError> {
        let reconcile = |what: &str, stored: &Money, computed: &Money| {
            if stored != computed {
                Err(TaxError::Inconsistent(format!(
                    "{what} is {stored} but components sum to {computed}"
                )))
            } else {
                Ok(())
            }
        };
        // Components that cannot even be summed do not reconcile either.
        let computed = |r: Result<Money, TaxError>| {
            r.map_err(|e| TaxError::Inconsistent(format!("components do not add up: {e}")))
        };
        let currency = |m: &Money| -> Result<(), TaxError> {
            if m.currency() != self.currency {
                return Err(TaxError::Inconsistent(format!(
                    "amount {m} is not in document currency {}",
                    self.currency
                )));
            }
            if m.is_negative() {
                return Err(TaxError::Inconsistent(format!("negative amount {m}")));
            }
            Ok(())
        };

        for line in &self.lines {
            for m in [&line.base, &line.pis, &line.cofins, &line.total] {
                currency(m)?;
            }
            reconcile(
                &format!("credit of item {}", line.item_id),
                &line.total,
                &computed(line.pis.add(&line.cofins))?,
            )?;
        }
        for m in [&self.total_pis, &self.total_cofins, &self.total_credit] {
            currency(m)?;
        }
        reconcile(
            "total PIS",
            &self.total_pis,
            &computed(Money::sum(self.currency, self.lines.iter().map(|l| &l.pis)))?,
        )?;
        reconcile(
            "total COFINS",
            &self.total_cofins,
            &computed(Money::sum(self.currency, self.lines.iter().map(|l| &l.cofins)))?,
        )?;
        reconcile(
            "total credit",
            &self.total_credit,
            &computed(self.total_pis.add(&self.total_cofins))?,
        )
    }
}

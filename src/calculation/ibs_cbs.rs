//! IBS/CBS tax group for one item (grupo IBSCBS of the NF-e layout).
//!
//! Optional sub-groups are plain structs with required fields, so a
//! sub-group is either fully present or absent. Deserializing a partial
//! sub-group fails.

use serde::{Deserialize, Serialize};

use crate::core::{Aliquota, Money, TaxAmount, TaxError};

/// Deferral (diferimento) of part of the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deferral {
    pub percent: Aliquota,
    pub ibs_uf: Money,
    pub ibs_mun: Money,
    pub cbs: Money,
}

/// Refund of previously paid tax (devolução de tributos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub ibs_uf: Money,
    pub ibs_mun: Money,
    pub cbs: Money,
}

/// Rate reduction (redução de alíquota) and the resulting effective rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateReduction {
    pub reduction: Aliquota,
    pub effective_ibs_uf: Aliquota,
    pub effective_ibs_mun: Aliquota,
    pub effective_cbs: Aliquota,
}

/// Presumed credit (crédito presumido) granted on the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresumedCredit {
    /// Presumed-credit classification code (cCredPres), two digits.
    pub code: String,
    pub percent: Aliquota,
    pub ibs: Money,
    pub cbs: Money,
}

/// Purchasing government entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernmentEntity {
    Union,
    State,
    Municipality,
}

/// Government-purchase rate reduction (compra governamental).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernmentPurchase {
    pub entity: GovernmentEntity,
    pub reduction: Aliquota,
}

/// New-regime breakdown for one item or document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbsCbsGroup {
    /// Situação tributária, three digits.
    pub cst: String,
    /// cClassTrib, six digits, prefixed by the CST.
    pub classificacao: String,
    pub base_value: Money,
    pub ibs_uf: TaxAmount,
    pub ibs_mun: TaxAmount,
    pub cbs: TaxAmount,
    pub deferral: Option<Deferral>,
    pub refund: Option<Refund>,
    pub rate_reduction: Option<RateReduction>,
    pub presumed_credit: Option<PresumedCredit>,
    pub government_purchase: Option<GovernmentPurchase>,
}

impl IbsCbsGroup {
    /// Sum of the three taxes, before deferral.
    pub fn total(&self) -> Result<Money, TaxError> {
        self.ibs_uf
            .value()
            .add(&self.ibs_mun.value())?
            .add(&self.cbs.value())
    }

    /// Tax due now: the total minus any deferred amounts.
    pub fn total_due(&self) -> Result<Money, TaxError> {
        let total = self.total()?;
        match &self.deferral {
            Some(d) => total.subtract(&d.ibs_uf)?.subtract(&d.ibs_mun)?.subtract(&d.cbs),
            None => Ok(total),
        }
    }

    /// Re-check codes, currencies and sub-group bounds.
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.cst.len() != 3 || !is_digits(&self.cst) {
            return Err(TaxError::Validation(format!(
                "CST '{}' must have exactly 3 digits",
                self.cst
            )));
        }
        if self.classificacao.len() != 6 || !is_digits(&self.classificacao) {
            return Err(TaxError::Validation(format!(
                "classification code '{}' must have exactly 6 digits",
                self.classificacao
            )));
        }
        if !self.classificacao.starts_with(&self.cst) {
            return Err(TaxError::Validation(format!(
                "classification code '{}' does not belong to CST {}",
                self.classificacao, self.cst
            )));
        }

        let base = &self.base_value;
        for tax in [&self.ibs_uf, &self.ibs_mun, &self.cbs] {
            base.ensure_same_currency(&tax.value())?;
        }

        if let Some(d) = &self.deferral {
            for (deferred, tax, name) in [
                (&d.ibs_uf, &self.ibs_uf, "ibs_uf"),
                (&d.ibs_mun, &self.ibs_mun, "ibs_mun"),
                (&d.cbs, &self.cbs, "cbs"),
            ] {
                base.ensure_same_currency(deferred)?;
                if deferred.is_negative() || deferred.amount() > tax.value().amount() {
                    return Err(TaxError::Validation(format!(
                        "deferred {name} {deferred} must lie between zero and the tax {}",
                        tax.value()
                    )));
                }
            }
        }
        if let Some(r) = &self.refund {
            for m in [&r.ibs_uf, &r.ibs_mun, &r.cbs] {
                base.ensure_same_currency(m)?;
            }
        }
        if let Some(p) = &self.presumed_credit {
            if p.code.len() != 2 || !is_digits(&p.code) {
                return Err(TaxError::Validation(format!(
                    "presumed credit code '{}' must have exactly 2 digits",
                    p.code
                )));
            }
            base.ensure_same_currency(&p.ibs)?;
            base.ensure_same_currency(&p.cbs)?;
        }
        Ok(())
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Builder for [`IbsCbsGroup`].
///
/// ```
/// use tributo::calculation::IbsCbsGroupBuilder;
/// use tributo::core::*;
/// use rust_decimal_macros::dec;
///
/// let base = BaseCalculo::create(Money::brl(dec!(1000))).unwrap();
/// let rate = |p| Aliquota::from_percentage(p).unwrap();
/// let group = IbsCbsGroupBuilder::new("000", "000001", base.original())
///     .taxes(
///         TaxAmount::calculate(base, rate(dec!(10.62))),
///         TaxAmount::calculate(base, rate(dec!(7.08))),
///         TaxAmount::calculate(base, rate(dec!(8.8))),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(group.total().unwrap().amount(), dec!(265.00));
/// ```
pub struct IbsCbsGroupBuilder {
    cst: String,
    classificacao: String,
    base_value: Money,
    taxes: Option<(TaxAmount, TaxAmount, TaxAmount)>,
    deferral: Option<Deferral>,
    refund: Option<Refund>,
    rate_reduction: Option<RateReduction>,
    presumed_credit: Option<PresumedCredit>,
    government_purchase: Option<GovernmentPurchase>,
}

impl IbsCbsGroupBuilder {
    pub fn new(
        cst: impl Into<String>,
        classificacao: impl Into<String>,
        base_value: Money,
    ) -> Self {
        Self {
            cst: cst.into(),
            classificacao: classificacao.into(),
            base_value,
            taxes: None,
            deferral: None,
            refund: None,
            rate_reduction: None,
            presumed_credit: None,
            government_purchase: None,
        }
    }

    pub fn taxes(mut self, ibs_uf: TaxAmount, ibs_mun: TaxAmount, cbs: TaxAmount) -> Self {
        self.taxes = Some((ibs_uf, ibs_mun, cbs));
        self
    }

    pub fn deferral(mut self, deferral: Deferral) -> Self {
        self.deferral = Some(deferral);
        self
    }

    pub fn refund(mut self, refund: Refund) -> Self {
        self.refund = Some(refund);
        self
    }

    pub fn rate_reduction(mut self, reduction: RateReduction) -> Self {
        self.rate_reduction = Some(reduction);
        self
    }

    pub fn presumed_credit(mut self, credit: PresumedCredit) -> Self {
        self.presumed_credit = Some(credit);
        self
    }

    pub fn government_purchase(mut self, purchase: GovernmentPurchase) -> Self {
        self.government_purchase = Some(purchase);
        self
    }

    pub fn build(self) -> Result<IbsCbsGroup, TaxError> {
        let (ibs_uf, ibs_mun, cbs) = self.taxes.ok_or_else(|| {
            TaxError::Validation("IBS/CBS group requires ibs_uf, ibs_mun and cbs amounts".into())
        })?;
        let group = IbsCbsGroup {
            cst: self.cst,
            classificacao: self.classificacao,
            base_value: self.base_value,
            ibs_uf,
            ibs_mun,
            cbs,
            deferral: self.deferral,
            refund: self.refund,
            rate_reduction: self.rate_reduction,
            presumed_credit: self.presumed_credit,
            government_purchase: self.government_purchase,
        };
        group.validate()?;
        Ok(group)
    }
}

//! PIS/COFINS non-cumulative credit rules (Lei 10.637/2002 and
//! Lei 10.833/2003, art. 3).

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{Aliquota, Cfop, Ncm};

/// Monthly installments for fixed-asset credits (Lei 10.833/2003, art. 3, §1, III).
pub const FIXED_ASSET_INSTALLMENTS: u32 = 48;

/// Standard non-cumulative credit rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRates {
    pub pis: Aliquota,
    pub cofins: Aliquota,
}

impl CreditRates {
    /// PIS 1.65 %, COFINS 7.6 %.
    pub const STANDARD: Self = Self {
        pis: Aliquota::from_table(dec!(1.65)),
        cofins: Aliquota::from_table(dec!(7.6)),
    };
}

impl Default for CreditRates {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// How an eligible item earns its credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditKind {
    /// Goods for resale or production inputs (x101, x102).
    Inputs,
    /// Electric energy consumed (x252).
    Energy,
    /// Freight on purchases (x352).
    Freight,
    /// Returned sales (x201, x202).
    SalesReturn,
    /// Fixed asset, credited over [`FIXED_ASSET_INSTALLMENTS`] months (x551).
    FixedAsset,
    /// Presumed credit on agro inputs, at a fraction of the standard rates.
    Presumed,
}

/// Eligibility of an entry CFOP; `Err` carries the ineligibility reason.
pub fn classify_entry(cfop: Cfop) -> Result<CreditKind, String> {
    match cfop.operation() {
        101 | 102 => Ok(CreditKind::Inputs),
        252 => Ok(CreditKind::Energy),
        352 => Ok(CreditKind::Freight),
        201 | 202 => Ok(CreditKind::SalesReturn),
        551 => Ok(CreditKind::FixedAsset),
        556 => Err(format!("CFOP {cfop}: use and consumption material does not earn credit")),
        _ => Err(format!("CFOP {cfop}: operation does not earn credit")),
    }
}

/// Presumed-credit rule matched by NCM position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresumedCreditRule {
    /// Share of the standard rates granted.
    pub share: Aliquota,
    pub legal_basis: &'static str,
}

/// Presumed credit for the agro positions that carry one.
pub fn presumed_credit_rule(ncm: &Ncm) -> Option<PresumedCreditRule> {
    let (share, legal_basis) = match ncm.position() {
        "0102" | "0104" => (
            dec!(50),
            "Lei 12.058/2009, art. 33 (bovinos, ovinos e caprinos vivos)",
        ),
        "0103" | "0105" => (dec!(12), "Lei 12.350/2010, art. 55 (suínos e aves vivos)"),
        "0401" => (
            dec!(50),
            "Decreto 8.533/2015, art. 4, I (leite in natura utilizado como insumo)",
        ),
        _ => return None,
    };
    Some(PresumedCreditRule {
        share: Aliquota::from_percentage(share).ok()?,
        legal_basis,
    })
}

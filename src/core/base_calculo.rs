use serde::{Deserialize, Serialize};

use super::aliquota::Aliquota;
use super::error::TaxError;
use super::money::Money;

/// Taxable base (base de cálculo), optionally reduced by a percentage.
///
/// Invariant: `0 <= effective <= original`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BaseRepr", into = "BaseRepr")]
pub struct BaseCalculo {
    original: Money,
    reduction: Option<Aliquota>,
    effective: Money,
}

#[derive(Serialize, Deserialize)]
struct BaseRepr {
    original: Money,
    reduction: Option<Aliquota>,
}

impl TryFrom<BaseRepr> for BaseCalculo {
    type Error = TaxError;

    fn try_from(repr: BaseRepr) -> Result<Self, Self::Error> {
        match repr.reduction {
            Some(r) => BaseCalculo::create_with_reduction(repr.original, r),
            None => BaseCalculo::create(repr.original),
        }
    }
}

impl From<BaseCalculo> for BaseRepr {
    fn from(base: BaseCalculo) -> Self {
        BaseRepr {
            original: base.original,
            reduction: base.reduction,
        }
    }
}

impl BaseCalculo {
    /// Base with no reduction: `effective == original`.
    pub fn create(value: Money) -> Result<Self, TaxError> {
        ensure_non_negative(&value)?;
        Ok(Self {
            original: value,
            reduction: None,
            effective: value,
        })
    }

    /// Base reduced by `reduction`: `effective = value * (1 - reduction/100)`.
    pub fn create_with_reduction(value: Money, reduction: Aliquota) -> Result<Self, TaxError> {
        ensure_non_negative(&value)?;
        let effective = value.multiply(reduction.complement_fraction())?;
        Ok(Self {
            original: value,
            reduction: Some(reduction),
            effective,
        })
    }

    pub fn original(&self) -> Money {
        self.original
    }

    pub fn reduction(&self) -> Option<Aliquota> {
        self.reduction
    }

    pub fn effective(&self) -> Money {
        self.effective
    }
}

fn ensure_non_negative(value: &Money) -> Result<(), TaxError> {
    if value.is_negative() {
        return Err(TaxError::Validation(format!(
            "taxable base {value} must not be negative"
        )));
    }
    Ok(())
}

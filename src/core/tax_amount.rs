use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::aliquota::{Aliquota, RATE_SCALE};
use super::base_calculo::BaseCalculo;
use super::error::TaxError;
use super::money::Money;
use super::tolerance::{TAX_VALUE_TOLERANCE, round_half_up, within_tolerance};

/// A tax value tied to the rate and base that produced it.
///
/// Either computed with [`TaxAmount::calculate`] or asserted with
/// [`TaxAmount::create_with_value`], which only accepts declared values
/// within [`TAX_VALUE_TOLERANCE`] of the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxAmountRepr", into = "TaxAmountRepr")]
pub struct TaxAmount {
    value: Money,
    rate: Aliquota,
    base: BaseCalculo,
}

#[derive(Serialize, Deserialize)]
struct TaxAmountRepr {
    value: Money,
    rate: Aliquota,
    base: BaseCalculo,
}

impl TryFrom<TaxAmountRepr> for TaxAmount {
    type Error = TaxError;

    fn try_from(repr: TaxAmountRepr) -> Result<Self, Self::Error> {
        TaxAmount::create_with_value(repr.value, repr.rate, repr.base)
    }
}

impl From<TaxAmount> for TaxAmountRepr {
    fn from(t: TaxAmount) -> Self {
        TaxAmountRepr {
            value: t.value,
            rate: t.rate,
            base: t.base,
        }
    }
}

impl TaxAmount {
    /// `value = round(base.effective * rate / 100, 2)`.
    pub fn calculate(base: BaseCalculo, rate: Aliquota) -> Self {
        Self {
            value: expected_value(&base, &rate),
            rate,
            base,
        }
    }

    /// Accept an externally declared value if it is within tolerance of
    /// the recomputed one.
    pub fn create_with_value(
        declared: Money,
        rate: Aliquota,
        base: BaseCalculo,
    ) -> Result<Self, TaxError> {
        let expected = expected_value(&base, &rate);
        if !declared.approx_eq(&expected, TAX_VALUE_TOLERANCE)? {
            return Err(TaxError::ValueMismatch {
                declared: declared.amount(),
                expected: expected.amount(),
            });
        }
        Ok(Self {
            value: declared,
            rate,
            base,
        })
    }

    /// Zero tax over `base` at a zero rate.
    pub fn zero(base: BaseCalculo) -> Self {
        Self::calculate(base, Aliquota::zero())
    }

    pub fn value(&self) -> Money {
        self.value
    }

    pub fn rate(&self) -> Aliquota {
        self.rate
    }

    pub fn base(&self) -> BaseCalculo {
        self.base
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Whether the stored value still agrees with a recomputation.
    pub fn is_valid(&self) -> bool {
        let expected = expected_value(&self.base, &self.rate);
        within_tolerance(self.value.amount(), expected.amount(), TAX_VALUE_TOLERANCE)
    }

    /// `value / base.original * 100`; differs from `rate` when the base
    /// was reduced. Zero when the original base is zero.
    pub fn effective_rate(&self) -> Decimal {
        let original = self.base.original().amount();
        if original.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(self.value.amount() / original * dec!(100), RATE_SCALE).normalize()
    }
}

fn expected_value(base: &BaseCalculo, rate: &Aliquota) -> Money {
    base.effective().multiply_by_rate(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(amount: Decimal) -> BaseCalculo {
        BaseCalculo::create(Money::brl(amount)).unwrap()
    }

    fn rate(p: Decimal) -> Aliquota {
        Aliquota::from_percentage(p).unwrap()
    }

    #[test]
    fn calculate_rounds_to_cents() {
        let t = TaxAmount::calculate(base(dec!(9649.90)), rate(dec!(19)));
        // 9649.90 * 0.19 = 1833.481
        assert_eq!(t.value().amount(), dec!(1833.48));
        assert!(t.is_valid());
    }

    #[test]
    fn zero_base_is_zero_tax() {
        let t = TaxAmount::calculate(base(dec!(0)), rate(dec!(18)));
        assert!(t.is_zero());
        assert_eq!(t.effective_rate(), Decimal::ZERO);
    }

    #[test]
    fn zero_rate_is_zero_tax() {
        let t = TaxAmount::calculate(base(dec!(500)), Aliquota::zero());
        assert!(t.is_zero());
    }

    #[test]
    fn declared_within_tolerance() {
        let b = base(dec!(1000));
        let r = rate(dec!(18));
        let t = TaxAmount::create_with_value(Money::brl(dec!(180.01)), r, b).unwrap();
        assert_eq!(t.value().amount(), dec!(180.01));
        assert!(TaxAmount::create_with_value(Money::brl(dec!(179.99)), r, b).is_ok());
    }

    #[test]
    fn declared_outside_tolerance() {
        let err = TaxAmount::create_with_value(
            Money::brl(dec!(200.00)),
            rate(dec!(18)),
            base(dec!(1000)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TaxError::ValueMismatch {
                declared: dec!(200.00),
                expected: dec!(180.00)
            }
        );
    }

    #[test]
    fn declared_in_other_currency() {
        let usd = Money::create(dec!(180), "USD").unwrap();
        let err = TaxAmount::create_with_value(usd, rate(dec!(18)), base(dec!(1000))).unwrap_err();
        assert!(matches!(err, TaxError::CurrencyMismatch { .. }));
    }

    #[test]
    fn effective_rate_reflects_reduction() {
        let reduced =
            BaseCalculo::create_with_reduction(Money::brl(dec!(1000)), rate(dec!(20))).unwrap();
        let t = TaxAmount::calculate(reduced, rate(dec!(18)));
        assert_eq!(t.value().amount(), dec!(144.00));
        assert_eq!(t.rate().percentual(), dec!(18));
        assert_eq!(t.effective_rate(), dec!(14.4));
    }

    #[test]
    fn tampered_json_rejected() {
        let t = TaxAmount::calculate(base(dec!(1000)), rate(dec!(18)));
        let json = serde_json::to_string(&t).unwrap();
        let tampered = json.replace("\"180.00\"", "\"250.00\"");
        assert_ne!(json, tampered);
        assert!(serde_json::from_str::<TaxAmount>(&tampered).is_err());
        let back: TaxAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}

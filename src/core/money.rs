use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aliquota::Aliquota;
use super::error::TaxError;
use super::tolerance::{round_half_up, within_tolerance};

/// Decimal places carried by a money value.
pub const MONEY_SCALE: u32 = 2;

/// ISO 4217-shaped currency code: exactly three ASCII letters, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Brazilian real.
    pub const BRL: Self = Self(*b"BRL");

    /// Parse a three-letter code, case-insensitively.
    pub fn parse(code: &str) -> Result<Self, TaxError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(TaxError::Validation(format!(
                "currency code '{code}' must be exactly 3 letters"
            )));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// An immutable amount of money in a single currency.
///
/// Amounts are rounded half-up to two decimal places on construction,
/// so `Money::create(m.amount(), m.currency())` always reproduces `m`.
/// Negative amounts are allowed here (adjustments); callers that need
/// non-negative values check for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

#[derive(Serialize, Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: String,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = TaxError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::create(repr.amount, &repr.currency)
    }
}

impl From<Money> for MoneyRepr {
    fn from(money: Money) -> Self {
        MoneyRepr {
            amount: money.amount,
            currency: money.currency.into(),
        }
    }
}

impl Money {
    /// Create a money value, validating the currency code.
    pub fn create(amount: Decimal, currency: &str) -> Result<Self, TaxError> {
        let currency = CurrencyCode::parse(currency)?;
        Ok(Self::of(amount, currency))
    }

    /// Create a money value in Brazilian reais.
    pub fn brl(amount: Decimal) -> Self {
        Self::of(amount, CurrencyCode::BRL)
    }

    /// Create a money value in an already-validated currency.
    pub fn of(amount: Decimal, currency: CurrencyCode) -> Self {
        let mut amount = round_half_up(amount, MONEY_SCALE);
        amount.rescale(MONEY_SCALE);
        Self { amount, currency }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::of(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Fail with `CurrencyMismatch` unless both values share a currency.
    pub fn ensure_same_currency(&self, other: &Money) -> Result<(), TaxError> {
        if self.currency != other.currency {
            return Err(TaxError::currency_mismatch(self.currency, other.currency));
        }
        Ok(())
    }

    /// Fails on mixed currencies or when the sum leaves the `Decimal` range.
    pub fn add(&self, other: &Money) -> Result<Money, TaxError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| overflow(self, "+", other))?;
        Ok(Self::of(amount, self.currency))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, TaxError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| overflow(self, "-", other))?;
        Ok(Self::of(amount, self.currency))
    }

    /// `amount * rate / 100`, rounded to money precision.
    pub fn multiply_by_rate(&self, rate: &Aliquota) -> Money {
        Self::of(self.amount * rate.as_fraction(), self.currency)
    }

    /// `amount * factor`, rounded to money precision.
    pub fn multiply(&self, factor: Decimal) -> Result<Money, TaxError> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| overflow(self, "*", factor))?;
        Ok(Self::of(amount, self.currency))
    }

    /// Compare against another amount with an absolute tolerance.
    pub fn approx_eq(&self, other: &Money, epsilon: Decimal) -> Result<bool, TaxError> {
        self.ensure_same_currency(other)?;
        Ok(within_tolerance(self.amount, other.amount, epsilon))
    }

    /// Sum amounts that must all be in `currency`.
    pub fn sum<'a>(
        currency: CurrencyCode,
        values: impl IntoIterator<Item = &'a Money>,
    ) -> Result<Money, TaxError> {
        values
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.add(m))
    }
}

fn overflow(left: &Money, op: &str, right: impl fmt::Display) -> TaxError {
    TaxError::Validation(format!("amount overflow: {left} {op} {right}"))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_rejects_bad_currency() {
        assert!(Money::create(dec!(1), "BR").is_err());
        assert!(Money::create(dec!(1), "BRLL").is_err());
        assert!(Money::create(dec!(1), "B1L").is_err());
        assert!(Money::create(dec!(1), "").is_err());
    }

    #[test]
    fn create_normalizes_currency_case() {
        let m = Money::create(dec!(10), "brl").unwrap();
        assert_eq!(m.currency(), CurrencyCode::BRL);
    }

    #[test]
    fn create_rounds_to_cents() {
        let m = Money::brl(dec!(10.005));
        assert_eq!(m.amount(), dec!(10.01));
        assert_eq!(m.amount().to_string(), "10.01");
        assert_eq!(Money::brl(dec!(7)).amount().to_string(), "7.00");
    }

    #[test]
    fn negative_amounts_allowed() {
        let m = Money::brl(dec!(-5));
        assert!(m.is_negative());
    }

    #[test]
    fn add_and_subtract() {
        let a = Money::brl(dec!(100.10));
        let b = Money::brl(dec!(0.90));
        assert_eq!(a.add(&b).unwrap().amount(), dec!(101.00));
        assert_eq!(a.subtract(&b).unwrap().amount(), dec!(99.20));
    }

    #[test]
    fn mismatched_currency_fails() {
        let a = Money::brl(dec!(1));
        let b = Money::create(dec!(1), "USD").unwrap();
        assert!(matches!(
            a.add(&b),
            Err(TaxError::CurrencyMismatch { .. })
        ));
        assert!(a.subtract(&b).is_err());
        assert!(a.approx_eq(&b, dec!(0.01)).is_err());
    }

    #[test]
    fn multiply_by_rate_preserves_currency() {
        let usd = Money::create(dec!(1000), "USD").unwrap();
        let rate = Aliquota::from_percentage(dec!(18)).unwrap();
        let taxed = usd.multiply_by_rate(&rate);
        assert_eq!(taxed.amount(), dec!(180.00));
        assert_eq!(taxed.currency().as_str(), "USD");
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let total = Money::sum(CurrencyCode::BRL, []).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn overflow_is_an_error() {
        let max = Money::brl(Decimal::MAX);
        let err = max.add(&Money::brl(dec!(1))).unwrap_err();
        assert!(matches!(err, TaxError::Validation(ref m) if m.starts_with("amount overflow")));
        assert!(Money::brl(Decimal::MIN).subtract(&Money::brl(dec!(1))).is_err());
        assert!(max.multiply(dec!(2)).is_err());
        assert!(Money::sum(CurrencyCode::BRL, [&max, &max]).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Money::brl(dec!(1.5)).to_string(), "BRL 1.50");
    }

    #[test]
    fn serde_roundtrip_validates() {
        let m = Money::brl(dec!(12.34));
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"amount":"12.34","currency":"BRL"}"#);
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        let bad = r#"{"amount":"1.00","currency":"REAL"}"#;
        assert!(serde_json::from_str::<Money>(bad).is_err());
    }
}

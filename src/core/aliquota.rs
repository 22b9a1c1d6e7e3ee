use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::TaxError;
use super::tolerance::round_half_up;

/// Maximum decimal places of a rate (e.g. 10.6200 %).
pub const RATE_SCALE: u32 = 4;

/// A tax rate (alíquota) expressed as a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Aliquota(Decimal);

impl Aliquota {
    const ZERO: Self = Self(Decimal::ZERO);
    const HUNDRED: Self = Self(dec!(100));

    /// Build a rate from a percentage. Fails outside `[0, 100]` or with
    /// more than four decimal places.
    pub fn from_percentage(percentual: Decimal) -> Result<Self, TaxError> {
        if percentual < Decimal::ZERO || percentual > dec!(100) {
            return Err(TaxError::Validation(format!(
                "rate {percentual}% must be between 0 and 100"
            )));
        }
        let normalized = percentual.normalize();
        if normalized.scale() > RATE_SCALE {
            return Err(TaxError::Validation(format!(
                "rate {percentual}% has more than {RATE_SCALE} decimal places"
            )));
        }
        Ok(Self(normalized))
    }

    /// Rate from a table literal already in `[0, 100]` with at most four
    /// decimal places. Tables built with it are checked in their tests.
    pub(crate) const fn from_table(percentual: Decimal) -> Self {
        Self(percentual)
    }

    pub const fn zero() -> Self {
        Self::ZERO
    }

    pub const fn full() -> Self {
        Self::HUNDRED
    }

    pub fn percentual(&self) -> Decimal {
        self.0
    }

    /// The rate as a multiplier (`18 %` → `0.18`).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// The remaining share after applying this rate as a reduction
    /// (`20 %` → `0.80`).
    pub fn complement_fraction(&self) -> Decimal {
        Decimal::ONE - self.as_fraction()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// This rate scaled by `share` percent, rounded to rate precision.
    /// The result always stays within `[0, 100]`.
    pub fn scaled_by(&self, share: &Aliquota) -> Aliquota {
        Self(round_half_up(self.0 * share.as_fraction(), RATE_SCALE).normalize())
    }

    /// This rate after a percentage reduction (`18 %` reduced by `60 %` → `7.2 %`).
    pub fn reduced_by(&self, reduction: &Aliquota) -> Aliquota {
        Self(round_half_up(self.0 * reduction.complement_fraction(), RATE_SCALE).normalize())
    }
}

impl Default for Aliquota {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Aliquota {
    type Error = TaxError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_percentage(value)
    }
}

impl From<Aliquota> for Decimal {
    fn from(rate: Aliquota) -> Self {
        rate.0
    }
}

impl fmt::Display for Aliquota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert!(Aliquota::from_percentage(dec!(0)).is_ok());
        assert!(Aliquota::from_percentage(dec!(100)).is_ok());
        assert!(Aliquota::from_percentage(dec!(10.6200)).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Aliquota::from_percentage(dec!(-0.01)).is_err());
        assert!(Aliquota::from_percentage(dec!(100.0001)).is_err());
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(Aliquota::from_percentage(dec!(10.12345)).is_err());
        // trailing zeros don't count
        assert!(Aliquota::from_percentage(dec!(10.123400)).is_ok());
    }

    #[test]
    fn ordering_and_equality_by_value() {
        let a = Aliquota::from_percentage(dec!(7)).unwrap();
        let b = Aliquota::from_percentage(dec!(7.00)).unwrap();
        let c = Aliquota::from_percentage(dec!(12)).unwrap();
        assert_eq!(a, b);
        assert!(a < c);
        assert!(Aliquota::zero() < a);
    }

    #[test]
    fn scaling_and_reduction() {
        let ibs = Aliquota::from_percentage(dec!(10.62)).unwrap();
        let half = Aliquota::from_percentage(dec!(50)).unwrap();
        assert_eq!(ibs.scaled_by(&half).percentual(), dec!(5.31));
        let sixty = Aliquota::from_percentage(dec!(60)).unwrap();
        let eighteen = Aliquota::from_percentage(dec!(18)).unwrap();
        assert_eq!(eighteen.reduced_by(&sixty).percentual(), dec!(7.2));
        assert_eq!(eighteen.scaled_by(&Aliquota::full()), eighteen);
    }

    #[test]
    fn deserialize_validates_range() {
        assert!(serde_json::from_str::<Aliquota>("\"101\"").is_err());
        let r: Aliquota = serde_json::from_str("\"8.8\"").unwrap();
        assert_eq!(r.percentual(), dec!(8.8));
    }
}

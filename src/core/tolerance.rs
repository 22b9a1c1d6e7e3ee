//! Tolerance-based comparison for declared vs. computed amounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Maximum absolute difference accepted between a declared tax value
/// and the engine's own recomputation, in currency units.
pub const TAX_VALUE_TOLERANCE: Decimal = dec!(0.01);

/// `true` when `|a - b| <= epsilon`.
pub fn within_tolerance(a: Decimal, b: Decimal, epsilon: Decimal) -> bool {
    (a - b).abs() <= epsilon
}

/// Round to `dp` decimal places, half away from zero (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

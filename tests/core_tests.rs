//! Value objects, classification codes and regime resolution.

#![cfg(feature = "core")]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tributo::core::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rate(p: Decimal) -> Aliquota {
    Aliquota::from_percentage(p).unwrap()
}

fn base(amount: Decimal) -> BaseCalculo {
    BaseCalculo::create(Money::brl(amount)).unwrap()
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

#[test]
fn money_defaults_to_two_decimals() {
    let m = Money::create(dec!(10.005), "brl").unwrap();
    assert_eq!(m.amount(), dec!(10.01));
    assert_eq!(m.currency(), CurrencyCode::BRL);
    assert_eq!(m.to_string(), "BRL 10.01");
}

#[test]
fn money_accepts_negative_adjustments() {
    let m = Money::brl(dec!(-3.50));
    assert!(m.is_negative());
    assert_eq!(m.add(&Money::brl(dec!(5))).unwrap().amount(), dec!(1.50));
}

#[test]
fn money_arithmetic_rejects_mixed_currencies() {
    let brl = Money::brl(dec!(1));
    let usd = Money::create(dec!(1), "USD").unwrap();
    insta::assert_snapshot!(brl.add(&usd).unwrap_err(), @"currency mismatch: BRL vs USD");
    assert!(brl.subtract(&usd).is_err());
}

#[test]
fn money_rejects_malformed_currency() {
    insta::assert_snapshot!(
        Money::create(dec!(1), "R$").unwrap_err(),
        @"validation failed: currency code 'R$' must be exactly 3 letters"
    );
    assert!(Money::create(dec!(1), "REAL").is_err());
}

#[test]
fn money_multiply_by_rate_rounds_half_up() {
    let m = Money::brl(dec!(10));
    // 10 * 1.65 % = 0.165
    assert_eq!(m.multiply_by_rate(&rate(dec!(1.65))).amount(), dec!(0.17));
}

#[test]
fn money_serde_roundtrip_is_stable() {
    let m = Money::brl(dec!(1234.5));
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(json, r#"{"amount":"1234.50","currency":"BRL"}"#);
    let back: Money = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m);
    assert_eq!(serde_json::to_string(&back).unwrap(), json);
}

// ---------------------------------------------------------------------------
// Aliquota / BaseCalculo
// ---------------------------------------------------------------------------

#[test]
fn rate_bounds() {
    assert!(Aliquota::from_percentage(dec!(0)).is_ok());
    assert!(Aliquota::from_percentage(dec!(100)).is_ok());
    insta::assert_snapshot!(
        Aliquota::from_percentage(dec!(100.5)).unwrap_err(),
        @"validation failed: rate 100.5% must be between 0 and 100"
    );
    assert!(Aliquota::from_percentage(dec!(-0.01)).is_err());
}

#[test]
fn rate_keeps_four_decimals() {
    assert_eq!(rate(dec!(10.6200)).percentual(), dec!(10.62));
    assert!(Aliquota::from_percentage(dec!(10.62001)).is_err());
}

#[test]
fn rates_order_by_value() {
    assert!(rate(dec!(7)) < rate(dec!(12)));
    assert_eq!(rate(dec!(12.0)), rate(dec!(12)));
    assert!(Aliquota::zero().is_zero());
}

#[test]
fn reduced_base_then_taxed() {
    let b = BaseCalculo::create_with_reduction(Money::brl(dec!(1000)), rate(dec!(20))).unwrap();
    assert_eq!(b.effective().amount(), dec!(800.00));
    assert_eq!(b.original().amount(), dec!(1000.00));
    let tax = TaxAmount::calculate(b, rate(dec!(18)));
    assert_eq!(tax.value().amount(), dec!(144.00));
    assert_eq!(tax.effective_rate(), dec!(14.4));
}

#[test]
fn negative_base_rejected() {
    insta::assert_snapshot!(
        BaseCalculo::create(Money::brl(dec!(-1))).unwrap_err(),
        @"validation failed: taxable base BRL -1.00 must not be negative"
    );
}

// ---------------------------------------------------------------------------
// TaxAmount
// ---------------------------------------------------------------------------

#[test]
fn zero_base_or_rate_is_zero_tax() {
    assert!(TaxAmount::calculate(base(dec!(0)), rate(dec!(18))).is_zero());
    assert!(TaxAmount::calculate(base(dec!(100)), Aliquota::zero()).is_zero());
    assert_eq!(TaxAmount::calculate(base(dec!(0)), rate(dec!(18))).effective_rate(), dec!(0));
}

#[test]
fn declared_value_within_tolerance() {
    let b = base(dec!(1000));
    let r = rate(dec!(18));
    assert!(TaxAmount::create_with_value(Money::brl(dec!(180.01)), r, b).is_ok());
    assert!(TaxAmount::create_with_value(Money::brl(dec!(179.99)), r, b).is_ok());
    assert!(TaxAmount::create_with_value(Money::brl(dec!(180.02)), r, b).is_err());
}

#[test]
fn declared_value_mismatch_names_both() {
    let err = TaxAmount::create_with_value(Money::brl(dec!(200)), rate(dec!(18)), base(dec!(1000)))
        .unwrap_err();
    insta::assert_snapshot!(err, @"declared tax value 200.00 does not match expected 180.00");
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn recomputation_does_not_drift() {
    let b = base(dec!(333.33));
    let r = rate(dec!(17.5));
    let first = TaxAmount::calculate(b, r);
    let json = serde_json::to_string(&first).unwrap();
    let back: TaxAmount = serde_json::from_str(&json).unwrap();
    assert_eq!(back, first);
    assert_eq!(TaxAmount::calculate(back.base(), back.rate()), first);
    assert!(back.is_valid());
}

#[test]
fn tolerance_helper() {
    assert!(within_tolerance(dec!(1.00), dec!(1.01), TAX_VALUE_TOLERANCE));
    assert!(!within_tolerance(dec!(1.00), dec!(1.02), TAX_VALUE_TOLERANCE));
}

// ---------------------------------------------------------------------------
// Classification codes
// ---------------------------------------------------------------------------

#[test]
fn uf_parsing_and_regions() {
    assert_eq!(Uf::parse("sp").unwrap(), Uf::SP);
    assert_eq!(Uf::SP.region(), Region::Sudeste);
    assert_eq!(Uf::AM.region(), Region::Norte);
    assert_eq!(Uf::parse("ex").unwrap(), Uf::EX);
    assert!(Uf::parse("XX").is_err());
    assert_eq!(Uf::ALL.len(), 27);
}

#[test]
fn cfop_scope_and_direction() {
    let c = Cfop::parse("6.102").unwrap();
    assert_eq!(c.code(), 6102);
    assert_eq!(c.direction(), Direction::Exit);
    assert_eq!(c.scope(), OperationScope::Interstate);
    assert_eq!(Cfop::parse("3101").unwrap().scope(), OperationScope::Foreign);
    assert_eq!(Cfop::parse("1102").unwrap().direction(), Direction::Entry);
    assert!(Cfop::parse("4102").is_err());
    assert!(Cfop::parse("510").is_err());
}

#[test]
fn cfop_checks_ufs() {
    let intra = Cfop::parse("5102").unwrap();
    assert!(intra.check_ufs(Uf::SP, Uf::SP).is_ok());
    assert!(intra.check_ufs(Uf::SP, Uf::RJ).is_err());
    let export = Cfop::parse("7101").unwrap();
    assert!(export.check_ufs(Uf::SP, Uf::EX).is_ok());
    assert!(export.check_ufs(Uf::SP, Uf::MG).is_err());
}

#[test]
fn ncm_parsing() {
    let n = Ncm::parse("0102.29.90").unwrap();
    assert_eq!(n.as_str(), "01022990");
    assert_eq!(n.chapter(), "01");
    assert_eq!(n.position(), "0102");
    assert!(Ncm::parse("0102299").is_err());
}

// ---------------------------------------------------------------------------
// Regime
// ---------------------------------------------------------------------------

#[test]
fn regime_step_function() {
    assert_eq!(RegimeResolver::resolve(date(2025, 12, 31)), Regime::Current);
    assert_eq!(RegimeResolver::resolve(date(2026, 1, 1)), Regime::Transition);
    assert_eq!(RegimeResolver::resolve(date(2030, 6, 15)), Regime::Transition);
    assert_eq!(RegimeResolver::resolve(date(2033, 1, 1)), Regime::New);
    for year in 2026..2033 {
        assert_eq!(RegimeResolver::resolve_year(year), Regime::Transition);
    }
}

#[test]
fn regime_flags() {
    assert!(Regime::Current.has_legacy_taxes() && !Regime::Current.has_ibs_cbs());
    assert!(Regime::Transition.has_legacy_taxes() && Regime::Transition.has_ibs_cbs());
    assert!(!Regime::New.has_legacy_taxes() && Regime::New.has_ibs_cbs());
}

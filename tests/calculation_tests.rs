//! Orchestrator, legacy rules, IBS/CBS group and configuration.

#![cfg(feature = "calculation")]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tributo::calculation::*;
use tributo::core::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rate(p: Decimal) -> Aliquota {
    Aliquota::from_percentage(p).unwrap()
}

fn item(
    id: &str,
    amount: Decimal,
    on: NaiveDate,
    cfop: &str,
    from: Uf,
    to: Uf,
) -> TaxCalculationInput {
    TaxCalculationInput::new(
        id,
        Money::brl(amount),
        on,
        Cfop::parse(cfop).unwrap(),
        Ncm::parse("22030000").ok(),
        from,
        to,
    )
}

fn sp_sale(id: &str, amount: Decimal, on: NaiveDate) -> TaxCalculationInput {
    item(id, amount, on, "5102", Uf::SP, Uf::SP)
}

// ---------------------------------------------------------------------------
// Regimes
// ---------------------------------------------------------------------------

#[test]
fn every_transition_year_uses_its_phase_in() {
    let o = TaxCalculationOrchestrator::default();
    let schedule = TransitionSchedule::default();
    for (year, phase) in schedule.iter() {
        let r = o.calculate(&sp_sale("x", dec!(1000), date(year, 6, 1))).unwrap();
        assert_eq!(r.regime, Regime::Transition);
        assert_eq!(r.phase_in, Some(phase));
        assert_eq!(
            r.cbs.rate(),
            NewRegimeRates::default().cbs.scaled_by(&phase.new_regime)
        );
        let legacy = r.legacy.unwrap();
        assert_eq!(
            legacy.pis.rate(),
            LegacyRates::default().pis.scaled_by(&phase.legacy)
        );
    }
}

#[test]
fn transition_2026_is_mostly_legacy() {
    let o = TaxCalculationOrchestrator::default();
    let r = o.calculate(&sp_sale("x", dec!(1000), date(2026, 3, 1))).unwrap();
    // 5 % of 26.5 % = 1.325 %
    assert_eq!(r.ibs_cbs_total().unwrap().amount(), dec!(13.25));
    assert_eq!(r.legacy_total().unwrap().amount(), dec!(272.50));
    assert_eq!(r.total_tax.amount(), dec!(285.75));
}

#[test]
fn new_regime_has_no_legacy_total() {
    let o = TaxCalculationOrchestrator::default();
    let r = o.calculate(&sp_sale("x", dec!(1000), date(2040, 1, 1))).unwrap();
    assert!(r.legacy_total().unwrap().is_zero());
    assert!(r.phase_in.is_none());
}

#[test]
fn zero_base_succeeds_in_every_regime() {
    let o = TaxCalculationOrchestrator::default();
    for year in [2020, 2026, 2032, 2033, 2050] {
        let r = o.calculate(&sp_sale("z", dec!(0), date(year, 1, 1))).unwrap();
        assert!(r.total_tax.is_zero(), "{year}");
    }
}

// ---------------------------------------------------------------------------
// Legacy rules
// ---------------------------------------------------------------------------

#[test]
fn interstate_sale_uses_interstate_rate() {
    let o = TaxCalculationOrchestrator::default();
    let r = o
        .calculate(&item("i", dec!(1000), date(2025, 1, 1), "6102", Uf::PR, Uf::MT))
        .unwrap();
    assert_eq!(r.legacy.unwrap().icms.value().amount(), dec!(70.00));

    let r = o
        .calculate(&item("i", dec!(1000), date(2025, 1, 1), "6102", Uf::MT, Uf::PR))
        .unwrap();
    assert_eq!(r.legacy.unwrap().icms.value().amount(), dec!(120.00));
}

#[test]
fn import_uses_destination_internal_rate() {
    let o = TaxCalculationOrchestrator::default();
    let r = o
        .calculate(&item("imp", dec!(1000), date(2025, 1, 1), "3102", Uf::EX, Uf::RJ))
        .unwrap();
    let legacy = r.legacy.unwrap();
    assert_eq!(legacy.icms.rate().percentual(), dec!(20));
    assert_eq!(legacy.pis.value().amount(), dec!(16.50));
}

#[test]
fn custom_internal_rate() {
    let config = CalculationConfigBuilder::new()
        .icms_internal_rate(Uf::SP, rate(dec!(19)))
        .build()
        .unwrap();
    let o = TaxCalculationOrchestrator::new(config);
    let r = o.calculate(&sp_sale("c", dec!(100), date(2025, 1, 1))).unwrap();
    assert_eq!(r.legacy.unwrap().icms.value().amount(), dec!(19.00));
}

// ---------------------------------------------------------------------------
// Injectable schedule
// ---------------------------------------------------------------------------

#[test]
fn linear_schedule_can_be_injected() {
    let entries = (2026..2033).map(|y| {
        let step = Decimal::from(y - 2025);
        let new_share = step * dec!(12.5);
        (y, PhaseIn::new(new_share, dec!(100) - new_share).unwrap())
    });
    let schedule = TransitionSchedule::from_entries(entries).unwrap();
    let config = CalculationConfigBuilder::new().schedule(schedule).build().unwrap();
    let o = TaxCalculationOrchestrator::new(config);
    let r = o.calculate(&sp_sale("l", dec!(1000), date(2029, 1, 1))).unwrap();
    let phase = r.phase_in.unwrap();
    assert_eq!(phase.new_regime.percentual(), dec!(50));
    assert_eq!(phase.legacy.percentual(), dec!(50));
    assert_eq!(r.cbs.value().amount(), dec!(44.00));
    assert_eq!(r.legacy.unwrap().icms.value().amount(), dec!(90.00));
}

#[test]
fn non_monotonic_schedule_rejected() {
    let err = CalculationConfigBuilder::new()
        .phase_in(2028, PhaseIn::new(dec!(30), dec!(100)).unwrap())
        .build()
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Infrastructure);
    insta::assert_snapshot!(
        err,
        @"configuration error: new-regime share decreases from 30% in 2028 to 25% in 2029"
    );
}

#[cfg(feature = "json")]
#[test]
fn config_from_json() {
    let mut value = serde_json::to_value(CalculationConfig::default()).unwrap();
    value["new_regime"]["cbs"] = serde_json::json!("9.3");
    let config = CalculationConfig::from_json(&value.to_string()).unwrap();
    assert_eq!(config.new_regime.cbs.percentual(), dec!(9.3));

    value["schedule"]["2027"]["legacy"] = serde_json::json!("40");
    assert!(CalculationConfig::from_json(&value.to_string()).is_err());
}

// ---------------------------------------------------------------------------
// IBS/CBS group
// ---------------------------------------------------------------------------

#[test]
fn explicit_classification_codes() {
    let o = TaxCalculationOrchestrator::default();
    let input = sp_sale("g", dec!(1000), date(2033, 5, 1))
        .with_cst("200")
        .with_classificacao("200034")
        .with_rate_reduction(rate(dec!(30)));
    let r = o.calculate(&input).unwrap();
    let group = r.ibs_cbs.unwrap();
    assert_eq!(group.cst, "200");
    assert_eq!(group.classificacao, "200034");
    // 8.8 % reduced by 30 % = 6.16 %
    assert_eq!(group.rate_reduction.unwrap().effective_cbs.percentual(), dec!(6.16));
    assert_eq!(r.cbs.value().amount(), dec!(61.60));
}

#[test]
fn mismatched_classification_rejected() {
    let o = TaxCalculationOrchestrator::default();
    let input = sp_sale("g", dec!(1000), date(2033, 5, 1))
        .with_cst("000")
        .with_classificacao("200034");
    assert!(matches!(o.calculate(&input), Err(TaxError::Validation(_))));
}

#[test]
fn result_serializes_with_optional_groups() {
    let o = TaxCalculationOrchestrator::default();
    let r = o.calculate(&sp_sale("s", dec!(10), date(2025, 1, 1))).unwrap();
    let value = serde_json::to_value(&r).unwrap();
    assert_eq!(value["regime"], "CURRENT");
    assert!(value["ibs_cbs"].is_null());
    let back: ItemTaxResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, r);
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[test]
fn batch_keeps_order_and_ids() {
    let o = TaxCalculationOrchestrator::default();
    let inputs: Vec<_> = (0..20)
        .map(|i| sp_sale(&format!("item-{i}"), Decimal::from(i * 10), date(2024 + i / 2, 1, 1)))
        .collect();
    let results = o.calculate_batch(&inputs).unwrap();
    assert_eq!(results.len(), inputs.len());
    for (input, result) in inputs.iter().zip(&results) {
        assert_eq!(input.item_id, result.item_id);
        assert_eq!(result.regime, RegimeResolver::resolve(input.operation_date));
    }
}

#[test]
fn batch_failure_names_item() {
    let o = TaxCalculationOrchestrator::default();
    let inputs = [
        sp_sale("ok", dec!(10), date(2025, 1, 1)),
        sp_sale("bad", dec!(-5), date(2025, 1, 1)),
    ];
    let err = o.calculate_batch(&inputs).unwrap_err();
    insta::assert_snapshot!(
        err,
        @"item bad: validation failed: taxable base BRL -5.00 must not be negative"
    );
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn empty_batch() {
    let o = TaxCalculationOrchestrator::default();
    let results = o.calculate_batch(&[]).unwrap();
    assert!(results.is_empty());
    assert!(o.total_of(&results).unwrap().is_zero());
}

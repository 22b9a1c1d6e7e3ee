use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tributo::calculation::{TaxCalculationInput, TaxCalculationOrchestrator};
use tributo::core::*;

fn main() {
    let orchestrator = TaxCalculationOrchestrator::default();

    // The same interstate sale, before, during and after the transition
    for year in [2025, 2029, 2033] {
        let input = TaxCalculationInput::new(
            format!("NF-{year}-1"),
            Money::brl(dec!(2500)),
            NaiveDate::from_ymd_opt(year, 3, 15).unwrap(),
            Cfop::parse("6102").unwrap(),
            Ncm::parse("8471.30.12").ok(),
            Uf::SP,
            Uf::PE,
        );

        let result = orchestrator.calculate(&input).unwrap();
        println!("{} ({}):", result.item_id, result.regime);
        if let Some(legacy) = &result.legacy {
            println!("  ICMS:   {} at {}", legacy.icms.value(), legacy.icms.rate());
            println!("  PIS:    {} at {}", legacy.pis.value(), legacy.pis.rate());
            println!("  COFINS: {} at {}", legacy.cofins.value(), legacy.cofins.rate());
        }
        if result.regime.has_ibs_cbs() {
            println!("  IBS UF: {} at {}", result.ibs_uf.value(), result.ibs_uf.rate());
            println!("  IBS Mun: {} at {}", result.ibs_mun.value(), result.ibs_mun.rate());
            println!("  CBS:    {} at {}", result.cbs.value(), result.cbs.rate());
        }
        println!("  Total:  {}", result.total_tax);
    }

    // A declared value is accepted within 0.01 of the recomputation
    let base = BaseCalculo::create(Money::brl(dec!(1000))).unwrap();
    let rate = Aliquota::from_percentage(dec!(18)).unwrap();
    match TaxAmount::create_with_value(Money::brl(dec!(200)), rate, base) {
        Ok(_) => println!("declared value accepted"),
        Err(e) => println!("declared value rejected: {e}"),
    }
}

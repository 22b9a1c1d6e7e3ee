use rust_decimal_macros::dec;
use tributo::core::{Money, Uf};
use tributo::simulation::{SimulationInput, TaxScenarioSimulator};

fn main() {
    let simulator = TaxScenarioSimulator::default();
    let input = SimulationInput::new(
        Money::brl(dec!(10000)),
        Uf::MG,
        Uf::MG,
        (2025..=2033).collect(),
    );

    let result = simulator.simulate(&input).unwrap();
    println!(
        "{:<6} {:<11} {:>14} {:>14} {:>12}",
        "Year", "Regime", "Legacy", "Reform", "Difference"
    );
    for s in &result.scenarios {
        println!(
            "{:<6} {:<11} {:>14} {:>14} {:>12}",
            s.year,
            s.regime.to_string(),
            s.current_system_taxes.total_tax.amount(),
            s.new_system_taxes.total_tax.amount(),
            s.difference.amount(),
        );
    }
    let summary = &result.summary;
    println!();
    println!("Legacy total: {}", summary.current_system_total);
    println!("Reform total: {}", summary.new_system_total);
    println!("Change:       {} ({}%)", summary.difference, summary.percentage_change);
}

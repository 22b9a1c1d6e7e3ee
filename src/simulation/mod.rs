//! Multi-year comparison of the legacy and reformed tax burden.
//!
//! Each requested year is calculated on 1 July of that year twice: once
//! as if the legacy system continued unchanged, once as actually due
//! under the reform schedule.
//!
//! ```
//! use tributo::simulation::{SimulationInput, TaxScenarioSimulator};
//! use tributo::core::{Money, Uf};
//! use rust_decimal_macros::dec;
//!
//! let simulator = TaxScenarioSimulator::default();
//! let input = SimulationInput::new(Money::brl(dec!(1000)), Uf::SP, Uf::SP, vec![2026, 2033]);
//! let result = simulator.simulate(&input).unwrap();
//! assert_eq!(result.scenarios.len(), 2);
//! ```

mod simulator;

pub use simulator::{
    SimulationInput, SimulationResult, SimulationSummary, TaxScenario, TaxScenarioSimulator,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    CalculationConfig, ItemTaxResult, TaxCalculationInput, TaxCalculationOrchestrator,
};
use crate::core::{
    Cfop, Money, Ncm, Regime, RegimeInfo, RegimeResolver, TaxError, Uf, round_half_up,
};

/// A base value projected over several years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub base_value: Money,
    pub uf_origem: Uf,
    pub uf_destino: Uf,
    pub years: Vec<i32>,
    /// Synthesized from the UFs when absent.
    #[serde(default)]
    pub cfop: Option<Cfop>,
    #[serde(default)]
    pub ncm: Option<Ncm>,
}

impl SimulationInput {
    pub fn new(base_value: Money, uf_origem: Uf, uf_destino: Uf, years: Vec<i32>) -> Self {
        Self {
            base_value,
            uf_origem,
            uf_destino,
            years,
            cfop: None,
            ncm: None,
        }
    }

    pub fn with_cfop(mut self, cfop: Cfop) -> Self {
        self.cfop = Some(cfop);
        self
    }

    pub fn with_ncm(mut self, ncm: Ncm) -> Self {
        self.ncm = Some(ncm);
        self
    }

    /// x102 (sale of goods) with the scope implied by the UFs.
    fn cfop(&self) -> Result<Cfop, TaxError> {
        if let Some(cfop) = self.cfop {
            return Ok(cfop);
        }
        let code = if self.uf_destino.is_exterior() {
            "7102"
        } else if self.uf_origem.is_exterior() {
            "3102"
        } else if self.uf_origem == self.uf_destino {
            "5102"
        } else {
            "6102"
        };
        Cfop::parse(code)
    }
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxScenario {
    pub year: i32,
    pub regime: Regime,
    /// Legacy system continued unchanged, at full rates.
    pub current_system_taxes: ItemTaxResult,
    /// What is actually due that year under the reform.
    pub new_system_taxes: ItemTaxResult,
    /// `new_system_taxes.total_tax - current_system_taxes.total_tax`.
    pub difference: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub current_system_total: Money,
    pub new_system_total: Money,
    pub difference: Money,
    /// `difference / current_system_total * 100`, two decimals; zero when
    /// the current total is zero.
    pub percentage_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub base_value: Money,
    pub uf_origem: Uf,
    pub uf_destino: Uf,
    pub scenarios: Vec<TaxScenario>,
    pub summary: SimulationSummary,
}

/// Compares the legacy and reformed tax burden of a base value over years.
#[derive(Debug, Clone, Default)]
pub struct TaxScenarioSimulator {
    orchestrator: TaxCalculationOrchestrator,
}

impl TaxScenarioSimulator {
    pub fn new(config: CalculationConfig) -> Self {
        Self {
            orchestrator: TaxCalculationOrchestrator::new(config),
        }
    }

    pub fn simulate(&self, input: &SimulationInput) -> Result<SimulationResult, TaxError> {
        if input.years.is_empty() {
            return Err(TaxError::BusinessRule(
                "at least one year must be provided".into(),
            ));
        }
        if !input.base_value.is_positive() {
            return Err(TaxError::BusinessRule(format!(
                "base value must be positive, got {}",
                input.base_value
            )));
        }
        let cfop = input.cfop()?;
        let currency = input.base_value.currency();

        let mut scenarios = Vec::with_capacity(input.years.len());
        for &year in &input.years {
            let scenario = self.scenario(input, cfop, year)?;
            tracing::debug!(
                year,
                regime = %scenario.regime,
                current = %scenario.current_system_taxes.total_tax,
                new = %scenario.new_system_taxes.total_tax,
                "year simulated"
            );
            scenarios.push(scenario);
        }

        let current_system_total = Money::sum(
            currency,
            scenarios.iter().map(|s| &s.current_system_taxes.total_tax),
        )?;
        let new_system_total =
            Money::sum(currency, scenarios.iter().map(|s| &s.new_system_taxes.total_tax))?;
        let difference = new_system_total.subtract(&current_system_total)?;
        let percentage_change = if current_system_total.is_zero() {
            Decimal::ZERO
        } else {
            let change = difference
                .amount()
                .checked_div(current_system_total.amount())
                .and_then(|ratio| ratio.checked_mul(dec!(100)))
                .ok_or_else(|| {
                    TaxError::BusinessRule(format!(
                        "percentage change of {difference} over {current_system_total} overflows"
                    ))
                })?;
            round_half_up(change, 2)
        };

        Ok(SimulationResult {
            base_value: input.base_value,
            uf_origem: input.uf_origem,
            uf_destino: input.uf_destino,
            scenarios,
            summary: SimulationSummary {
                current_system_total,
                new_system_total,
                difference,
                percentage_change,
            },
        })
    }

    /// Regime classification without running a simulation.
    pub fn get_regime_info(&self, date: NaiveDate) -> RegimeInfo {
        RegimeResolver::regime_info(date)
    }

    fn scenario(
        &self,
        input: &SimulationInput,
        cfop: Cfop,
        year: i32,
    ) -> Result<TaxScenario, TaxError> {
        let date = NaiveDate::from_ymd_opt(year, 7, 1).ok_or_else(|| {
            TaxError::BusinessRule(format!("year {year} is not a valid calendar year"))
        })?;
        let item = TaxCalculationInput::new(
            format!("simulation-{year}"),
            input.base_value,
            date,
            cfop,
            input.ncm.clone(),
            input.uf_origem,
            input.uf_destino,
        );
        let current_system_taxes = self.orchestrator.calculate_for_regime(&item, Regime::Current)?;
        let new_system_taxes = self.orchestrator.calculate(&item)?;
        let difference = new_system_taxes
            .total_tax
            .subtract(&current_system_taxes.total_tax)?;
        Ok(TaxScenario {
            year,
            regime: new_system_taxes.regime,
            current_system_taxes,
            new_system_taxes,
            difference,
        })
    }
}

//! Rate tables and transition schedule.
//!
//! Defaults follow the reference rates published for LC 214/2025
//! (IBS 17.70 % split 10.62 % state / 7.08 % municipal, CBS 8.80 %)
//! and the 2024 modal ICMS rates of each state.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{
    Aliquota, CurrencyCode, NEW_REGIME_START_YEAR, TRANSITION_START_YEAR, TaxError, Uf,
};

/// Full IBS/CBS reference rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegimeRates {
    /// IBS, state share.
    pub ibs_uf: Aliquota,
    /// IBS, municipal share.
    pub ibs_mun: Aliquota,
    /// CBS (federal).
    pub cbs: Aliquota,
}

impl Default for NewRegimeRates {
    fn default() -> Self {
        Self {
            ibs_uf: rate(dec!(10.62)),
            ibs_mun: rate(dec!(7.08)),
            cbs: rate(dec!(8.8)),
        }
    }
}

/// Legacy ICMS / PIS / COFINS rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRates {
    /// Internal (intrastate) ICMS rate per UF.
    pub icms_internal: BTreeMap<Uf, Aliquota>,
    /// Interstate ICMS rate (Resolução do Senado 22/1989).
    pub icms_interstate: Aliquota,
    /// Interstate rate from South/Southeast (except ES) to N/NE/CO/ES.
    pub icms_interstate_reduced: Aliquota,
    /// PIS, non-cumulative regime.
    pub pis: Aliquota,
    /// COFINS, non-cumulative regime.
    pub cofins: Aliquota,
}

impl Default for LegacyRates {
    fn default() -> Self {
        let table: [(Uf, Decimal); 27] = [
            (Uf::AC, dec!(19)),
            (Uf::AL, dec!(19)),
            (Uf::AM, dec!(20)),
            (Uf::AP, dec!(18)),
            (Uf::BA, dec!(20.5)),
            (Uf::CE, dec!(20)),
            (Uf::DF, dec!(20)),
            (Uf::ES, dec!(17)),
            (Uf::GO, dec!(19)),
            (Uf::MA, dec!(23)),
            (Uf::MG, dec!(18)),
            (Uf::MS, dec!(17)),
            (Uf::MT, dec!(17)),
            (Uf::PA, dec!(19)),
            (Uf::PB, dec!(20)),
            (Uf::PE, dec!(20.5)),
            (Uf::PI, dec!(22.5)),
            (Uf::PR, dec!(19.5)),
            (Uf::RJ, dec!(20)),
            (Uf::RN, dec!(20)),
            (Uf::RO, dec!(19.5)),
            (Uf::RR, dec!(20)),
            (Uf::RS, dec!(17)),
            (Uf::SC, dec!(17)),
            (Uf::SE, dec!(19)),
            (Uf::SP, dec!(18)),
            (Uf::TO, dec!(20)),
        ];
        Self {
            icms_internal: table.into_iter().map(|(uf, p)| (uf, rate(p))).collect(),
            icms_interstate: rate(dec!(12)),
            icms_interstate_reduced: rate(dec!(7)),
            pis: rate(dec!(1.65)),
            cofins: rate(dec!(7.6)),
        }
    }
}

impl LegacyRates {
    /// Internal ICMS rate of `uf`.
    pub fn icms_internal_rate(&self, uf: Uf) -> Result<Aliquota, TaxError> {
        self.icms_internal
            .get(&uf)
            .copied()
            .ok_or_else(|| TaxError::Configuration(format!("no internal ICMS rate for {uf}")))
    }
}

/// Share of each system charged in one transition year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseIn {
    /// Percent of the full IBS/CBS rates charged.
    pub new_regime: Aliquota,
    /// Percent of the full legacy rates still charged.
    pub legacy: Aliquota,
}

impl PhaseIn {
    pub fn new(new_regime: Decimal, legacy: Decimal) -> Result<Self, TaxError> {
        Ok(Self {
            new_regime: Aliquota::from_percentage(new_regime)?,
            legacy: Aliquota::from_percentage(legacy)?,
        })
    }
}

/// Year-keyed phase-in table covering every transition year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionSchedule(BTreeMap<i32, PhaseIn>);

impl Default for TransitionSchedule {
    fn default() -> Self {
        let table = [
            (2026, dec!(5), dec!(100)),
            (2027, dec!(10), dec!(100)),
            (2028, dec!(15), dec!(100)),
            (2029, dec!(25), dec!(90)),
            (2030, dec!(40), dec!(80)),
            (2031, dec!(55), dec!(70)),
            (2032, dec!(70), dec!(60)),
        ];
        Self(
            table
                .into_iter()
                .map(|(year, new_regime, legacy)| {
                    (
                        year,
                        PhaseIn {
                            new_regime: rate(new_regime),
                            legacy: rate(legacy),
                        },
                    )
                })
                .collect(),
        )
    }
}

impl TransitionSchedule {
    /// Build a schedule from explicit entries; see [`TransitionSchedule::validate`].
    pub fn from_entries(
        entries: impl IntoIterator<Item = (i32, PhaseIn)>,
    ) -> Result<Self, TaxError> {
        let schedule = Self(entries.into_iter().collect());
        schedule.validate()?;
        Ok(schedule)
    }

    /// Phase-in for `year`, failing if the year is not scheduled.
    pub fn phase_in(&self, year: i32) -> Result<PhaseIn, TaxError> {
        self.0
            .get(&year)
            .copied()
            .ok_or_else(|| TaxError::Configuration(format!("no phase-in scheduled for {year}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, PhaseIn)> + '_ {
        self.0.iter().map(|(y, p)| (*y, *p))
    }

    fn set(&mut self, year: i32, phase_in: PhaseIn) {
        self.0.insert(year, phase_in);
    }

    /// Every transition year must be present, no other year may be, the
    /// new-regime share must never decrease and the legacy share must
    /// never increase.
    pub fn validate(&self) -> Result<(), TaxError> {
        if let Some(year) = self
            .0
            .keys()
            .find(|y| !(TRANSITION_START_YEAR..NEW_REGIME_START_YEAR).contains(*y))
        {
            return Err(TaxError::Configuration(format!(
                "phase-in for {year} lies outside the transition years \
                 {TRANSITION_START_YEAR}-{}",
                NEW_REGIME_START_YEAR - 1
            )));
        }

        let mut previous: Option<(i32, PhaseIn)> = None;
        for year in TRANSITION_START_YEAR..NEW_REGIME_START_YEAR {
            let current = self.phase_in(year)?;
            if let Some((prev_year, prev)) = previous {
                if current.new_regime < prev.new_regime {
                    return Err(TaxError::Configuration(format!(
                        "new-regime share decreases from {} in {prev_year} to {} in {year}",
                        prev.new_regime, current.new_regime
                    )));
                }
                if current.legacy > prev.legacy {
                    return Err(TaxError::Configuration(format!(
                        "legacy share increases from {} in {prev_year} to {} in {year}",
                        prev.legacy, current.legacy
                    )));
                }
            }
            previous = Some((year, current));
        }
        Ok(())
    }
}

/// Everything the orchestrator needs besides the item itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Currency expected by callers that aggregate results.
    pub currency: CurrencyCode,
    pub new_regime: NewRegimeRates,
    pub legacy: LegacyRates,
    pub schedule: TransitionSchedule,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::BRL,
            new_regime: NewRegimeRates::default(),
            legacy: LegacyRates::default(),
            schedule: TransitionSchedule::default(),
        }
    }
}

impl CalculationConfig {
    pub fn validate(&self) -> Result<(), TaxError> {
        for uf in Uf::ALL {
            self.legacy.icms_internal_rate(uf)?;
        }
        self.schedule.validate()
    }

    /// Parse and validate a JSON configuration document.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, TaxError> {
        let config: CalculationConfig = serde_json::from_str(json)
            .map_err(|e| TaxError::Configuration(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, TaxError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TaxError::Configuration(format!("cannot serialize configuration: {e}")))
    }
}

/// Builder for [`CalculationConfig`].
///
/// # Example
///
/// ```
/// use tributo::calculation::{CalculationConfigBuilder, PhaseIn};
/// use tributo::core::{Aliquota, Uf};
/// use rust_decimal_macros::dec;
///
/// let config = CalculationConfigBuilder::new()
///     .icms_internal_rate(Uf::SP, Aliquota::from_percentage(dec!(18)).unwrap())
///     .phase_in(2026, PhaseIn::new(dec!(4), dec!(100)).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.schedule.phase_in(2026).unwrap().new_regime.percentual(), dec!(4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalculationConfigBuilder {
    config: CalculationConfig,
}

impl CalculationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(mut self, currency: CurrencyCode) -> Self {
        self.config.currency = currency;
        self
    }

    pub fn new_regime_rates(mut self, rates: NewRegimeRates) -> Self {
        self.config.new_regime = rates;
        self
    }

    pub fn legacy_rates(mut self, rates: LegacyRates) -> Self {
        self.config.legacy = rates;
        self
    }

    pub fn icms_internal_rate(mut self, uf: Uf, rate: Aliquota) -> Self {
        self.config.legacy.icms_internal.insert(uf, rate);
        self
    }

    pub fn schedule(mut self, schedule: TransitionSchedule) -> Self {
        self.config.schedule = schedule;
        self
    }

    /// Override a single year of the transition schedule.
    pub fn phase_in(mut self, year: i32, phase_in: PhaseIn) -> Self {
        self.config.schedule.set(year, phase_in);
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<CalculationConfig, TaxError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

const fn rate(p: Decimal) -> Aliquota {
    Aliquota::from_table(p)
}

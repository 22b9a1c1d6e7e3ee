//! Date-driven classification of the applicable tax regime.
//!
//! Emenda Constitucional 132/2023 and LC 214/2025 phase the IBS/CBS in
//! from 2026 and extinguish ICMS/ISS/PIS/COFINS by 2033:
//!
//! | Year        | Regime       |
//! |-------------|--------------|
//! | < 2026      | `Current`    |
//! | 2026 – 2032 | `Transition` |
//! | ≥ 2033      | `New`        |

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First calendar year of the transition.
pub const TRANSITION_START_YEAR: i32 = 2026;

/// First calendar year in which only IBS/CBS apply.
pub const NEW_REGIME_START_YEAR: i32 = 2033;

/// The tax-law system that applies to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Legacy taxes only (ICMS, PIS, COFINS).
    Current,
    /// Legacy and IBS/CBS coexist, weighted by the transition schedule.
    Transition,
    /// IBS/CBS only.
    New,
}

impl Regime {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Transition => "TRANSITION",
            Self::New => "NEW",
        }
    }

    /// Whether legacy taxes are charged under this regime.
    pub fn has_legacy_taxes(&self) -> bool {
        !matches!(self, Self::New)
    }

    /// Whether IBS/CBS are charged under this regime.
    pub fn has_ibs_cbs(&self) -> bool {
        !matches!(self, Self::Current)
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Descriptive regime record for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeInfo {
    pub regime: Regime,
    pub year: i32,
    pub transition_start_year: i32,
    pub new_regime_start_year: i32,
    pub description: String,
}

/// Stateless resolver from operation date to [`Regime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeResolver;

impl RegimeResolver {
    pub fn resolve(date: NaiveDate) -> Regime {
        Self::resolve_year(date.year())
    }

    pub fn resolve_year(year: i32) -> Regime {
        if year < TRANSITION_START_YEAR {
            Regime::Current
        } else if year < NEW_REGIME_START_YEAR {
            Regime::Transition
        } else {
            Regime::New
        }
    }

    pub fn regime_info(date: NaiveDate) -> RegimeInfo {
        let regime = Self::resolve(date);
        let description = match regime {
            Regime::Current => "legacy regime: ICMS, PIS and COFINS",
            Regime::Transition => "transition: legacy taxes and IBS/CBS coexist",
            Regime::New => "new regime: IBS and CBS only",
        };
        RegimeInfo {
            regime,
            year: date.year(),
            transition_start_year: TRANSITION_START_YEAR,
            new_regime_start_year: NEW_REGIME_START_YEAR,
            description: description.to_string(),
        }
    }
}

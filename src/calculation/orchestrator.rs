//! Per-item tax calculation across the three regimes.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::config::{CalculationConfig, NewRegimeRates, PhaseIn};
use super::ibs_cbs::{Deferral, IbsCbsGroup, IbsCbsGroupBuilder, RateReduction};
use super::legacy::{LegacyTaxes, calculate_legacy};
use crate::core::{
    Aliquota, BaseCalculo, Cfop, Money, Ncm, OperationScope, Regime, RegimeResolver, TaxAmount,
    TaxError, Uf,
};

/// One item to calculate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationInput {
    pub item_id: String,
    pub base_value: Money,
    pub operation_date: NaiveDate,
    pub cfop: Cfop,
    pub ncm: Option<Ncm>,
    pub uf_origem: Uf,
    pub uf_destino: Uf,
    /// IBS/CBS situation code; derived from the operation when absent.
    #[serde(default)]
    pub cst: Option<String>,
    /// cClassTrib; `{cst}001` when absent.
    #[serde(default)]
    pub classificacao: Option<String>,
    /// Reduction applied to the IBS/CBS rates.
    #[serde(default)]
    pub rate_reduction: Option<Aliquota>,
    /// Share of the IBS/CBS deferred to a later stage.
    #[serde(default)]
    pub deferral: Option<Aliquota>,
}

impl TaxCalculationInput {
    pub fn new(
        item_id: impl Into<String>,
        base_value: Money,
        operation_date: NaiveDate,
        cfop: Cfop,
        ncm: Option<Ncm>,
        uf_origem: Uf,
        uf_destino: Uf,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            base_value,
            operation_date,
            cfop,
            ncm,
            uf_origem,
            uf_destino,
            cst: None,
            classificacao: None,
            rate_reduction: None,
            deferral: None,
        }
    }

    pub fn with_cst(mut self, cst: impl Into<String>) -> Self {
        self.cst = Some(cst.into());
        self
    }

    pub fn with_classificacao(mut self, classificacao: impl Into<String>) -> Self {
        self.classificacao = Some(classificacao.into());
        self
    }

    pub fn with_rate_reduction(mut self, reduction: Aliquota) -> Self {
        self.rate_reduction = Some(reduction);
        self
    }

    pub fn with_deferral(mut self, percent: Aliquota) -> Self {
        self.deferral = Some(percent);
        self
    }

    fn is_export(&self) -> bool {
        self.cfop.scope() == OperationScope::Foreign && self.uf_destino.is_exterior()
    }
}

/// Full tax breakdown of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTaxResult {
    pub item_id: String,
    pub regime: Regime,
    pub operation_date: NaiveDate,
    pub base_value: Money,
    pub ibs_uf: TaxAmount,
    pub ibs_mun: TaxAmount,
    pub cbs: TaxAmount,
    /// Present in `Current` and `Transition`.
    pub legacy: Option<LegacyTaxes>,
    /// Present in `Transition` and `New`.
    pub ibs_cbs: Option<IbsCbsGroup>,
    /// Present in `Transition`.
    pub phase_in: Option<PhaseIn>,
    /// Legacy plus IBS/CBS, before any deferral.
    pub total_tax: Money,
}

impl ItemTaxResult {
    /// Total IBS + CBS of this item.
    pub fn ibs_cbs_total(&self) -> Result<Money, TaxError> {
        self.ibs_uf
            .value()
            .add(&self.ibs_mun.value())?
            .add(&self.cbs.value())
    }

    /// Total legacy taxes, zero when the regime has none.
    pub fn legacy_total(&self) -> Result<Money, TaxError> {
        match &self.legacy {
            Some(legacy) => legacy.total(),
            None => Ok(Money::zero(self.base_value.currency())),
        }
    }

    fn amounts(&self) -> Vec<Money> {
        let mut amounts = vec![
            self.ibs_uf.value(),
            self.ibs_uf.base().effective(),
            self.ibs_mun.value(),
            self.cbs.value(),
            self.total_tax,
        ];
        if let Some(legacy) = &self.legacy {
            amounts.extend(legacy.amounts().iter().map(|t| t.value()));
        }
        if let Some(group) = &self.ibs_cbs {
            amounts.push(group.base_value);
            if let Some(d) = &group.deferral {
                amounts.extend([d.ibs_uf, d.ibs_mun, d.cbs]);
            }
        }
        amounts
    }

    /// Fail unless every produced amount is in the base value's currency.
    fn verify_currency(&self) -> Result<(), TaxError> {
        self.amounts()
            .iter()
            .try_for_each(|m| self.base_value.ensure_same_currency(m))
    }
}

/// Computes regime-appropriate breakdowns for items.
///
/// Pure and stateless apart from its configuration; a single instance may
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculationOrchestrator {
    config: CalculationConfig,
}

impl TaxCalculationOrchestrator {
    pub fn new(config: CalculationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    /// Calculate one item under the regime of its operation date.
    pub fn calculate(&self, input: &TaxCalculationInput) -> Result<ItemTaxResult, TaxError> {
        let regime = RegimeResolver::resolve(input.operation_date);
        self.calculate_for_regime(input, regime)
    }

    /// Calculate one item under an explicitly chosen regime.
    ///
    /// `Transition` still reads the phase-in of the operation year, so the
    /// date must fall inside the transition when forcing it.
    pub fn calculate_for_regime(
        &self,
        input: &TaxCalculationInput,
        regime: Regime,
    ) -> Result<ItemTaxResult, TaxError> {
        input.cfop.check_ufs(input.uf_origem, input.uf_destino)?;
        let base = BaseCalculo::create(input.base_value)?;

        let phase_in = match regime {
            Regime::Transition => Some(self.config.schedule.phase_in(input.operation_date.year())?),
            Regime::Current | Regime::New => None,
        };

        let legacy = if regime.has_legacy_taxes() {
            let share = phase_in.map_or(Aliquota::full(), |p| p.legacy);
            Some(calculate_legacy(
                base,
                input.cfop,
                input.uf_origem,
                input.uf_destino,
                &self.config.legacy,
                share,
            )?)
        } else {
            None
        };

        let (ibs_uf, ibs_mun, cbs, ibs_cbs) = if regime.has_ibs_cbs() {
            let share = phase_in.map_or(Aliquota::full(), |p| p.new_regime);
            let group = self.ibs_cbs_group(input, base, share)?;
            (group.ibs_uf, group.ibs_mun, group.cbs, Some(group))
        } else {
            let zero = TaxAmount::zero(base);
            (zero, zero, zero, None)
        };

        let mut total_tax = ibs_uf
            .value()
            .add(&ibs_mun.value())?
            .add(&cbs.value())?;
        if let Some(legacy) = &legacy {
            total_tax = total_tax.add(&legacy.total()?)?;
        }

        let result = ItemTaxResult {
            item_id: input.item_id.clone(),
            regime,
            operation_date: input.operation_date,
            base_value: input.base_value,
            ibs_uf,
            ibs_mun,
            cbs,
            legacy,
            ibs_cbs,
            phase_in,
            total_tax,
        };
        result.verify_currency()?;

        tracing::debug!(
            item_id = %result.item_id,
            regime = %regime,
            total_tax = %result.total_tax,
            "item calculated"
        );
        Ok(result)
    }

    /// Calculate every input in order. The first failure rejects the whole
    /// batch and names the failing item.
    pub fn calculate_batch(
        &self,
        inputs: &[TaxCalculationInput],
    ) -> Result<Vec<ItemTaxResult>, TaxError> {
        let results = inputs
            .iter()
            .map(|input| {
                self.calculate(input).map_err(|e| TaxError::BatchItem {
                    item_id: input.item_id.clone(),
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(items = results.len(), "batch calculated");
        Ok(results)
    }

    /// Sum of `total_tax` over `results`, in the configured currency.
    pub fn total_of(&self, results: &[ItemTaxResult]) -> Result<Money, TaxError> {
        Money::sum(self.config.currency, results.iter().map(|r| &r.total_tax))
    }

    fn ibs_cbs_group(
        &self,
        input: &TaxCalculationInput,
        base: BaseCalculo,
        share: Aliquota,
    ) -> Result<IbsCbsGroup, TaxError> {
        let full = if input.is_export() {
            NewRegimeRates {
                ibs_uf: Aliquota::zero(),
                ibs_mun: Aliquota::zero(),
                cbs: Aliquota::zero(),
            }
        } else {
            self.config.new_regime
        };
        let scaled = |r: Aliquota| r.scaled_by(&share);
        let mut rates = (scaled(full.ibs_uf), scaled(full.ibs_mun), scaled(full.cbs));

        let reduction = input.rate_reduction.map(|reduction| {
            rates = (
                rates.0.reduced_by(&reduction),
                rates.1.reduced_by(&reduction),
                rates.2.reduced_by(&reduction),
            );
            RateReduction {
                reduction,
                effective_ibs_uf: rates.0,
                effective_ibs_mun: rates.1,
                effective_cbs: rates.2,
            }
        });

        let ibs_uf = TaxAmount::calculate(base, rates.0);
        let ibs_mun = TaxAmount::calculate(base, rates.1);
        let cbs = TaxAmount::calculate(base, rates.2);

        let cst = input
            .cst
            .clone()
            .unwrap_or_else(|| default_cst(input).to_string());
        let classificacao = input
            .classificacao
            .clone()
            .unwrap_or_else(|| format!("{cst}001"));

        let mut builder = IbsCbsGroupBuilder::new(cst, classificacao, input.base_value)
            .taxes(ibs_uf, ibs_mun, cbs);
        if let Some(reduction) = reduction {
            builder = builder.rate_reduction(reduction);
        }
        if let Some(percent) = input.deferral {
            builder = builder.deferral(Deferral {
                percent,
                ibs_uf: ibs_uf.value().multiply_by_rate(&percent),
                ibs_mun: ibs_mun.value().multiply_by_rate(&percent),
                cbs: cbs.value().multiply_by_rate(&percent),
            });
        }
        builder.build()
    }
}

/// 410 immunity for exports, 510 deferral, 200 reduced rate, 000 otherwise.
fn default_cst(input: &TaxCalculationInput) -> &'static str {
    if input.is_export() {
        "410"
    } else if input.deferral.is_some() {
        "510"
    } else if input.rate_reduction.is_some() {
        "200"
    } else {
        "000"
    }
}

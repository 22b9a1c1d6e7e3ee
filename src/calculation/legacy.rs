//! Legacy ICMS / PIS / COFINS breakdown.

use serde::{Deserialize, Serialize};

use super::config::LegacyRates;
use crate::core::{
    Aliquota, BaseCalculo, Cfop, Money, OperationScope, Region, TaxAmount, TaxError, Uf,
};

/// Legacy taxes for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTaxes {
    pub icms: TaxAmount,
    pub pis: TaxAmount,
    pub cofins: TaxAmount,
}

impl LegacyTaxes {
    pub fn total(&self) -> Result<Money, TaxError> {
        self.icms.value().add(&self.pis.value())?.add(&self.cofins.value())
    }

    pub fn amounts(&self) -> [&TaxAmount; 3] {
        [&self.icms, &self.pis, &self.cofins]
    }
}

/// ICMS rate for an operation at full (unscaled) legacy rates.
///
/// - intrastate and imports: internal rate of the destination UF
/// - interstate: 7 % from South/Southeast (except ES) to N/NE/CO/ES, else 12 %
/// - exports: immune
pub fn icms_rate(
    cfop: Cfop,
    origem: Uf,
    destino: Uf,
    rates: &LegacyRates,
) -> Result<Aliquota, TaxError> {
    match cfop.scope() {
        OperationScope::Intrastate => rates.icms_internal_rate(destino),
        OperationScope::Interstate => {
            if is_reduced_interstate(origem, destino) {
                Ok(rates.icms_interstate_reduced)
            } else {
                Ok(rates.icms_interstate)
            }
        }
        OperationScope::Foreign if destino.is_exterior() => Ok(Aliquota::zero()),
        OperationScope::Foreign => rates.icms_internal_rate(destino),
    }
}

fn is_reduced_interstate(origem: Uf, destino: Uf) -> bool {
    let from_south_southeast =
        matches!(origem.region(), Region::Sul | Region::Sudeste) && origem != Uf::ES;
    let to_less_developed = matches!(
        destino.region(),
        Region::Norte | Region::Nordeste | Region::CentroOeste
    ) || destino == Uf::ES;
    from_south_southeast && to_less_developed
}

/// Compute the legacy breakdown over `base`, with every rate scaled by
/// `share` (100 % outside the transition).
pub fn calculate_legacy(
    base: BaseCalculo,
    cfop: Cfop,
    origem: Uf,
    destino: Uf,
    rates: &LegacyRates,
    share: Aliquota,
) -> Result<LegacyTaxes, TaxError> {
    let export = cfop.scope() == OperationScope::Foreign && destino.is_exterior();
    let icms = icms_rate(cfop, origem, destino, rates)?;
    let (pis, cofins) = if export {
        (Aliquota::zero(), Aliquota::zero())
    } else {
        (rates.pis, rates.cofins)
    };

    Ok(LegacyTaxes {
        icms: TaxAmount::calculate(base, icms.scaled_by(&share)),
        pis: TaxAmount::calculate(base, pis.scaled_by(&share)),
        cofins: TaxAmount::calculate(base, cofins.scaled_by(&share)),
    })
}

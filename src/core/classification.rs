//! Fiscal classification codes: federative units (UF), operation codes
//! (CFOP) and product codes (NCM).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::TaxError;

/// Brazilian geographic region, used by the interstate ICMS rate rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Norte,
    Nordeste,
    CentroOeste,
    Sudeste,
    Sul,
    /// Outside Brazil.
    Exterior,
}

/// Federative unit (unidade federativa), plus `EX` for foreign parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(clippy::upper_case_acronyms)]
pub enum Uf {
    AC,
    AL,
    AM,
    AP,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MG,
    MS,
    MT,
    PA,
    PB,
    PE,
    PI,
    PR,
    RJ,
    RN,
    RO,
    RR,
    RS,
    SC,
    SE,
    SP,
    TO,
    /// Exterior (imports/exports).
    EX,
}

impl Uf {
    /// All 27 federative units, in alphabetical order (excludes `EX`).
    pub const ALL: [Uf; 27] = [
        Uf::AC, Uf::AL, Uf::AM, Uf::AP, Uf::BA, Uf::CE, Uf::DF, Uf::ES, Uf::GO,
        Uf::MA, Uf::MG, Uf::MS, Uf::MT, Uf::PA, Uf::PB, Uf::PE, Uf::PI, Uf::PR,
        Uf::RJ, Uf::RN, Uf::RO, Uf::RR, Uf::RS, Uf::SC, Uf::SE, Uf::SP, Uf::TO,
    ];

    /// Two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AC => "AC",
            Self::AL => "AL",
            Self::AM => "AM",
            Self::AP => "AP",
            Self::BA => "BA",
            Self::CE => "CE",
            Self::DF => "DF",
            Self::ES => "ES",
            Self::GO => "GO",
            Self::MA => "MA",
            Self::MG => "MG",
            Self::MS => "MS",
            Self::MT => "MT",
            Self::PA => "PA",
            Self::PB => "PB",
            Self::PE => "PE",
            Self::PI => "PI",
            Self::PR => "PR",
            Self::RJ => "RJ",
            Self::RN => "RN",
            Self::RO => "RO",
            Self::RR => "RR",
            Self::RS => "RS",
            Self::SC => "SC",
            Self::SE => "SE",
            Self::SP => "SP",
            Self::TO => "TO",
            Self::EX => "EX",
        }
    }

    /// Parse a two-letter code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_ascii_uppercase();
        if upper == "EX" {
            return Some(Self::EX);
        }
        Self::ALL.iter().copied().find(|uf| uf.code() == upper)
    }

    /// Parse, failing with a validation error for unknown codes.
    pub fn parse(code: &str) -> Result<Self, TaxError> {
        Self::from_code(code)
            .ok_or_else(|| TaxError::Validation(format!("unknown UF '{code}'")))
    }

    pub fn region(&self) -> Region {
        match self {
            Self::AC | Self::AM | Self::AP | Self::PA | Self::RO | Self::RR | Self::TO => {
                Region::Norte
            }
            Self::AL
            | Self::BA
            | Self::CE
            | Self::MA
            | Self::PB
            | Self::PE
            | Self::PI
            | Self::RN
            | Self::SE => Region::Nordeste,
            Self::DF | Self::GO | Self::MS | Self::MT => Region::CentroOeste,
            Self::ES | Self::MG | Self::RJ | Self::SP => Region::Sudeste,
            Self::PR | Self::RS | Self::SC => Region::Sul,
            Self::EX => Region::Exterior,
        }
    }

    pub fn is_exterior(&self) -> bool {
        *self == Self::EX
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Uf {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Uf> for String {
    fn from(uf: Uf) -> Self {
        uf.code().to_string()
    }
}

/// Whether goods enter or leave the establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Entrada (CFOP 1xxx–3xxx).
    Entry,
    /// Saída (CFOP 5xxx–7xxx).
    Exit,
}

/// Geographic scope of an operation, from the CFOP's first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationScope {
    /// Same UF (1xxx / 5xxx).
    Intrastate,
    /// Different UFs (2xxx / 6xxx).
    Interstate,
    /// Import or export (3xxx / 7xxx).
    Foreign,
}

/// Código Fiscal de Operações e Prestações: four digits, first in {1,2,3,5,6,7}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cfop(u16);

impl Cfop {
    pub fn parse(code: &str) -> Result<Self, TaxError> {
        let code = code.trim().replace('.', "");
        if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TaxError::Validation(format!(
                "CFOP '{code}' must have exactly 4 digits"
            )));
        }
        if !matches!(code.as_bytes()[0], b'1' | b'2' | b'3' | b'5' | b'6' | b'7') {
            return Err(TaxError::Validation(format!(
                "CFOP '{code}' must start with 1, 2, 3, 5, 6 or 7"
            )));
        }
        code.parse::<u16>()
            .map(Self)
            .map_err(|e| TaxError::Validation(format!("CFOP '{code}': {e}")))
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    /// The last three digits, shared by the entry and exit variants of an
    /// operation (1102 and 5102 both end in 102).
    pub fn operation(&self) -> u16 {
        self.0 % 1000
    }

    pub fn direction(&self) -> Direction {
        if self.0 < 5000 {
            Direction::Entry
        } else {
            Direction::Exit
        }
    }

    pub fn scope(&self) -> OperationScope {
        match (self.0 / 1000) % 4 {
            1 => OperationScope::Intrastate,
            2 => OperationScope::Interstate,
            _ => OperationScope::Foreign,
        }
    }

    /// Check that the origin/destination UFs agree with this CFOP's scope.
    pub fn check_ufs(&self, origem: Uf, destino: Uf) -> Result<(), TaxError> {
        let ok = match self.scope() {
            OperationScope::Intrastate => origem == destino && !origem.is_exterior(),
            OperationScope::Interstate => {
                origem != destino && !origem.is_exterior() && !destino.is_exterior()
            }
            OperationScope::Foreign => origem.is_exterior() != destino.is_exterior(),
        };
        if !ok {
            return Err(TaxError::Validation(format!(
                "CFOP {self} ({:?}) is inconsistent with UFs {origem} -> {destino}",
                self.scope()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Cfop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl TryFrom<String> for Cfop {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cfop> for String {
    fn from(cfop: Cfop) -> Self {
        cfop.to_string()
    }
}

/// Nomenclatura Comum do Mercosul: eight digits (dots are accepted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ncm(String);

impl Ncm {
    pub fn parse(code: &str) -> Result<Self, TaxError> {
        let digits = code.trim().replace('.', "");
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TaxError::Validation(format!(
                "NCM '{code}' must have exactly 8 digits"
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit chapter (e.g. "01" for live animals).
    pub fn chapter(&self) -> &str {
        &self.0[..2]
    }

    /// Four-digit position (e.g. "0102" for live bovine animals).
    pub fn position(&self) -> &str {
        &self.0[..4]
    }
}

impl fmt::Display for Ncm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ncm {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ncm> for String {
    fn from(ncm: Ncm) -> Self {
        ncm.0
    }
}

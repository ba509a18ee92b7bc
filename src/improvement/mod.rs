pub mod keywords;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use keywords::{keywords_for, normalize_text};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImprovementType {
    Solar,
    Insulation,
    Windows,
    HeatPump,
    Battery,
    LoftConversion,
    Cladding,
    EvCharger,
    Other(String),
}

impl ImprovementType {
    pub const KNOWN: [ImprovementType; 8] = [
        ImprovementType::Solar,
        ImprovementType::Insulation,
        ImprovementType::Windows,
        ImprovementType::HeatPump,
        ImprovementType::Battery,
        ImprovementType::LoftConversion,
        ImprovementType::Cladding,
        ImprovementType::EvCharger,
    ];

    /// Parses a caller-supplied key. Never fails: unrecognised keys are kept
    /// lower-cased as `Other` so downstream tables fall back to defaults.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "solar" => Self::Solar,
            "insulation" => Self::Insulation,
            "windows" => Self::Windows,
            "heat_pump" => Self::HeatPump,
            "battery" => Self::Battery,
            "loft_conversion" => Self::LoftConversion,
            "cladding" => Self::Cladding,
            "ev_charger" => Self::EvCharger,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_slug(&self) -> &str {
        match self {
            Self::Solar => "solar",
            Self::Insulation => "insulation",
            Self::Windows => "windows",
            Self::HeatPump => "heat_pump",
            Self::Battery => "battery",
            Self::LoftConversion => "loft_conversion",
            Self::Cladding => "cladding",
            Self::EvCharger => "ev_charger",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Display for ImprovementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

impl From<String> for ImprovementType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ImprovementType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ImprovementType> for String {
    fn from(value: ImprovementType) -> Self {
        value.as_slug().to_string()
    }
}

pub fn parse_improvement_list(raw: &str) -> Vec<ImprovementType> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(ImprovementType::parse)
        .collect()
}

/// Energy Performance Certificate band, A (best) to G (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EpcBand {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EpcBand {
    pub const ALL: [EpcBand; 7] = [
        EpcBand::A,
        EpcBand::B,
        EpcBand::C,
        EpcBand::D,
        EpcBand::E,
        EpcBand::F,
        EpcBand::G,
    ];

    pub const BEST: u8 = 1;
    pub const WORST: u8 = 7;

    pub fn numeric(self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
            Self::D => 4,
            Self::E => 5,
            Self::F => 6,
            Self::G => 7,
        }
    }

    /// Inverse of [`EpcBand::numeric`], clamping out-of-range values.
    pub fn from_numeric(value: u8) -> Self {
        match value.clamp(Self::BEST, Self::WORST) {
            1 => Self::A,
            2 => Self::B,
            3 => Self::C,
            4 => Self::D,
            5 => Self::E,
            6 => Self::F,
            _ => Self::G,
        }
    }

    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn is_better_than(self, other: EpcBand) -> bool {
        self.numeric() < other.numeric()
    }

    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
        }
    }
}

impl Default for EpcBand {
    fn default() -> Self {
        Self::D
    }
}

impl Display for EpcBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Error)]
#[error("unknown EPC band: {0}")]
pub struct EpcBandParseError(pub String);

impl FromStr for EpcBand {
    type Err = EpcBandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            "G" => Ok(Self::G),
            _ => Err(EpcBandParseError(s.to_string())),
        }
    }
}

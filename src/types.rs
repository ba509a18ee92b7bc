use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::improvement::EpcBand;

pub const DEFAULT_FLOOR_AREA_M2: f64 = 90.0;
pub const DEFAULT_PROPERTY_TYPE: &str = "House";
pub const DEFAULT_BUILT_FORM: &str = "Semi-Detached";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Decision {
    Approved,
    Refused,
    Pending,
    Other(String),
}

impl Decision {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "Approved",
            Self::Refused => "Refused",
            Self::Pending => "Pending",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for Decision {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" | "granted" => Self::Approved,
            "refused" | "rejected" => Self::Refused,
            "pending" | "undecided" | "" => Self::Pending,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<Decision> for String {
    fn from(value: Decision) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A planning application as returned by a precedent search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningApplication {
    pub planning_reference: Option<String>,
    pub proposal: String,
    pub decision: Decision,
    pub application_date: Option<String>,
    pub decided_date: Option<String>,
    /// `POINT(<lon> <lat>)`
    pub geometry: Option<String>,
    pub current_epc: Option<EpcBand>,
}

impl PlanningApplication {
    pub fn new(reference: impl Into<String>, proposal: impl Into<String>) -> Self {
        Self {
            planning_reference: Some(reference.into()),
            proposal: proposal.into(),
            decision: Decision::Approved,
            application_date: None,
            decided_date: None,
            geometry: None,
            current_epc: None,
        }
    }

    pub fn with_dates(mut self, applied: &str, decided: &str) -> Self {
        self.application_date = Some(applied.to_string());
        self.decided_date = Some(decided.to_string());
        self
    }

    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = decision;
        self
    }

    pub fn with_geometry(mut self, geometry: &str) -> Self {
        self.geometry = Some(geometry.to_string());
        self
    }

    pub fn with_epc(mut self, band: EpcBand) -> Self {
        self.current_epc = Some(band);
        self
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetrics {
    pub floor_area_m2: f64,
    pub current_epc: EpcBand,
    pub property_type: String,
    pub built_form: String,
    pub co2_emissions_tonnes: Option<f64>,
    pub energy_consumption_kwh_m2: Option<f64>,
    pub certificate_key: Option<String>,
    pub potential_epc: Option<EpcBand>,
}

impl Default for PropertyMetrics {
    fn default() -> Self {
        Self {
            floor_area_m2: DEFAULT_FLOOR_AREA_M2,
            current_epc: EpcBand::D,
            property_type: DEFAULT_PROPERTY_TYPE.to_string(),
            built_form: DEFAULT_BUILT_FORM.to_string(),
            co2_emissions_tonnes: None,
            energy_consumption_kwh_m2: None,
            certificate_key: None,
            potential_epc: None,
        }
    }
}

impl PropertyMetrics {
    /// Floor area used by the estimators; non-positive or non-finite values
    /// count as missing.
    pub fn effective_floor_area(&self) -> f64 {
        if self.floor_area_m2.is_finite() && self.floor_area_m2 > 0.0 {
            self.floor_area_m2
        } else {
            DEFAULT_FLOOR_AREA_M2
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpcRecommendation {
    pub improvement_item: String,
    pub potential_band: Option<EpcBand>,
    pub indicative_cost: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    LandRegistry,
    NationalAverage,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LandRegistry => "land_registry",
            Self::NationalAverage => "national_average",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub current_epc: EpcBand,
    pub property_value: Option<f64>,
    pub recommendations: Vec<EpcRecommendation>,
}

impl MarketContext {
    pub fn from_metrics(metrics: &PropertyMetrics) -> Self {
        Self {
            current_epc: metrics.current_epc,
            property_value: None,
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Decision, PropertyMetrics};

    #[test]
    fn decision_parses_common_spellings() {
        assert_eq!(Decision::from("approved".to_string()), Decision::Approved);
        assert_eq!(Decision::from("Refused".to_string()), Decision::Refused);
        assert_eq!(
            Decision::from("Withdrawn".to_string()),
            Decision::Other("Withdrawn".to_string())
        );
    }

    #[test]
    fn effective_floor_area_falls_back_when_missing() {
        let mut metrics = PropertyMetrics::default();
        assert_eq!(metrics.effective_floor_area(), 90.0);
        metrics.floor_area_m2 = 0.0;
        assert_eq!(metrics.effective_floor_area(), 90.0);
        metrics.floor_area_m2 = 120.5;
        assert_eq!(metrics.effective_floor_area(), 120.5);
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::improvement::ImprovementType;

const HIGH_PRECEDENT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeasibilityRating {
    High,
    Medium,
    Low,
}

impl Display for FeasibilityRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityReason {
    PrecedentVolume,
    ConservationAreaSolar,
    ConservationAreaWindows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityAssessment {
    pub rating: FeasibilityRating,
    pub reason: FeasibilityReason,
    pub note: Option<String>,
}

pub fn rate(
    improvement: &ImprovementType,
    approved_count: usize,
    in_conservation_area: bool,
) -> FeasibilityAssessment {
    if in_conservation_area {
        match improvement {
            ImprovementType::Solar => {
                return FeasibilityAssessment {
                    rating: FeasibilityRating::Low,
                    reason: FeasibilityReason::ConservationAreaSolar,
                    note: Some(
                        "Conservation area: street-facing solar panels are usually refused."
                            .to_string(),
                    ),
                }
            }
            ImprovementType::Windows => {
                return FeasibilityAssessment {
                    rating: FeasibilityRating::Low,
                    reason: FeasibilityReason::ConservationAreaWindows,
                    note: Some(
                        "Conservation area: consider secondary glazing instead of full window replacement."
                            .to_string(),
                    ),
                }
            }
            _ => {}
        }
    }

    let rating = if approved_count >= HIGH_PRECEDENT_COUNT {
        FeasibilityRating::High
    } else if approved_count >= 1 {
        FeasibilityRating::Medium
    } else {
        FeasibilityRating::Low
    };
    FeasibilityAssessment {
        rating,
        reason: FeasibilityReason::PrecedentVolume,
        note: None,
    }
}

pub mod aggregator;
pub mod budget;
pub mod pipeline;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::estimate::{BandSource, EnergySavings, FeasibilityRating, FeasibilityReason};
use crate::improvement::{EpcBand, ImprovementType};
use crate::matching::PrecedentExample;
use crate::types::{Coordinates, ValueSource};

pub use aggregator::{analyze, assess_compliance, AnalysisInput, AnalysisSettings};
pub use budget::{check_budget, BudgetStatus};
pub use pipeline::{AnalysisRequest, RetrofitAnalyzer, SearchSettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementResult {
    pub improvement_type: ImprovementType,
    pub feasibility: FeasibilityRating,
    pub feasibility_reason: FeasibilityReason,
    pub feasibility_note: Option<String>,
    pub matched_precedents: usize,
    pub approved_examples: usize,
    pub average_time_days: Option<f64>,
    pub estimated_cost: f64,
    pub cost_explanation: String,
    pub estimated_roi_percent: f64,
    pub value_increase: f64,
    pub value_explanation: String,
    pub target_epc: EpcBand,
    pub band_source: BandSource,
    pub value_source: ValueSource,
    pub examples: Vec<PrecedentExample>,
    pub energy_savings: Option<EnergySavings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    OnTrack,
    OffTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyCompliance {
    pub current_epc: EpcBand,
    pub projected_epc: EpcBand,
    pub best_improvement: Option<ImprovementType>,
    pub combined_epc: EpcBand,
    pub status: ComplianceStatus,
    pub suggested_improvements: Vec<ImprovementType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub property_reference: String,
    pub location: Coordinates,
    pub budget: f64,
    pub improvements: Vec<ImprovementResult>,
    pub total_cost: f64,
    pub total_value_increase: f64,
    pub total_roi_percent: f64,
    pub budget_status: BudgetStatus,
    pub high_feasibility_count: usize,
    pub summary: String,
    pub energy_compliance: Option<EnergyCompliance>,
}

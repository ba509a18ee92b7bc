pub mod cost;
pub mod epc;
pub mod feasibility;
pub mod savings;
pub mod value;

pub use cost::{estimate_cost, CostEstimate};
pub use epc::{is_compliant, project_band};
pub use feasibility::{rate, FeasibilityAssessment, FeasibilityRating, FeasibilityReason};
pub use savings::{estimate_savings, EnergySavings};
pub use value::{estimate_value_increase, roi_percent, BandSource, ValueEstimate};

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Values the pipeline substitutes when a provider call fails or times out.

use crate::types::{MarketContext, PlanningApplication, PropertyMetrics};

pub const IN_CONSERVATION_AREA: bool = false;

pub fn property_metrics() -> PropertyMetrics {
    PropertyMetrics::default()
}

/// Band taken from whatever metrics were obtained; no sale price, so value
/// estimation falls back to the national average.
pub fn market_context(metrics: &PropertyMetrics) -> MarketContext {
    MarketContext::from_metrics(metrics)
}

pub fn planning_applications() -> Vec<PlanningApplication> {
    Vec::new()
}

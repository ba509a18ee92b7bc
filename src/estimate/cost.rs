use serde::{Deserialize, Serialize};

use crate::estimate::round_to_cents;
use crate::improvement::ImprovementType;
use crate::types::PropertyMetrics;

pub const BENCHMARK_YEAR: u16 = 2025;
pub const DEFAULT_RATE_PER_M2: f64 = 100.0;
pub const HEAT_PUMP_GRANT: f64 = 7_500.0;
pub const HEAT_PUMP_MINIMUM_COST: f64 = 4_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub cost: f64,
    pub explanation: String,
}

/// Benchmark installation rate in £ per m² of floor area.
pub fn rate_per_m2(improvement: &ImprovementType) -> f64 {
    match improvement {
        ImprovementType::Insulation => 110.0,
        ImprovementType::Windows => 65.0,
        ImprovementType::Solar => 85.0,
        ImprovementType::HeatPump => 150.0,
        _ => DEFAULT_RATE_PER_M2,
    }
}

pub fn estimate_cost(improvement: &ImprovementType, metrics: &PropertyMetrics) -> CostEstimate {
    let area = metrics.effective_floor_area();
    let mut cost = area * rate_per_m2(improvement);
    if *improvement == ImprovementType::HeatPump {
        cost = (cost - HEAT_PUMP_GRANT).max(HEAT_PUMP_MINIMUM_COST);
    }
    CostEstimate {
        cost: round_to_cents(cost),
        explanation: format!("Calculated for {area:.1}m² at {BENCHMARK_YEAR} benchmark rates."),
    }
}

#[cfg(test)]
mod tests {
    use super::estimate_cost;
    use crate::improvement::ImprovementType;
    use crate::types::PropertyMetrics;

    fn metrics(area: f64) -> PropertyMetrics {
        PropertyMetrics {
            floor_area_m2: area,
            ..PropertyMetrics::default()
        }
    }

    #[test]
    fn heat_pump_subtracts_grant_with_floor() {
        let estimate = estimate_cost(&ImprovementType::HeatPump, &metrics(90.0));
        assert_eq!(estimate.cost, 6000.0);
        let small = estimate_cost(&ImprovementType::HeatPump, &metrics(40.0));
        assert_eq!(small.cost, 4000.0);
    }

    #[test]
    fn area_times_rate_for_other_types() {
        assert_eq!(estimate_cost(&ImprovementType::Insulation, &metrics(90.0)).cost, 9900.0);
        assert_eq!(estimate_cost(&ImprovementType::Windows, &metrics(90.0)).cost, 5850.0);
        assert_eq!(estimate_cost(&ImprovementType::Solar, &metrics(72.3)).cost, 6145.5);
        assert_eq!(estimate_cost(&ImprovementType::Battery, &metrics(90.0)).cost, 9000.0);
        assert_eq!(
            estimate_cost(&ImprovementType::parse("green roof"), &metrics(50.0)).cost,
            5000.0
        );
    }

    #[test]
    fn rounds_to_cents_and_explains_area() {
        let estimate = estimate_cost(&ImprovementType::Windows, &metrics(33.3333));
        assert_eq!(estimate.cost, 2166.66);
        assert!(estimate.explanation.contains("33.3m²"));
        assert!(estimate.explanation.contains("2025 benchmark rates"));
    }

    #[test]
    fn missing_area_uses_default() {
        let estimate = estimate_cost(&ImprovementType::Solar, &metrics(f64::NAN));
        assert_eq!(estimate.cost, 7650.0);
        assert!(estimate.explanation.contains("90.0m²"));
    }
}

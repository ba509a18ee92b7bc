use serde::{Deserialize, Serialize};

use crate::estimate::round_to_cents;
use crate::improvement::ImprovementType;
use crate::types::PropertyMetrics;

pub const DEFAULT_ENERGY_PRICE_PER_KWH: f64 = 0.27;
/// Reported instead of dividing by a zero saving.
pub const PAYBACK_SENTINEL_YEARS: f64 = 999.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySavings {
    pub kwh_per_year: Option<f64>,
    pub co2_tonnes_per_year: Option<f64>,
    pub annual_bill_saving: f64,
    pub payback_years: f64,
}

/// Share of current consumption removed by an improvement.
pub fn savings_fraction(improvement: &ImprovementType) -> f64 {
    match improvement {
        ImprovementType::Insulation => 0.20,
        ImprovementType::HeatPump => 0.35,
        ImprovementType::Solar => 0.15,
        ImprovementType::Windows => 0.10,
        ImprovementType::Cladding => 0.12,
        ImprovementType::Battery => 0.05,
        ImprovementType::LoftConversion | ImprovementType::EvCharger => 0.0,
        ImprovementType::Other(_) => 0.0,
    }
}

/// Returns `None` when the certificate carries neither energy nor CO2 figures.
pub fn estimate_savings(
    improvement: &ImprovementType,
    metrics: &PropertyMetrics,
    cost: f64,
    price_per_kwh: f64,
) -> Option<EnergySavings> {
    if metrics.energy_consumption_kwh_m2.is_none() && metrics.co2_emissions_tonnes.is_none() {
        return None;
    }
    let fraction = savings_fraction(improvement);
    let kwh_per_year = metrics
        .energy_consumption_kwh_m2
        .map(|intensity| intensity * metrics.effective_floor_area() * fraction);
    let co2_tonnes_per_year = metrics.co2_emissions_tonnes.map(|co2| co2 * fraction);
    let annual_bill_saving = round_to_cents(kwh_per_year.unwrap_or(0.0) * price_per_kwh);
    let payback_years = if annual_bill_saving > 0.0 {
        cost / annual_bill_saving
    } else {
        PAYBACK_SENTINEL_YEARS
    };
    Some(EnergySavings {
        kwh_per_year,
        co2_tonnes_per_year,
        annual_bill_saving,
        payback_years,
    })
}

#[cfg(test)]
mod tests {
    use super::{estimate_savings, PAYBACK_SENTINEL_YEARS};
    use crate::improvement::ImprovementType;
    use crate::types::PropertyMetrics;

    fn metrics_with_energy() -> PropertyMetrics {
        PropertyMetrics {
            floor_area_m2: 100.0,
            energy_consumption_kwh_m2: Some(200.0),
            co2_emissions_tonnes: Some(4.0),
            ..PropertyMetrics::default()
        }
    }

    #[test]
    fn none_without_energy_figures() {
        let metrics = PropertyMetrics::default();
        assert!(estimate_savings(&ImprovementType::Solar, &metrics, 5_000.0, 0.27).is_none());
    }

    #[test]
    fn heat_pump_saves_a_third_of_consumption() {
        let savings =
            estimate_savings(&ImprovementType::HeatPump, &metrics_with_energy(), 6_000.0, 0.25)
                .expect("savings");
        assert!((savings.kwh_per_year.unwrap_or_default() - 7_000.0).abs() < 1e-6);
        assert!((savings.co2_tonnes_per_year.unwrap_or_default() - 1.4).abs() < 1e-9);
        assert_eq!(savings.annual_bill_saving, 1_750.0);
        assert!((savings.payback_years - 6_000.0 / 1_750.0).abs() < 1e-9);
    }

    #[test]
    fn zero_saving_reports_sentinel_payback() {
        let savings = estimate_savings(
            &ImprovementType::EvCharger,
            &metrics_with_energy(),
            1_200.0,
            0.27,
        )
        .expect("savings");
        assert_eq!(savings.annual_bill_saving, 0.0);
        assert_eq!(savings.payback_years, PAYBACK_SENTINEL_YEARS);
    }
}

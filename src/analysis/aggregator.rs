use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::budget::check_budget;
use crate::analysis::summary::{generate_summary, SummaryFacts};
use crate::analysis::{AnalysisResult, ComplianceStatus, EnergyCompliance, ImprovementResult};
use crate::estimate::savings::DEFAULT_ENERGY_PRICE_PER_KWH;
use crate::estimate::value::NATIONAL_AVERAGE_PROPERTY_VALUE;
use crate::estimate::{
    estimate_cost, estimate_savings, estimate_value_increase, is_compliant, project_band, rate,
    roi_percent, FeasibilityRating,
};
use crate::improvement::{EpcBand, ImprovementType};
use crate::matching::precedent::DEFAULT_EXAMPLE_LIMIT;
use crate::matching::{average_decision_days, match_applications, top_examples, MatchOptions};
use crate::types::{Coordinates, MarketContext, PlanningApplication, PropertyMetrics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub match_options: MatchOptions,
    pub example_limit: usize,
    pub fallback_property_value: f64,
    pub energy_price_per_kwh: f64,
    pub include_compliance: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            match_options: MatchOptions::default(),
            example_limit: DEFAULT_EXAMPLE_LIMIT,
            fallback_property_value: NATIONAL_AVERAGE_PROPERTY_VALUE,
            energy_price_per_kwh: DEFAULT_ENERGY_PRICE_PER_KWH,
            include_compliance: true,
        }
    }
}

/// Everything the aggregation needs once external data has been gathered.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub property_reference: String,
    pub location: Coordinates,
    pub budget: f64,
    pub improvements: Vec<ImprovementType>,
    pub metrics: PropertyMetrics,
    pub market: MarketContext,
    pub in_conservation_area: bool,
    pub applications: Vec<PlanningApplication>,
    pub settings: AnalysisSettings,
}

pub fn analyze(input: &AnalysisInput) -> AnalysisResult {
    let mut improvements = Vec::with_capacity(input.improvements.len());
    let mut total_cost = 0.0;
    let mut total_value_increase = 0.0;

    for improvement in &input.improvements {
        let result = analyze_improvement(input, improvement);
        info!(
            improvement = %improvement,
            precedents = result.approved_examples,
            cost = result.estimated_cost,
            roi = result.estimated_roi_percent,
            feasibility = %result.feasibility,
            "analysed improvement"
        );
        total_cost += result.estimated_cost;
        total_value_increase += result.value_increase;
        improvements.push(result);
    }

    let total_roi_percent = roi_percent(total_cost, total_value_increase);
    let budget_status = check_budget(total_cost, input.budget);
    let high_feasibility_count = improvements
        .iter()
        .filter(|imp| imp.feasibility == FeasibilityRating::High)
        .count();

    let summary = generate_summary(&SummaryFacts {
        property_reference: &input.property_reference,
        improvement_count: input.improvements.len(),
        total_cost,
        total_value_increase,
        total_roi_percent,
        budget: input.budget,
        budget_status: &budget_status,
        high_feasibility_count,
    });

    let energy_compliance = input
        .settings
        .include_compliance
        .then(|| assess_compliance(input.market.current_epc, &input.improvements));

    info!(
        total_cost,
        total_value_increase,
        total_roi_percent,
        within_budget = budget_status.within_budget,
        "analysis complete"
    );

    AnalysisResult {
        property_reference: input.property_reference.clone(),
        location: input.location,
        budget: input.budget,
        improvements,
        total_cost,
        total_value_increase,
        total_roi_percent,
        budget_status,
        high_feasibility_count,
        summary,
        energy_compliance,
    }
}

fn analyze_improvement(input: &AnalysisInput, improvement: &ImprovementType) -> ImprovementResult {
    let settings = &input.settings;
    let matches = match_applications(&input.applications, improvement, settings.match_options);
    let approved: Vec<&PlanningApplication> =
        matches.iter().copied().filter(|app| app.is_approved()).collect();

    let average_time_days = average_decision_days(&matches);
    let examples = top_examples(&matches, &input.metrics, settings.example_limit);
    let cost = estimate_cost(improvement, &input.metrics);
    let value = estimate_value_increase(
        improvement,
        cost.cost,
        input.market.current_epc,
        input.market.property_value,
        &input.market.recommendations,
        settings.fallback_property_value,
    );
    let roi = roi_percent(cost.cost, value.value_increase);
    let feasibility = rate(improvement, approved.len(), input.in_conservation_area);
    let energy_savings = estimate_savings(
        improvement,
        &input.metrics,
        cost.cost,
        settings.energy_price_per_kwh,
    );
    debug!(
        improvement = %improvement,
        target = %value.target_band,
        band_source = ?value.band_source,
        value_source = ?value.value_source,
        "value estimate"
    );

    ImprovementResult {
        improvement_type: improvement.clone(),
        feasibility: feasibility.rating,
        feasibility_reason: feasibility.reason,
        feasibility_note: feasibility.note,
        matched_precedents: matches.len(),
        approved_examples: approved.len(),
        average_time_days,
        estimated_cost: cost.cost,
        cost_explanation: cost.explanation,
        estimated_roi_percent: roi,
        value_increase: value.value_increase,
        value_explanation: value.explanation,
        target_epc: value.target_band,
        band_source: value.band_source,
        value_source: value.value_source,
        examples,
        energy_savings,
    }
}

/// Picks the single requested improvement with the best projected band and
/// checks it against the band C target.
pub fn assess_compliance(current: EpcBand, requested: &[ImprovementType]) -> EnergyCompliance {
    let mut projected = current;
    let mut best_improvement = None;
    for improvement in requested {
        let band = project_band(current, std::slice::from_ref(improvement));
        if best_improvement.is_none() || band.is_better_than(projected) {
            projected = band;
            best_improvement = Some(improvement.clone());
        }
    }
    let combined_epc = project_band(current, requested);

    let status = if is_compliant(projected) {
        ComplianceStatus::OnTrack
    } else {
        ComplianceStatus::OffTrack
    };
    let suggested_improvements = match status {
        ComplianceStatus::OnTrack => Vec::new(),
        ComplianceStatus::OffTrack => ImprovementType::KNOWN
            .iter()
            .filter(|known| !requested.contains(known))
            .cloned()
            .collect(),
    };

    EnergyCompliance {
        current_epc: current,
        projected_epc: projected,
        best_improvement,
        combined_epc,
        status,
        suggested_improvements,
    }
}

#[cfg(test)]
mod tests {
    use super::{analyze, assess_compliance, AnalysisInput, AnalysisSettings};
    use crate::analysis::ComplianceStatus;
    use crate::estimate::FeasibilityRating;
    use crate::improvement::{EpcBand, ImprovementType};
    use crate::types::{Coordinates, Decision, MarketContext, PlanningApplication, PropertyMetrics};

    fn input(improvements: &[&str], budget: f64) -> AnalysisInput {
        let metrics = PropertyMetrics::default();
        AnalysisInput {
            property_reference: "SW1A 1AA".to_string(),
            location: Coordinates::new(51.501, -0.141),
            budget,
            improvements: improvements.iter().map(|s| ImprovementType::parse(s)).collect(),
            market: MarketContext::from_metrics(&metrics),
            metrics,
            in_conservation_area: false,
            applications: vec![
                PlanningApplication::new("1", "Air source heat pump to side elevation")
                    .with_dates("2023-01-01", "2023-02-15"),
                PlanningApplication::new("2", "Ground source heat pump installation")
                    .with_dates("2023-03-01", "2023-03-31"),
                PlanningApplication::new("3", "ASHP unit in rear garden"),
                PlanningApplication::new("4", "Solar panels to rear roof")
                    .with_decision(Decision::Refused),
                PlanningApplication::new("5", "Rear conservatory"),
            ],
            settings: AnalysisSettings::default(),
        }
    }

    #[test]
    fn preserves_caller_order_and_totals() {
        let result = analyze(&input(&["solar", "heat_pump", "windows"], 30_000.0));
        let order: Vec<_> = result
            .improvements
            .iter()
            .map(|r| r.improvement_type.clone())
            .collect();
        assert_eq!(
            order,
            vec![
                ImprovementType::Solar,
                ImprovementType::HeatPump,
                ImprovementType::Windows
            ]
        );
        let cost_sum: f64 = result.improvements.iter().map(|r| r.estimated_cost).sum();
        let value_sum: f64 = result.improvements.iter().map(|r| r.value_increase).sum();
        assert!((result.total_cost - cost_sum).abs() < 1e-9);
        assert!((result.total_value_increase - value_sum).abs() < 1e-9);
        assert!((result.total_cost - (7_650.0 + 6_000.0 + 5_850.0)).abs() < 1e-9);
    }

    #[test]
    fn heat_pump_precedent_drives_high_feasibility() {
        let result = analyze(&input(&["heat_pump"], 10_000.0));
        let heat_pump = &result.improvements[0];
        assert_eq!(heat_pump.approved_examples, 3);
        assert_eq!(heat_pump.feasibility, FeasibilityRating::High);
        assert_eq!(heat_pump.average_time_days, Some(37.5));
        assert_eq!(heat_pump.examples.len(), 3);
        assert_eq!(result.high_feasibility_count, 1);
        assert!(result
            .summary
            .ends_with("1 improvement(s) have high feasibility based on local approvals."));
    }

    #[test]
    fn refused_precedent_does_not_count_as_approval() {
        let result = analyze(&input(&["solar"], 10_000.0));
        let solar = &result.improvements[0];
        assert_eq!(solar.matched_precedents, 1);
        assert_eq!(solar.approved_examples, 0);
        assert_eq!(solar.feasibility, FeasibilityRating::Low);
        assert!(solar.average_time_days.is_none());
    }

    #[test]
    fn average_time_covers_every_matched_decision() {
        let mut input = input(&["heat_pump"], 10_000.0);
        input.applications.push(
            PlanningApplication::new("6", "Air source heat pump on flat roof")
                .with_dates("2023-05-01", "2023-07-30")
                .with_decision(Decision::Refused),
        );
        let result = analyze(&input);
        let heat_pump = &result.improvements[0];
        assert_eq!(heat_pump.matched_precedents, 4);
        assert_eq!(heat_pump.approved_examples, 3);
        assert_eq!(heat_pump.average_time_days, Some(55.0));
    }

    #[test]
    fn no_matches_means_low_feasibility() {
        let result = analyze(&input(&["ev_charger"], 10_000.0));
        let charger = &result.improvements[0];
        assert_eq!(charger.approved_examples, 0);
        assert_eq!(charger.feasibility, FeasibilityRating::Low);
        assert!(charger.average_time_days.is_none());
        assert!(charger.examples.is_empty());
    }

    #[test]
    fn over_budget_summary_reports_excess() {
        let result = analyze(&input(&["insulation", "windows"], 10_000.0));
        assert!(!result.budget_status.within_budget);
        assert!((result.budget_status.excess - 5_750.0).abs() < 1e-9);
        assert!(result.summary.contains("exceeds budget by £5,750.00"));
    }

    #[test]
    fn compliance_picks_best_single_improvement() {
        let compliance = assess_compliance(
            EpcBand::E,
            &[ImprovementType::Solar, ImprovementType::HeatPump],
        );
        assert_eq!(compliance.projected_epc, EpcBand::C);
        assert_eq!(compliance.best_improvement, Some(ImprovementType::HeatPump));
        assert_eq!(compliance.combined_epc, EpcBand::B);
        assert_eq!(compliance.status, ComplianceStatus::OnTrack);
        assert!(compliance.suggested_improvements.is_empty());
    }

    #[test]
    fn off_track_suggests_unrequested_types() {
        let compliance = assess_compliance(EpcBand::G, &[ImprovementType::Solar]);
        assert_eq!(compliance.projected_epc, EpcBand::F);
        assert_eq!(compliance.status, ComplianceStatus::OffTrack);
        assert_eq!(compliance.suggested_improvements.len(), 7);
        assert!(!compliance
            .suggested_improvements
            .contains(&ImprovementType::Solar));
        assert_eq!(compliance.suggested_improvements[0], ImprovementType::Insulation);
    }

    #[test]
    fn compliance_can_be_disabled() {
        let mut request = input(&["solar"], 10_000.0);
        request.settings.include_compliance = false;
        assert!(analyze(&request).energy_compliance.is_none());
    }
}

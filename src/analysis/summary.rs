use crate::analysis::budget::BudgetStatus;
use crate::output::format_gbp;

pub struct SummaryFacts<'a> {
    pub property_reference: &'a str,
    pub improvement_count: usize,
    pub total_cost: f64,
    pub total_value_increase: f64,
    pub total_roi_percent: f64,
    pub budget: f64,
    pub budget_status: &'a BudgetStatus,
    pub high_feasibility_count: usize,
}

pub fn generate_summary(facts: &SummaryFacts<'_>) -> String {
    let mut summary = format!(
        "Analysis for {} improvements at {}. ",
        facts.improvement_count, facts.property_reference
    );
    summary.push_str(&format!(
        "Total estimated cost: {}. ",
        format_gbp(facts.total_cost)
    ));
    summary.push_str(&format!(
        "Projected value increase: {} ({:.1}% ROI). ",
        format_gbp(facts.total_value_increase),
        facts.total_roi_percent
    ));
    if facts.budget_status.within_budget {
        summary.push_str(&format!(
            "All improvements fit within budget of {} ({} remaining). ",
            format_gbp(facts.budget),
            format_gbp(facts.budget_status.remaining)
        ));
    } else {
        summary.push_str(&format!(
            "Total cost exceeds budget by {}. ",
            format_gbp(facts.budget_status.excess)
        ));
    }
    if facts.high_feasibility_count > 0 {
        summary.push_str(&format!(
            "{} improvement(s) have high feasibility based on local approvals.",
            facts.high_feasibility_count
        ));
    }
    summary.trim_end().to_string()
}

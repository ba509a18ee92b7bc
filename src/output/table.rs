use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::analysis::{AnalysisResult, ComplianceStatus, EnergyCompliance};
use crate::estimate::cost::rate_per_m2;
use crate::estimate::epc::band_delta;
use crate::estimate::savings::savings_fraction;
use crate::estimate::value::expected_band_jump;
use crate::estimate::FeasibilityRating;
use crate::improvement::{keywords_for, ImprovementType};
use crate::output::format_gbp;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn feasibility_cell(rating: FeasibilityRating) -> Cell {
    let color = match rating {
        FeasibilityRating::High => Color::Green,
        FeasibilityRating::Medium => Color::Yellow,
        FeasibilityRating::Low => Color::Red,
    };
    Cell::new(rating.to_string()).fg(color)
}

pub fn render_analysis_table(result: &AnalysisResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Improvement",
        "Feasibility",
        "Precedents",
        "Avg. Decision",
        "Cost",
        "Value Increase",
        "ROI",
        "Target EPC",
        "Bill Saving / yr",
    ]);

    for imp in &result.improvements {
        table.add_row(Row::from(vec![
            Cell::new(imp.improvement_type.to_string()),
            feasibility_cell(imp.feasibility),
            Cell::new(format!("{}/{}", imp.approved_examples, imp.matched_precedents)),
            Cell::new(
                imp.average_time_days
                    .map(|d| format!("{d:.0} days"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(format_gbp(imp.estimated_cost)),
            Cell::new(format_gbp(imp.value_increase)),
            Cell::new(format!("{:.1}%", imp.estimated_roi_percent)),
            Cell::new(imp.target_epc.to_string()),
            Cell::new(
                imp.energy_savings
                    .as_ref()
                    .map(|s| format_gbp(s.annual_bill_saving))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }

    let mut out = format!(
        "Property: {} {}\n",
        result.property_reference, result.location
    );
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\nTotal cost: {}  Value increase: {}  ROI: {:.1}%\n{}",
        format_gbp(result.total_cost),
        format_gbp(result.total_value_increase),
        result.total_roi_percent,
        result.budget_status.message
    ));

    let notes: Vec<String> = result
        .improvements
        .iter()
        .filter_map(|imp| {
            imp.feasibility_note
                .as_ref()
                .map(|note| format!("  {}: {note}", imp.improvement_type))
        })
        .collect();
    if !notes.is_empty() {
        out.push_str("\nNotes:\n");
        out.push_str(&notes.join("\n"));
    }

    if let Some(compliance) = &result.energy_compliance {
        out.push('\n');
        out.push_str(&render_compliance(compliance));
    }
    out.push_str(&format!("\n\n{}", result.summary));
    out
}

fn render_compliance(compliance: &EnergyCompliance) -> String {
    let status = match compliance.status {
        ComplianceStatus::OnTrack => "ON TRACK",
        ComplianceStatus::OffTrack => "OFF TRACK",
    };
    let best = compliance
        .best_improvement
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "EPC {} -> {} with {best} (all combined: {}), band C target {status}",
        compliance.current_epc, compliance.projected_epc, compliance.combined_epc
    );
    if !compliance.suggested_improvements.is_empty() {
        let suggestions = compliance
            .suggested_improvements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!("\nConsider also: {suggestions}"));
    }
    line
}

/// Reference table of the benchmark figures behind every known improvement.
pub fn render_improvements_catalog() -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Improvement",
        "Rate (£/m²)",
        "EPC Delta",
        "Static Band Jump",
        "Energy Saving",
        "Keywords",
    ]);
    for improvement in ImprovementType::KNOWN {
        table.add_row(vec![
            improvement.to_string(),
            format!("{:.0}", rate_per_m2(&improvement)),
            format!("{:+.1}", band_delta(&improvement)),
            expected_band_jump(&improvement).to_string(),
            format!("{:.0}%", savings_fraction(&improvement) * 100.0),
            keywords_for(&improvement).join(", "),
        ]);
    }
    table.to_string()
}

use anyhow::Result;

use crate::analysis::AnalysisResult;

pub fn analysis_to_csv(result: &AnalysisResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "property_reference",
        "improvement",
        "feasibility",
        "approved_precedents",
        "average_decision_days",
        "estimated_cost",
        "value_increase",
        "roi_percent",
        "target_epc",
        "value_source",
        "annual_bill_saving",
        "payback_years",
    ])?;
    for imp in &result.improvements {
        let savings = imp.energy_savings.as_ref();
        writer.write_record([
            result.property_reference.clone(),
            imp.improvement_type.to_string(),
            imp.feasibility.to_string(),
            imp.approved_examples.to_string(),
            imp.average_time_days
                .map(|d| format!("{d:.1}"))
                .unwrap_or_default(),
            format!("{:.2}", imp.estimated_cost),
            format!("{:.2}", imp.value_increase),
            format!("{:.1}", imp.estimated_roi_percent),
            imp.target_epc.to_string(),
            imp.value_source.as_str().to_string(),
            savings
                .map(|s| format!("{:.2}", s.annual_bill_saving))
                .unwrap_or_default(),
            savings
                .map(|s| format!("{:.1}", s.payback_years))
                .unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::AnalysisResult;

#[derive(Debug, Serialize)]
struct AnalysisEnvelope<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Pretty JSON for an analysis, stamped with the time it was rendered.
pub fn render_analysis_json(result: &AnalysisResult, generated_at: DateTime<Utc>) -> Result<String> {
    render_json(&AnalysisEnvelope {
        generated_at,
        result,
    })
}

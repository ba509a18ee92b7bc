use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::improvement::EpcBand;
use crate::types::{Coordinates, PlanningApplication, PropertyMetrics};

pub const DEFAULT_EXAMPLE_LIMIT: usize = 5;
const SECONDS_PER_DAY: i64 = 86_400;
const MISSING: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentExample {
    pub planning_reference: String,
    pub proposal: String,
    pub decision: String,
    pub decision_time_days: Option<i64>,
    pub application_date: Option<String>,
    pub decided_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub epc_rating: EpcBand,
}

pub fn average_decision_days(matches: &[&PlanningApplication]) -> Option<f64> {
    let durations: Vec<i64> = matches.iter().filter_map(|app| decision_days(app)).collect();
    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
}

pub fn top_examples(
    matches: &[&PlanningApplication],
    metrics: &PropertyMetrics,
    limit: usize,
) -> Vec<PrecedentExample> {
    matches
        .iter()
        .take(limit)
        .map(|app| {
            let point = app.geometry.as_deref().and_then(parse_point);
            PrecedentExample {
                planning_reference: app
                    .planning_reference
                    .clone()
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| MISSING.to_string()),
                proposal: if app.proposal.trim().is_empty() {
                    MISSING.to_string()
                } else {
                    app.proposal.clone()
                },
                decision: app.decision.to_string(),
                decision_time_days: decision_days(app),
                application_date: app.application_date.clone(),
                decided_date: app.decided_date.clone(),
                latitude: point.map(|p| p.latitude),
                longitude: point.map(|p| p.longitude),
                epc_rating: app.current_epc.unwrap_or(metrics.current_epc),
            }
        })
        .collect()
}

/// Whole days between application and decision, floored.
pub fn decision_days(app: &PlanningApplication) -> Option<i64> {
    let applied = parse_timestamp(app.application_date.as_deref()?)?;
    let decided = parse_timestamp(app.decided_date.as_deref()?)?;
    let seconds = (decided - applied).num_seconds();
    Some(seconds.div_euclid(SECONDS_PER_DAY))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses `POINT(<lon> <lat>)`.
pub fn parse_point(raw: &str) -> Option<Coordinates> {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    let body = upper.strip_prefix("POINT")?.trim();
    let inner = body.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let lon = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinates::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::{average_decision_days, decision_days, parse_point, top_examples};
    use crate::improvement::EpcBand;
    use crate::types::{PlanningApplication, PropertyMetrics};

    #[test]
    fn averages_only_parseable_durations() {
        let a = PlanningApplication::new("R/1", "solar").with_dates("2024-01-01", "2024-01-31");
        let b = PlanningApplication::new("R/2", "solar")
            .with_dates("2024-02-01T00:00:00Z", "2024-03-02T12:00:00Z");
        let c = PlanningApplication::new("R/3", "solar").with_dates("not a date", "2024-01-01");
        let d = PlanningApplication::new("R/4", "solar");
        let matches = vec![&a, &b, &c, &d];
        let avg = average_decision_days(&matches).expect("average");
        assert!((avg - 30.0).abs() < 1e-9);
    }

    #[test]
    fn average_is_none_without_dates() {
        let a = PlanningApplication::new("R/1", "solar");
        assert!(average_decision_days(&[&a]).is_none());
        assert!(average_decision_days(&[]).is_none());
    }

    #[test]
    fn negative_durations_floor_like_calendar_days() {
        let app = PlanningApplication::new("R/9", "x")
            .with_dates("2024-01-02T12:00:00Z", "2024-01-01T00:00:00Z");
        assert_eq!(decision_days(&app), Some(-2));
    }

    #[test]
    fn parses_point_geometry() {
        let point = parse_point("POINT(-0.1278 51.5074)").expect("point");
        assert!((point.longitude + 0.1278).abs() < 1e-9);
        assert!((point.latitude - 51.5074).abs() < 1e-9);
        assert!(parse_point("POLYGON((0 0, 1 1))").is_none());
        assert!(parse_point("POINT(abc)").is_none());
    }

    #[test]
    fn examples_keep_order_limit_and_epc_fallback() {
        let metrics = PropertyMetrics {
            current_epc: EpcBand::E,
            ..PropertyMetrics::default()
        };
        let apps: Vec<PlanningApplication> = (0..7)
            .map(|i| PlanningApplication::new(format!("REF/{i}"), "heat pump"))
            .collect();
        let mut apps = apps;
        apps[0] = apps[0]
            .clone()
            .with_epc(EpcBand::B)
            .with_geometry("POINT(-2.24 53.48)")
            .with_dates("2023-05-01", "2023-06-10");
        let refs: Vec<&PlanningApplication> = apps.iter().collect();
        let examples = top_examples(&refs, &metrics, 5);
        assert_eq!(examples.len(), 5);
        assert_eq!(examples[0].planning_reference, "REF/0");
        assert_eq!(examples[0].epc_rating, EpcBand::B);
        assert_eq!(examples[0].decision_time_days, Some(40));
        assert_eq!(examples[0].latitude, Some(53.48));
        assert_eq!(examples[1].epc_rating, EpcBand::E);
        assert_eq!(examples[1].latitude, None);
        assert_eq!(examples[4].planning_reference, "REF/4");
    }
}

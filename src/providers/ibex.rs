use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::improvement::EpcBand;
use crate::providers::http::{candidate_object_arrays, post_json, string_from_paths};
use crate::providers::{PlanningPrecedentProvider, PrecedentQuery};
use crate::types::{Decision, PlanningApplication};

const SRID_WGS84: u32 = 4326;
const PAGE_SIZE: u32 = 1000;
const APPLICATION_TYPES: [&str; 2] = [
    "full planning application",
    "householder planning application",
];
const RESULT_KEYS: &[&str] = &["data", "results", "applications", "items"];

/// IBex planning application search.
#[derive(Debug, Clone)]
pub struct IbexClient {
    base_url: String,
    api_key: String,
}

impl IbexClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        }
    }
}

#[async_trait]
impl PlanningPrecedentProvider for IbexClient {
    fn name(&self) -> &str {
        "ibex"
    }

    async fn search(&self, query: &PrecedentQuery) -> Result<Vec<PlanningApplication>> {
        if self.api_key.is_empty() {
            bail!("IBex API key is not configured");
        }
        let url = format!("{}/search", self.base_url);
        let payload = build_search_payload(query);
        debug!(%url, radius = query.radius_m, "searching planning applications");
        let response = post_json(&url, &self.api_key, &payload).await?;
        let applications = parse_applications(&response);
        info!(
            location = %query.location,
            found = applications.len(),
            "planning precedent search complete"
        );
        Ok(applications)
    }
}

pub fn build_search_payload(query: &PrecedentQuery) -> Value {
    json!({
        "input": {
            "srid": SRID_WGS84,
            "coordinates": [query.location.longitude, query.location.latitude],
            "radius": query.radius_m,
            "date_from": query.date_from.format("%Y-%m-%d").to_string(),
            "date_to": query.date_to.format("%Y-%m-%d").to_string(),
            "date_range_type": "validated",
            "page": 1,
            "page_size": PAGE_SIZE,
        },
        "extensions": {
            "appeals": true,
            "centre_point": true,
            "heading": true,
            "project_type": true,
            "num_new_houses": true,
            "document_metadata": true,
            "proposed_unit_mix": true,
            "proposed_floor_area": true,
            "num_comments_received": true,
        },
        "filters": {
            "normalised_decision": query.decision_filter,
            "normalised_application_type": APPLICATION_TYPES,
        },
    })
}

pub fn parse_applications(payload: &Value) -> Vec<PlanningApplication> {
    candidate_object_arrays(payload, RESULT_KEYS)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .map(application_from_object)
        .collect()
}

fn application_from_object(object: &Map<String, Value>) -> PlanningApplication {
    let decision = string_from_paths(object, &["normalised_decision", "decision"])
        .map(Decision::from)
        .unwrap_or(Decision::Pending);
    PlanningApplication {
        planning_reference: string_from_paths(object, &["planning_reference", "reference"]),
        proposal: string_from_paths(object, &["proposal", "heading"]).unwrap_or_default(),
        decision,
        application_date: string_from_paths(object, &["application_date"]),
        decided_date: string_from_paths(object, &["decided_date"]),
        geometry: string_from_paths(object, &["centre_point", "geometry"]),
        current_epc: string_from_paths(object, &["current_epc", "epc_rating"])
            .and_then(|raw| raw.parse::<EpcBand>().ok()),
    }
}

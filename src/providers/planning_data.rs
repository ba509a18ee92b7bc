use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::providers::http::{candidate_object_arrays, client, number_from_paths, send_json};
use crate::providers::ConservationAreaProvider;
use crate::types::Coordinates;

const DATASET: &str = "conservation-area";

/// planning.data.gov.uk entity lookup for conservation-area boundaries.
#[derive(Debug, Clone)]
pub struct PlanningDataClient {
    base_url: String,
}

impl PlanningDataClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ConservationAreaProvider for PlanningDataClient {
    fn name(&self) -> &str {
        "planning.data.gov.uk"
    }

    async fn contains(&self, location: Coordinates) -> Result<bool> {
        let url = format!("{}/entity.json", self.base_url);
        let request = client().get(&url).query(&[
            ("dataset", DATASET.to_string()),
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("limit", "1".to_string()),
        ]);
        let payload = send_json(request, &url).await?;
        let inside = parse_contains(&payload);
        debug!(%location, inside, "conservation area lookup");
        Ok(inside)
    }
}

pub fn parse_contains(payload: &Value) -> bool {
    if let Some(count) = payload
        .as_object()
        .and_then(|object| number_from_paths(object, &["count"]))
    {
        return count > 0.0;
    }
    candidate_object_arrays(payload, &["entities"])
        .iter()
        .any(|entities| !entities.is_empty())
}

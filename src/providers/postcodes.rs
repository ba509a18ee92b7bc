use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::providers::http::{fetch_json, number_from_paths};
use crate::providers::GeocodeProvider;
use crate::types::Coordinates;

static FULL_POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").expect("static regex must compile")
});
static EMBEDDED_POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Z]{1,2}[0-9][A-Z0-9]?) ?([0-9][A-Z]{2})\b")
        .expect("static regex must compile")
});

pub fn is_postcode(text: &str) -> bool {
    FULL_POSTCODE.is_match(text.trim())
}

/// Finds the first UK postcode in free text and returns it upper-cased with a
/// single space before the inward code.
pub fn extract_postcode(text: &str) -> Option<String> {
    let captures = EMBEDDED_POSTCODE.captures(text)?;
    Some(format!(
        "{} {}",
        captures[1].to_ascii_uppercase(),
        captures[2].to_ascii_uppercase()
    ))
}

#[derive(Debug, Clone)]
pub struct PostcodesIoClient {
    base_url: String,
}

impl PostcodesIoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for PostcodesIoClient {
    fn name(&self) -> &str {
        "postcodes.io"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Coordinates>> {
        let compact: String = query.split_whitespace().collect();
        if !is_postcode(&compact) {
            debug!(query, "not a postcode, skipping postcodes.io");
            return Ok(None);
        }
        let url = format!("{}/postcodes/{}", self.base_url, compact);
        let payload = fetch_json(&url).await?;
        let coordinates = parse_postcode_response(&payload);
        debug!(postcode = %compact, ?coordinates, "geocoded postcode");
        Ok(coordinates)
    }
}

pub fn parse_postcode_response(payload: &Value) -> Option<Coordinates> {
    let object = payload.as_object()?;
    let latitude = number_from_paths(object, &["result.latitude"])?;
    let longitude = number_from_paths(object, &["result.longitude"])?;
    Some(Coordinates::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{extract_postcode, is_postcode, parse_postcode_response, PostcodesIoClient};
    use crate::providers::GeocodeProvider;

    #[test]
    fn recognises_postcode_shapes() {
        assert!(is_postcode("SW1A 1AA"));
        assert!(is_postcode("m11ae"));
        assert!(is_postcode("EC1A1BB"));
        assert!(!is_postcode("UPRN100023336956"));
        assert!(!is_postcode("10 Downing Street"));
    }

    #[test]
    fn extracts_postcode_from_address() {
        assert_eq!(
            extract_postcode("10 Downing Street, London sw1a2aa"),
            Some("SW1A 2AA".to_string())
        );
        assert_eq!(extract_postcode("Flat 3, Oxford Road"), None);
    }

    #[test]
    fn parses_result_coordinates() {
        let payload = json!({
            "status": 200,
            "result": { "postcode": "SW1A 1AA", "latitude": 51.501009, "longitude": -0.141588 }
        });
        let coords = parse_postcode_response(&payload).expect("coordinates");
        assert!((coords.latitude - 51.501009).abs() < 1e-9);
        assert!((coords.longitude + 0.141588).abs() < 1e-9);
        assert!(parse_postcode_response(&json!({ "status": 404, "result": null })).is_none());
    }

    #[tokio::test]
    async fn free_text_address_is_left_unresolved() {
        let client = PostcodesIoClient::new("http://127.0.0.1:9");
        let resolved = client
            .resolve("10 Downing Street, London")
            .await
            .expect("no request is made");
        assert!(resolved.is_none());
    }
}

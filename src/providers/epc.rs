use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::improvement::EpcBand;
use crate::providers::http::{
    candidate_object_arrays, client, number_from_paths, send_json, string_from_paths,
};
use crate::providers::land_registry::LandRegistryClient;
use crate::providers::PropertyDataProvider;
use crate::types::{
    EpcRecommendation, MarketContext, PropertyMetrics, DEFAULT_BUILT_FORM, DEFAULT_FLOOR_AREA_M2,
    DEFAULT_PROPERTY_TYPE,
};

const ROW_KEYS: &[&str] = &["rows"];

/// Open Data Communities domestic EPC register.
#[derive(Debug, Clone)]
pub struct EpcClient {
    base_url: String,
    api_key: String,
}

impl EpcClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    fn authorized(&self, url: &str) -> Result<reqwest::RequestBuilder> {
        if self.api_key.is_empty() {
            bail!("EPC API key is not configured");
        }
        Ok(client()
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.api_key)))
    }

    /// Most relevant certificate for an address and/or postcode.
    pub async fn latest_certificate(
        &self,
        address: Option<&str>,
        postcode: Option<&str>,
    ) -> Result<Option<PropertyMetrics>> {
        let url = format!("{}/domestic/search", self.base_url);
        let mut params = vec![("size", "1")];
        if let Some(address) = address {
            params.push(("address", address));
        }
        if let Some(postcode) = postcode {
            params.push(("postcode", postcode));
        }
        if params.len() == 1 {
            bail!("EPC search needs an address or postcode");
        }
        let payload = send_json(self.authorized(&url)?.query(&params), &url).await?;
        Ok(parse_certificate(&payload))
    }

    pub async fn recommendations(
        &self,
        certificate_key: &str,
        potential_band: Option<EpcBand>,
    ) -> Result<Vec<EpcRecommendation>> {
        let url = format!("{}/domestic/recommendations/{}", self.base_url, certificate_key);
        let payload = send_json(self.authorized(&url)?, &url).await?;
        Ok(parse_recommendations(&payload, potential_band))
    }
}

pub fn parse_certificate(payload: &Value) -> Option<PropertyMetrics> {
    let row = candidate_object_arrays(payload, ROW_KEYS)
        .into_iter()
        .flatten()
        .find_map(Value::as_object)?;
    Some(metrics_from_row(row))
}

fn metrics_from_row(row: &Map<String, Value>) -> PropertyMetrics {
    let floor_area_m2 = number_from_paths(row, &["total-floor-area"])
        .filter(|area| *area > 0.0)
        .unwrap_or(DEFAULT_FLOOR_AREA_M2);
    let band = |key: &str| -> Option<EpcBand> {
        string_from_paths(row, &[key]).and_then(|raw| raw.parse().ok())
    };
    PropertyMetrics {
        floor_area_m2,
        current_epc: band("current-energy-rating").unwrap_or_default(),
        property_type: string_from_paths(row, &["property-type"])
            .unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string()),
        built_form: string_from_paths(row, &["built-form"])
            .unwrap_or_else(|| DEFAULT_BUILT_FORM.to_string()),
        co2_emissions_tonnes: number_from_paths(row, &["co2-emissions-current"]),
        energy_consumption_kwh_m2: number_from_paths(row, &["energy-consumption-current"]),
        certificate_key: string_from_paths(row, &["lmk-key"]),
        potential_epc: band("potential-energy-rating"),
    }
}

/// The register does not band individual recommendations, so each one
/// carries the certificate's potential rating.
pub fn parse_recommendations(
    payload: &Value,
    potential_band: Option<EpcBand>,
) -> Vec<EpcRecommendation> {
    candidate_object_arrays(payload, ROW_KEYS)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let improvement_item = string_from_paths(
                row,
                &["improvement-summary-text", "improvement-descr-text", "improvement-id-text"],
            )?;
            Some(EpcRecommendation {
                improvement_item,
                potential_band,
                indicative_cost: string_from_paths(row, &["indicative-cost"]),
            })
        })
        .collect()
}

/// Property data composed from the EPC register and Land Registry sales.
#[derive(Debug, Clone)]
pub struct OpenDataPropertyProvider {
    epc: EpcClient,
    land_registry: LandRegistryClient,
}

impl OpenDataPropertyProvider {
    pub fn new(epc: EpcClient, land_registry: LandRegistryClient) -> Self {
        Self { epc, land_registry }
    }
}

#[async_trait]
impl PropertyDataProvider for OpenDataPropertyProvider {
    fn name(&self) -> &str {
        "epc+land-registry"
    }

    async fn metrics(
        &self,
        address: Option<&str>,
        postcode: Option<&str>,
    ) -> Result<PropertyMetrics> {
        let metrics = self
            .epc
            .latest_certificate(address, postcode)
            .await?
            .ok_or_else(|| anyhow!("no EPC certificate found"))?;
        debug!(
            floor_area = metrics.floor_area_m2,
            epc = %metrics.current_epc,
            certificate = ?metrics.certificate_key,
            "fetched EPC certificate"
        );
        Ok(metrics)
    }

    async fn market_context(
        &self,
        _address: Option<&str>,
        postcode: Option<&str>,
        metrics: &PropertyMetrics,
    ) -> Result<MarketContext> {
        let mut context = MarketContext::from_metrics(metrics);

        if let Some(key) = metrics.certificate_key.as_deref() {
            match self.epc.recommendations(key, metrics.potential_epc).await {
                Ok(recommendations) => context.recommendations = recommendations,
                Err(err) => warn!(error = %err, "EPC recommendations unavailable"),
            }
        }
        if let Some(postcode) = postcode {
            match self.land_registry.average_price(postcode).await {
                Ok(value) => context.property_value = value,
                Err(err) => warn!(error = %err, postcode, "Land Registry lookup failed"),
            }
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_certificate, parse_recommendations};
    use crate::improvement::EpcBand;

    #[test]
    fn parses_first_certificate_row() {
        let payload = json!({
            "column-names": ["lmk-key"],
            "rows": [{
                "lmk-key": "abc123",
                "total-floor-area": "104.5",
                "current-energy-rating": "E",
                "potential-energy-rating": "B",
                "property-type": "Flat",
                "built-form": "Mid-Terrace",
                "co2-emissions-current": "3.1",
                "energy-consumption-current": "240"
            }]
        });
        let metrics = parse_certificate(&payload).expect("certificate");
        assert_eq!(metrics.floor_area_m2, 104.5);
        assert_eq!(metrics.current_epc, EpcBand::E);
        assert_eq!(metrics.potential_epc, Some(EpcBand::B));
        assert_eq!(metrics.property_type, "Flat");
        assert_eq!(metrics.co2_emissions_tonnes, Some(3.1));
        assert_eq!(metrics.energy_consumption_kwh_m2, Some(240.0));
        assert_eq!(metrics.certificate_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let payload = json!({ "rows": [{ "current-energy-rating": "??" }] });
        let metrics = parse_certificate(&payload).expect("certificate");
        assert_eq!(metrics.floor_area_m2, 90.0);
        assert_eq!(metrics.current_epc, EpcBand::D);
        assert_eq!(metrics.built_form, "Semi-Detached");
        assert!(parse_certificate(&json!({ "rows": [] })).is_none());
    }

    #[test]
    fn recommendations_carry_potential_band() {
        let payload = json!({
            "rows": [
                { "improvement-summary-text": "Solar photovoltaic panels", "indicative-cost": "£3,500 - £5,500" },
                { "improvement-descr-text": "Increase loft insulation to 270 mm" },
                { "improvement-id": "5" }
            ]
        });
        let recs = parse_recommendations(&payload, Some(EpcBand::C));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].improvement_item, "Solar photovoltaic panels");
        assert_eq!(recs[0].indicative_cost.as_deref(), Some("£3,500 - £5,500"));
        assert_eq!(recs[1].potential_band, Some(EpcBand::C));
    }
}

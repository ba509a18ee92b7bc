use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::providers::http::{candidate_object_arrays, client, number_from_paths, send_json};

const PAGE_SIZE: &str = "50";

/// HM Land Registry price paid data, linked-data JSON API.
#[derive(Debug, Clone)]
pub struct LandRegistryClient {
    base_url: String,
}

impl LandRegistryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mean price paid across recent sales in the postcode, `None` when there
    /// are no recorded sales.
    pub async fn average_price(&self, postcode: &str) -> Result<Option<f64>> {
        let url = format!("{}/data/ppi/transaction-record.json", self.base_url);
        let request = client().get(&url).query(&[
            ("propertyAddress.postcode", postcode.trim().to_ascii_uppercase().as_str()),
            ("_pageSize", PAGE_SIZE),
        ]);
        let payload = send_json(request, &url).await?;
        let average = parse_average_price(&payload);
        debug!(postcode, ?average, "land registry average price");
        Ok(average)
    }
}

pub fn parse_average_price(payload: &Value) -> Option<f64> {
    let prices: Vec<f64> = candidate_object_arrays(payload, &["result", "items"])
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|item| number_from_paths(item, &["pricePaid"]))
        .filter(|price| *price > 0.0)
        .collect();
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_average_price;

    #[test]
    fn averages_price_paid_items() {
        let payload = json!({
            "result": {
                "items": [
                    { "pricePaid": 300000, "transactionDate": "2023-05-01" },
                    { "pricePaid": 450000 },
                    { "pricePaid": 0 },
                    { "transactionDate": "2022-01-01" }
                ]
            }
        });
        assert_eq!(parse_average_price(&payload), Some(375_000.0));
    }

    #[test]
    fn no_sales_means_no_value() {
        assert!(parse_average_price(&json!({ "result": { "items": [] } })).is_none());
        assert!(parse_average_price(&json!(null)).is_none());
    }
}

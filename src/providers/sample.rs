use anyhow::Result;
use async_trait::async_trait;

use crate::improvement::EpcBand;
use crate::providers::{
    extract_postcode, ConservationAreaProvider, GeocodeProvider, PlanningPrecedentProvider,
    PrecedentQuery, PropertyDataProvider,
};
use crate::types::{
    Coordinates, Decision, EpcRecommendation, MarketContext, PlanningApplication, PropertyMetrics,
};

const CENTRAL_LONDON: (f64, f64) = (51.5074, -0.1278);

const KNOWN_POSTCODES: [(&str, f64, f64); 4] = [
    ("SW1A 1AA", 51.501009, -0.141588),
    ("NW1 7AA", 51.5465, -0.1436),
    ("M1 1AE", 53.4808, -2.2426),
    ("EH1 1YZ", 55.9521, -3.1899),
];

/// Fixed offline data for demos and tests. Every lookup succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleProviders;

#[async_trait]
impl GeocodeProvider for SampleProviders {
    fn name(&self) -> &str {
        "sample"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Coordinates>> {
        let Some(normalized) = extract_postcode(query) else {
            return Ok(None);
        };
        let (lat, lon) = KNOWN_POSTCODES
            .iter()
            .find(|(known, _, _)| *known == normalized)
            .map(|(_, lat, lon)| (*lat, *lon))
            .unwrap_or(CENTRAL_LONDON);
        Ok(Some(Coordinates::new(lat, lon)))
    }
}

#[async_trait]
impl PropertyDataProvider for SampleProviders {
    fn name(&self) -> &str {
        "sample"
    }

    async fn metrics(
        &self,
        _address: Option<&str>,
        _postcode: Option<&str>,
    ) -> Result<PropertyMetrics> {
        Ok(PropertyMetrics {
            floor_area_m2: 92.0,
            current_epc: EpcBand::D,
            property_type: "House".to_string(),
            built_form: "Semi-Detached".to_string(),
            co2_emissions_tonnes: Some(3.4),
            energy_consumption_kwh_m2: Some(260.0),
            certificate_key: Some("sample-certificate-0001".to_string()),
            potential_epc: Some(EpcBand::B),
        })
    }

    async fn market_context(
        &self,
        _address: Option<&str>,
        _postcode: Option<&str>,
        metrics: &PropertyMetrics,
    ) -> Result<MarketContext> {
        Ok(MarketContext {
            current_epc: metrics.current_epc,
            property_value: Some(412_000.0),
            recommendations: vec![
                EpcRecommendation {
                    improvement_item: "Increase loft insulation to 270 mm".to_string(),
                    potential_band: Some(EpcBand::C),
                    indicative_cost: Some("£100 - £350".to_string()),
                },
                EpcRecommendation {
                    improvement_item: "Solar photovoltaic panels, 2.5 kWp".to_string(),
                    potential_band: Some(EpcBand::B),
                    indicative_cost: Some("£3,500 - £5,500".to_string()),
                },
            ],
        })
    }
}

#[async_trait]
impl PlanningPrecedentProvider for SampleProviders {
    fn name(&self) -> &str {
        "sample"
    }

    async fn search(&self, query: &PrecedentQuery) -> Result<Vec<PlanningApplication>> {
        let applications = sample_applications()
            .into_iter()
            .filter(|app| {
                query.decision_filter.is_empty()
                    || query
                        .decision_filter
                        .iter()
                        .any(|wanted| Decision::from(wanted.clone()) == app.decision)
            })
            .collect();
        Ok(applications)
    }
}

#[async_trait]
impl ConservationAreaProvider for SampleProviders {
    fn name(&self) -> &str {
        "sample"
    }

    async fn contains(&self, _location: Coordinates) -> Result<bool> {
        Ok(false)
    }
}

fn sample_applications() -> Vec<PlanningApplication> {
    vec![
        PlanningApplication::new(
            "2023/0412/P",
            "Installation of air source heat pump to rear garden",
        )
        .with_dates("2023-02-01T00:00:00Z", "2023-03-20T00:00:00Z")
        .with_geometry("POINT(-0.1431 51.5462)")
        .with_epc(EpcBand::D),
        PlanningApplication::new(
            "2023/1877/P",
            "Installation of solar PV panels to rear roof slope",
        )
        .with_dates("2023-06-12T00:00:00Z", "2023-08-01T00:00:00Z")
        .with_geometry("POINT(-0.1440 51.5470)"),
        PlanningApplication::new(
            "2022/5530/P",
            "Replacement of single glazed timber sash windows with double glazed units",
        )
        .with_dates("2022-11-03T00:00:00Z", "2023-01-09T00:00:00Z")
        .with_epc(EpcBand::E),
        PlanningApplication::new("2024/0098/P", "External wall insulation and render to flank wall")
            .with_dates("2024-01-15T00:00:00Z", "2024-03-04T00:00:00Z"),
        PlanningApplication::new("2024/0720/P", "Ground source heat pump and associated plant")
            .with_dates("2024-03-02T00:00:00Z", "2024-04-30T00:00:00Z"),
        PlanningApplication::new("2024/1301/P", "Erection of rear dormer roof extension")
            .with_dates("2024-05-20T00:00:00Z", "2024-07-01T00:00:00Z"),
        PlanningApplication::new("2022/3004/P", "Installation of photovoltaic array on garage roof")
            .with_dates("2022-08-08T00:00:00Z", "2022-09-30T00:00:00Z"),
        PlanningApplication::new("2024/2210/P", "ASHP unit to side passage")
            .with_dates("2024-08-01T00:00:00Z", "2024-09-12T00:00:00Z"),
        PlanningApplication::new("2023/2999/P", "Solar panels to front roof slope")
            .with_decision(Decision::Refused),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::SampleProviders;
    use crate::providers::{
        ConservationAreaProvider, GeocodeProvider, PlanningPrecedentProvider, PrecedentQuery,
    };
    use crate::types::Coordinates;

    #[tokio::test]
    async fn geocodes_known_and_unknown_postcodes() {
        let sample = SampleProviders;
        let known = sample.resolve("sw1a 1aa").await.expect("resolve");
        assert_eq!(known, Some(Coordinates::new(51.501009, -0.141588)));
        let fallback = sample.resolve("B1 1BB").await.expect("resolve");
        assert_eq!(fallback, Some(Coordinates::new(51.5074, -0.1278)));
        assert!(sample.resolve("not a postcode").await.expect("resolve").is_none());
    }

    #[tokio::test]
    async fn search_honours_decision_filter() {
        let query = PrecedentQuery {
            location: Coordinates::new(51.5465, -0.1436),
            radius_m: 500,
            date_from: NaiveDate::from_ymd_opt(2022, 1, 1).expect("date"),
            date_to: NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"),
            decision_filter: vec!["Approved".to_string()],
        };
        let approved = SampleProviders.search(&query).await.expect("search");
        assert_eq!(approved.len(), 8);
        assert!(approved.iter().all(|app| app.is_approved()));
    }

    #[test]
    fn never_reports_conservation_area() {
        let inside = tokio_test::block_on(
            SampleProviders.contains(Coordinates::new(51.501009, -0.141588)),
        )
        .expect("contains");
        assert!(!inside);
    }
}

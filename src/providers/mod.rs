pub mod defaults;
pub mod epc;
pub mod http;
pub mod ibex;
pub mod land_registry;
pub mod planning_data;
pub mod postcodes;
pub mod sample;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ProvidersConfig;
use crate::providers::epc::EpcClient;
use crate::providers::ibex::IbexClient;
use crate::providers::land_registry::LandRegistryClient;
use crate::providers::planning_data::PlanningDataClient;
use crate::providers::postcodes::PostcodesIoClient;
use crate::providers::sample::SampleProviders;
use crate::types::{Coordinates, MarketContext, PlanningApplication, PropertyMetrics};

pub use epc::OpenDataPropertyProvider;
pub use postcodes::{extract_postcode, is_postcode};

/// Parameters of a planning precedent search around a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentQuery {
    pub location: Coordinates,
    pub radius_m: u32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub decision_filter: Vec<String>,
}

#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    fn name(&self) -> &str;
    /// Takes a postcode or free-text address. `Ok(None)` when the provider
    /// cannot place it.
    async fn resolve(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[async_trait]
pub trait PropertyDataProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn metrics(&self, address: Option<&str>, postcode: Option<&str>)
        -> Result<PropertyMetrics>;
    async fn market_context(
        &self,
        address: Option<&str>,
        postcode: Option<&str>,
        metrics: &PropertyMetrics,
    ) -> Result<MarketContext>;
}

#[async_trait]
pub trait PlanningPrecedentProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: &PrecedentQuery) -> Result<Vec<PlanningApplication>>;
}

#[async_trait]
pub trait ConservationAreaProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn contains(&self, location: Coordinates) -> Result<bool>;
}

#[derive(Clone)]
pub struct ProviderSet {
    pub geocoder: Arc<dyn GeocodeProvider>,
    pub property: Arc<dyn PropertyDataProvider>,
    pub planning: Arc<dyn PlanningPrecedentProvider>,
    pub conservation: Arc<dyn ConservationAreaProvider>,
}

impl ProviderSet {
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let property = OpenDataPropertyProvider::new(
            EpcClient::new(&config.epc_url, &config.epc_api_key),
            LandRegistryClient::new(&config.land_registry_url),
        );
        Self {
            geocoder: Arc::new(PostcodesIoClient::new(&config.postcodes_url)),
            property: Arc::new(property),
            planning: Arc::new(IbexClient::new(&config.ibex_url, &config.ibex_api_key)),
            conservation: Arc::new(PlanningDataClient::new(&config.planning_data_url)),
        }
    }

    /// Deterministic offline data, no network access.
    pub fn sample() -> Self {
        let sample = Arc::new(SampleProviders);
        Self {
            geocoder: sample.clone(),
            property: sample.clone(),
            planning: sample.clone(),
            conservation: sample,
        }
    }

    pub fn names(&self) -> [&str; 4] {
        [
            self.geocoder.name(),
            self.property.name(),
            self.planning.name(),
            self.conservation.name(),
        ]
    }
}

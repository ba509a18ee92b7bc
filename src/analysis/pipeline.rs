use std::future::Future;
use std::time::Duration;

use chrono::{Days, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::aggregator::{analyze, AnalysisInput, AnalysisSettings};
use crate::analysis::AnalysisResult;
use crate::config::{Config, SearchConfig};
use crate::error::AnalysisError;
use crate::improvement::ImprovementType;
use crate::providers::{defaults, extract_postcode, PrecedentQuery, ProviderSet};
use crate::types::Coordinates;

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const DAYS_PER_YEAR: u64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Postcode, UPRN or any caller reference for the property.
    pub property_reference: String,
    pub address: Option<String>,
    pub budget: f64,
    pub improvements: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Skips the conservation-area lookup when set.
    pub conservation_area: Option<bool>,
    /// Overrides the configured compliance toggle when set.
    pub include_compliance: Option<bool>,
}

impl AnalysisRequest {
    pub fn new<I, S>(property_reference: impl Into<String>, budget: f64, improvements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            property_reference: property_reference.into(),
            address: None,
            budget,
            improvements: improvements.into_iter().map(Into::into).collect(),
            latitude: None,
            longitude: None,
            conservation_area: None,
            include_compliance: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_conservation_area(mut self, inside: bool) -> Self {
        self.conservation_area = Some(inside);
        self
    }

    /// Postcode taken from the reference itself, else found in the reference
    /// or address text.
    pub fn postcode(&self) -> Option<String> {
        extract_postcode(&self.property_reference)
            .or_else(|| self.address.as_deref().and_then(extract_postcode))
    }

    fn explicit_location(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    fn parsed_improvements(&self) -> Vec<ImprovementType> {
        self.improvements
            .iter()
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(ImprovementType::parse)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub radius_m: u32,
    pub years_back: u32,
    pub decision_filter: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(value: &SearchConfig) -> Self {
        Self {
            radius_m: value.radius_m,
            years_back: value.years_back,
            decision_filter: value.decision_filter.clone(),
        }
    }
}

/// Gathers external data for a request and runs the aggregation. Calls are
/// made one at a time; any provider failure degrades to its default.
#[derive(Clone)]
pub struct RetrofitAnalyzer {
    providers: ProviderSet,
    settings: AnalysisSettings,
    search: SearchSettings,
    timeout: Duration,
}

impl RetrofitAnalyzer {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            settings: AnalysisSettings::default(),
            search: SearchSettings::default(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn from_config(providers: ProviderSet, config: &Config) -> Self {
        Self {
            providers,
            settings: config.analysis_settings(),
            search: SearchSettings::from(&config.search),
            timeout: config.provider_timeout(),
        }
    }

    pub fn with_settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_search(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if !request.budget.is_finite() || request.budget < 0.0 {
            return Err(AnalysisError::InvalidRequest(format!(
                "budget must be a non-negative amount, got {}",
                request.budget
            )));
        }
        let improvements = request.parsed_improvements();
        if improvements.is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "at least one improvement type is required".to_string(),
            ));
        }

        let postcode = request.postcode();
        let location = self.resolve_location(request, postcode.as_deref()).await?;
        info!(
            reference = %request.property_reference,
            %location,
            improvements = improvements.len(),
            budget = request.budget,
            providers = ?self.providers.names(),
            "starting retrofit analysis"
        );

        let address = request.address.as_deref();
        let property = &self.providers.property;
        let metrics = self
            .bounded(
                "property metrics",
                property.name(),
                property.metrics(address, postcode.as_deref()),
            )
            .await
            .unwrap_or_else(defaults::property_metrics);
        let market = self
            .bounded(
                "market context",
                property.name(),
                property.market_context(address, postcode.as_deref(), &metrics),
            )
            .await
            .unwrap_or_else(|| defaults::market_context(&metrics));

        let in_conservation_area = match request.conservation_area {
            Some(flag) => flag,
            None => {
                let conservation = &self.providers.conservation;
                self.bounded(
                    "conservation area lookup",
                    conservation.name(),
                    conservation.contains(location),
                )
                .await
                .unwrap_or(defaults::IN_CONSERVATION_AREA)
            }
        };

        let query = self.precedent_query(location);
        let planning = &self.providers.planning;
        let applications = self
            .bounded("planning search", planning.name(), planning.search(&query))
            .await
            .unwrap_or_else(defaults::planning_applications);
        info!(
            applications = applications.len(),
            in_conservation_area,
            epc = %market.current_epc,
            "external data gathered"
        );

        let mut settings = self.settings.clone();
        if let Some(include) = request.include_compliance {
            settings.include_compliance = include;
        }
        let input = AnalysisInput {
            property_reference: request.property_reference.clone(),
            location,
            budget: request.budget,
            improvements,
            metrics,
            market,
            in_conservation_area,
            applications,
            settings,
        };
        Ok(analyze(&input))
    }

    async fn resolve_location(
        &self,
        request: &AnalysisRequest,
        postcode: Option<&str>,
    ) -> Result<Coordinates, AnalysisError> {
        if let Some(location) = request.explicit_location() {
            return Ok(location);
        }
        let unresolvable = || AnalysisError::UnresolvableLocation {
            reference: request.property_reference.clone(),
        };
        let query = postcode
            .or(request.address.as_deref())
            .unwrap_or(request.property_reference.as_str())
            .trim();
        if query.is_empty() {
            return Err(unresolvable());
        }
        let geocoder = &self.providers.geocoder;
        self.bounded("geocoding", geocoder.name(), geocoder.resolve(query))
            .await
            .flatten()
            .ok_or_else(unresolvable)
    }

    fn precedent_query(&self, location: Coordinates) -> PrecedentQuery {
        let date_to = Utc::now().date_naive();
        let lookback = Days::new(DAYS_PER_YEAR * u64::from(self.search.years_back));
        let date_from = date_to.checked_sub_days(lookback).unwrap_or(date_to);
        PrecedentQuery {
            location,
            radius_m: self.search.radius_m,
            date_from,
            date_to,
            decision_filter: self.search.decision_filter.clone(),
        }
    }

    /// Runs one provider call under the configured timeout; `None` means the
    /// caller should use the default.
    async fn bounded<T, F>(&self, what: &str, provider: &str, call: F) -> Option<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(provider, error = %err, "{what} failed, using default");
                None
            }
            Err(_) => {
                warn!(
                    provider,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "{what} timed out, using default"
                );
                None
            }
        }
    }
}

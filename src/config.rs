use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisSettings;
use crate::matching::MatchOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_postcodes_url")]
    pub postcodes_url: String,
    #[serde(default = "default_epc_url")]
    pub epc_url: String,
    #[serde(default)]
    pub epc_api_key: String,
    #[serde(default = "default_land_registry_url")]
    pub land_registry_url: String,
    #[serde(default = "default_ibex_url")]
    pub ibex_url: String,
    #[serde(default)]
    pub ibex_api_key: String,
    #[serde(default = "default_planning_data_url")]
    pub planning_data_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default = "default_years_back")]
    pub years_back: u32,
    #[serde(default = "default_decision_filter")]
    pub decision_filter: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_true")]
    pub fuzzy_matching: bool,
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    #[serde(default = "default_example_limit")]
    pub example_limit: usize,
    #[serde(default = "default_fallback_property_value")]
    pub fallback_property_value: f64,
    #[serde(default = "default_energy_price_per_kwh")]
    pub energy_price_per_kwh: f64,
    #[serde(default = "default_true")]
    pub include_compliance: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub epc_api_key: Option<String>,
    pub ibex_api_key: Option<String>,
    pub radius_m: Option<u32>,
    pub years_back: Option<u32>,
    pub fuzzy_matching: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/retrofit-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(key) = overrides.epc_api_key.filter(|k| !k.trim().is_empty()) {
            self.providers.epc_api_key = key;
        }
        if let Some(key) = overrides.ibex_api_key.filter(|k| !k.trim().is_empty()) {
            self.providers.ibex_api_key = key;
        }
        if let Some(radius) = overrides.radius_m {
            self.search.radius_m = radius;
        }
        if let Some(years) = overrides.years_back {
            self.search.years_back = years;
        }
        if let Some(fuzzy) = overrides.fuzzy_matching {
            self.analysis.fuzzy_matching = fuzzy;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.providers.timeout_secs = timeout;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_secs.max(1))
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            match_options: MatchOptions {
                fuzzy: self.analysis.fuzzy_matching,
                threshold: self.analysis.fuzzy_threshold.min(100),
            },
            example_limit: self.analysis.example_limit,
            fallback_property_value: self.analysis.fallback_property_value,
            energy_price_per_kwh: self.analysis.energy_price_per_kwh,
            include_compliance: self.analysis.include_compliance,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[providers]
postcodes_url = "https://api.postcodes.io"
epc_url = "https://epc.opendatacommunities.org/api/v1"
# base64 of "email:key"; EPC_API_KEY overrides
epc_api_key = ""
land_registry_url = "https://landregistry.data.gov.uk"
ibex_url = "https://ibex.seractech.co.uk"
# IBEX_API_KEY overrides
ibex_api_key = ""
planning_data_url = "https://www.planning.data.gov.uk"
timeout_secs = 10

[search]
radius_m = 500
years_back = 3
decision_filter = ["Approved"]

[analysis]
fuzzy_matching = true
fuzzy_threshold = 85
example_limit = 5
fallback_property_value = 285000.0
energy_price_per_kwh = 0.27
include_compliance = true
"#;
        template.to_string()
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            postcodes_url: default_postcodes_url(),
            epc_url: default_epc_url(),
            epc_api_key: String::new(),
            land_registry_url: default_land_registry_url(),
            ibex_url: default_ibex_url(),
            ibex_api_key: String::new(),
            planning_data_url: default_planning_data_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
            years_back: default_years_back(),
            decision_filter: default_decision_filter(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fuzzy_matching: true,
            fuzzy_threshold: default_fuzzy_threshold(),
            example_limit: default_example_limit(),
            fallback_property_value: default_fallback_property_value(),
            energy_price_per_kwh: default_energy_price_per_kwh(),
            include_compliance: true,
        }
    }
}

fn default_postcodes_url() -> String {
    "https://api.postcodes.io".to_string()
}

fn default_epc_url() -> String {
    "https://epc.opendatacommunities.org/api/v1".to_string()
}

fn default_land_registry_url() -> String {
    "https://landregistry.data.gov.uk".to_string()
}

fn default_ibex_url() -> String {
    "https://ibex.seractech.co.uk".to_string()
}

fn default_planning_data_url() -> String {
    "https://www.planning.data.gov.uk".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_radius_m() -> u32 {
    500
}

fn default_years_back() -> u32 {
    3
}

fn default_decision_filter() -> Vec<String> {
    vec!["Approved".to_string()]
}

fn default_fuzzy_threshold() -> u8 {
    crate::matching::matcher::DEFAULT_FUZZY_THRESHOLD
}

fn default_example_limit() -> usize {
    crate::matching::precedent::DEFAULT_EXAMPLE_LIMIT
}

fn default_fallback_property_value() -> f64 {
    crate::estimate::value::NATIONAL_AVERAGE_PROPERTY_VALUE
}

fn default_energy_price_per_kwh() -> f64 {
    crate::estimate::savings::DEFAULT_ENERGY_PRICE_PER_KWH
}

fn default_true() -> bool {
    true
}

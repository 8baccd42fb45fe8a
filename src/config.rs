//! dashsrv configuration
//!
//! Loaded from a YAML file merged with `DASHSRV_`-prefixed environment
//! overrides. Store connection strings, the source descriptor list, the
//! observer location and the UI defaults all live here instead of being
//! hardcoded in the service.

use crate::error::{DashSrvError, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Interval between the dashboard's automatic data refreshes.
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
}

fn default_service_name() -> String {
    "dashsrv".to_string()
}

fn default_listen_port() -> u16 {
    8050
}

fn default_refresh_secs() -> u64 {
    3600
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            listen_port: default_listen_port(),
            refresh_interval_secs: default_refresh_secs(),
        }
    }
}

/// One chart source: a table in a named store, plotted under a label.
///
/// `emphasis` marks the source that is repeated in the dedicated detail
/// panels, typically the outdoor readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub label: String,
    pub store: String,
    pub table: String,
    #[serde(default)]
    pub emphasis: bool,
}

/// Observer location for the sunrise/sunset banner, plus the timezone
/// that fetched timestamps are converted into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_timezone() -> Tz {
    chrono_tz::UTC
}

/// Dashboard page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Earliest date selectable in the range picker.
    #[serde(default = "default_min_date")]
    pub min_date: NaiveDate,
}

fn default_title() -> String {
    "Environment dashboard".to_string()
}

fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 5, 1).unwrap_or(NaiveDate::MIN)
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            min_date: default_min_date(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    /// Store name -> connection URL.
    pub stores: BTreeMap<String, String>,
    pub sources: Vec<SourceConfig>,
    pub location: LocationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from a YAML file with environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("DASHSRV_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration integrity.
    pub fn validate(&self) -> Result<()> {
        if self.service.name.is_empty() {
            return Err(DashSrvError::Config("Service name cannot be empty".into()));
        }

        if self.service.listen_port == 0 {
            return Err(DashSrvError::Config("Listen port cannot be 0".into()));
        }

        if self.sources.is_empty() {
            return Err(DashSrvError::Config(
                "At least one source must be configured".into(),
            ));
        }

        let mut emphasis_count = 0;
        for source in &self.sources {
            if source.label.is_empty() {
                return Err(DashSrvError::Config("Source label cannot be empty".into()));
            }

            if !self.stores.contains_key(&source.store) {
                return Err(DashSrvError::Config(format!(
                    "Source '{}' references unknown store '{}'",
                    source.label, source.store
                )));
            }

            // The table name is the only fragment interpolated into SQL,
            // so it is restricted to a plain identifier.
            if source.table.is_empty()
                || !source
                    .table
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(DashSrvError::Config(format!(
                    "Source '{}' has invalid table name '{}'",
                    source.label, source.table
                )));
            }

            if source.emphasis {
                emphasis_count += 1;
            }
        }

        if emphasis_count > 1 {
            return Err(DashSrvError::Config(
                "At most one source may be marked as emphasis".into(),
            ));
        }

        let mut labels: Vec<&str> = self.sources.iter().map(|s| s.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != self.sources.len() {
            return Err(DashSrvError::Config("Source labels must be unique".into()));
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(DashSrvError::Config(format!(
                "Latitude {} out of range",
                self.location.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(DashSrvError::Config(format!(
                "Longitude {} out of range",
                self.location.longitude
            )));
        }

        Ok(())
    }
}

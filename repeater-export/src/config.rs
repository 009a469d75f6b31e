use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::module::directory::BackendKind;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level export configuration, read from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Country code of the exported area, e.g. "PL"
    #[serde(default = "default_country")]
    pub country: String,

    /// Directory backend selector: "json" or "xml"
    #[serde(default = "default_data_source")]
    pub data_source: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_channels_file")]
    pub channels_file: String,

    #[serde(default = "default_zones_file")]
    pub zones_file: String,

    /// Drop repeaters whose coordinates lie outside the zone radius
    #[serde(default)]
    pub strict_radius: bool,

    #[serde(default)]
    pub query: QueryParams,

    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// Per-backend query parameters shared by every zone request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default = "default_band")]
    pub band: String,

    #[serde(default = "default_status")]
    pub status: String,

    /// Mode filter. Sent by the JSON backend only when set; the XML backend falls back to "all".
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub json_endpoint: Option<String>,

    #[serde(default)]
    pub xml_endpoint: Option<String>,
}

/// One geographic search area. Its name keys the generated zone pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in kilometres
    pub max_distance: f64,
}

fn default_country() -> String {
    "PL".to_string()
}

fn default_data_source() -> String {
    "json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_channels_file() -> String {
    "channels.csv".to_string()
}

fn default_zones_file() -> String {
    "zones.csv".to_string()
}

fn default_band() -> String {
    "70cm".to_string()
}

fn default_status() -> String {
    "working".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:117.0) Gecko/20100101 Firefox/117.0".to_string()
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            band: default_band(),
            status: default_status(),
            mode: None,
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            json_endpoint: None,
            xml_endpoint: None,
        }
    }
}

impl ExportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: ExportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for zone in &self.zones {
            if zone.name.trim().is_empty() {
                bail!("zone with empty name");
            }
            if !seen.insert(zone.name.as_str()) {
                bail!("duplicate zone name '{}'", zone.name);
            }
            if !zone.latitude.is_finite() || !zone.longitude.is_finite() {
                bail!("zone '{}' has non-numeric coordinates", zone.name);
            }
            if !zone.max_distance.is_finite() || zone.max_distance < 0.0 {
                bail!("zone '{}' has an invalid max_distance {}", zone.name, zone.max_distance);
            }
        }
        Ok(())
    }

    /// Resolve the configured data source. Unknown names are kept for error reporting.
    pub fn backend_kind(&self) -> Result<BackendKind, String> {
        self.data_source.parse()
    }

    pub fn channels_path(&self) -> PathBuf {
        self.output_dir.join(&self.channels_file)
    }

    pub fn zones_path(&self) -> PathBuf {
        self.output_dir.join(&self.zones_file)
    }
}

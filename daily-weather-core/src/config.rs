use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    coords::Coordinates,
    error::ConfigError,
    model::{ClockStyle, Units},
    normalize::{DisplayZone, NormalizeOptions},
    provider::ProviderId,
    render::RenderConfig,
};

pub const DEFAULT_LOCAL_COORDINATES: &str = "44.590959, -104.698514";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// Base URL override, mostly for self-hosted proxies.
    pub endpoint: Option<String>,
}

/// Reverse-geocoding credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub endpoint: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Scalar options come first so the TOML output keeps tables at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, e.g. "worker" or "openweather".
    pub default_provider: Option<String>,

    /// Fallback used when the triggering block has no query, as
    /// "latitude, longitude".
    pub local_coordinates: String,

    pub units: Units,
    pub clock: ClockStyle,
    /// Show sun and moon times in the provider's zone instead of the local one.
    pub provider_time_zone: bool,
    pub request_timeout_secs: u64,

    pub use_single_block: bool,
    pub include_location: bool,
    pub include_sun: bool,
    pub include_moon: bool,
    pub include_wind: bool,
    pub include_humidity: bool,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,

    /// Example TOML:
    /// [geocoding]
    /// api_key = "..."
    pub geocoding: Option<GeocodingConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: Some(ProviderId::Worker.to_string()),
            local_coordinates: DEFAULT_LOCAL_COORDINATES.to_string(),
            units: Units::default(),
            clock: ClockStyle::default(),
            provider_time_zone: false,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_single_block: false,
            include_location: true,
            include_sun: true,
            include_moon: true,
            include_wind: true,
            include_humidity: true,
            providers: HashMap::new(),
            geocoding: None,
        }
    }
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId, ConfigError> {
        let s = self
            .default_provider
            .as_ref()
            .ok_or(ConfigError::NoDefaultProvider)?;

        ProviderId::try_from(s.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Fallback coordinates for blocks without a query.
    ///
    /// A blank or malformed setting is an error: the pipeline never runs
    /// without a usable fallback.
    pub fn fallback_coordinates(&self) -> Result<Coordinates, ConfigError> {
        self.local_coordinates.parse()
    }

    /// Section toggles handed to the renderer.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            use_single_block: self.use_single_block,
            include_location: self.include_location,
            include_sun: self.include_sun,
            include_moon: self.include_moon,
            include_wind: self.include_wind,
            include_humidity: self.include_humidity,
            units: self.units,
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            units: self.units,
            clock: self.clock,
            zone: if self.provider_time_zone {
                DisplayZone::Provider
            } else {
                DisplayZone::Local
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "daily-weather", "daily-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key and set the default provider if none is set.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .or_default()
            .api_key = Some(api_key);

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.api_key.as_deref())
    }

    pub fn provider_endpoint(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.endpoint.as_deref())
    }

    /// A provider is usable when it needs no key or has one.
    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }
}

use crate::{
    Config, Coordinates, RawProviderResponse, Units,
    error::{ConfigError, ProviderError},
    provider::{openweather::OpenWeatherProvider, worker::WorkerProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openweather;
pub mod worker;

const USER_AGENT: &str = concat!("daily-weather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Worker,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Worker => "worker",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Worker, ProviderId::OpenWeather]
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }

    /// Whether the provider's body already names the location, making a
    /// separate geocoding request unnecessary.
    pub fn supplies_location(&self) -> bool {
        matches!(self, ProviderId::Worker)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "worker" => Ok(ProviderId::Worker),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

/// A single weather upstream.
///
/// `Ok(None)` means no data arrived (transport failure or unreadable body)
/// and must be handled like an empty result. Non-success statuses are
/// errors carrying the response text.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(
        &self,
        coords: &Coordinates,
        units: Units,
    ) -> Result<Option<RawProviderResponse>, ProviderError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let http = http_client(config.request_timeout())?;
    let endpoint = config.provider_endpoint(id).map(str::to_owned);

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Worker => Box::new(WorkerProvider::new(http, endpoint)),
        ProviderId::OpenWeather => {
            let api_key = config
                .provider_api_key(id)
                .ok_or(ConfigError::MissingApiKey(id))?;
            Box::new(OpenWeatherProvider::new(http, api_key.to_owned(), endpoint))
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Issue one GET and decode a JSON body.
///
/// Transport failures and undecodable bodies are logged and reported as
/// `Ok(None)`; a non-success status becomes [`ProviderError::Status`].
pub(crate) async fn get_json(
    http: &Client,
    upstream: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Option<serde_json::Value>, ProviderError> {
    tracing::debug!(upstream, url, "Sending request");

    let res = match http.get(url).query(query).send().await {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(upstream, "Request failed: {}", e);
            return Ok(None);
        }
    };

    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(e) if status.is_success() => {
            tracing::error!(upstream, "Failed to read response body: {}", e);
            return Ok(None);
        }
        Err(_) => String::new(),
    };

    if !status.is_success() {
        return Err(ProviderError::Status {
            upstream,
            status: status.as_u16(),
            body,
        });
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::error!(upstream, "Response body is not JSON: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("OpenWeather").unwrap(), ProviderId::OpenWeather);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn only_worker_supplies_location() {
        assert!(ProviderId::Worker.supplies_location());
        assert!(!ProviderId::OpenWeather.supplies_location());
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn worker_needs_no_api_key() {
        let cfg = Config::default();
        let provider = provider_from_config(ProviderId::Worker, &cfg).expect("worker provider");
        assert_eq!(provider.id(), ProviderId::Worker);
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config {
            default_provider: None,
            ..Config::default()
        };
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `daily-weather configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());
        cfg.set_default_provider(ProviderId::OpenWeather);

        let provider = default_provider_from_config(&cfg).expect("provider");
        assert_eq!(provider.id(), ProviderId::OpenWeather);
    }
}

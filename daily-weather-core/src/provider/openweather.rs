use async_trait::async_trait;
use reqwest::Client;

use crate::{Coordinates, RawProviderResponse, Units, error::ProviderError};

use super::{ProviderId, WeatherProvider, get_json};

pub const ONE_CALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// OpenWeather One Call: numeric daily readings with epoch timestamps and no
/// place name.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(http: Client, api_key: String, endpoint: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.unwrap_or_else(|| ONE_CALL_URL.to_string()),
            http,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch(
        &self,
        coords: &Coordinates,
        units: Units,
    ) -> Result<Option<RawProviderResponse>, ProviderError> {
        let body = get_json(
            &self.http,
            self.id().as_str(),
            &self.endpoint,
            &[
                ("lat", coords.latitude.as_str()),
                ("lon", coords.longitude.as_str()),
                ("units", units.as_str()),
                ("exclude", "current,minutely,hourly,alerts"),
                ("appid", self.api_key.as_str()),
            ],
        )
        .await?;

        Ok(body.map(RawProviderResponse::Daily))
    }
}

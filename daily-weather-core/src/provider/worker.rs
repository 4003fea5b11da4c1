use async_trait::async_trait;
use reqwest::Client;

use crate::{Coordinates, RawProviderResponse, Units, error::ProviderError};

use super::{ProviderId, WeatherProvider, get_json};

pub const WORKER_URL: &str = "https://weather-api.honkytonkin.workers.dev";

/// Proxy that returns flat, pre-formatted readings and a place name.
#[derive(Debug, Clone)]
pub struct WorkerProvider {
    endpoint: String,
    http: Client,
}

impl WorkerProvider {
    pub fn new(http: Client, endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| WORKER_URL.to_string()),
            http,
        }
    }
}

#[async_trait]
impl WeatherProvider for WorkerProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Worker
    }

    async fn fetch(
        &self,
        coords: &Coordinates,
        units: Units,
    ) -> Result<Option<RawProviderResponse>, ProviderError> {
        let mut query = vec![
            ("lat", coords.latitude.as_str()),
            ("lon", coords.longitude.as_str()),
        ];
        // Imperial is the worker's default; metric is opt-in.
        if units == Units::Metric {
            query.push(("metric", "t"));
        }

        let body = get_json(&self.http, self.id().as_str(), &self.endpoint, &query).await?;
        Ok(body.map(RawProviderResponse::Flat))
    }
}

//! Reverse geocoding: coordinates to address components.
//!
//! Failures here never abort a report. A non-success status or a dropped
//! connection is logged and the location section is simply left out.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    Config, Coordinates, GeocodeResponse,
    provider::{ProviderId, get_json, http_client},
};

pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn reverse(&self, coords: &Coordinates) -> Option<GeocodeResponse>;
}

#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl GoogleGeocoder {
    pub fn new(http: Client, api_key: String, endpoint: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.unwrap_or_else(|| GEOCODE_URL.to_string()),
            http,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse(&self, coords: &Coordinates) -> Option<GeocodeResponse> {
        let latlng = format!("{},{}", coords.latitude, coords.longitude);

        match get_json(
            &self.http,
            "geocoding",
            &self.endpoint,
            &[("latlng", latlng.as_str()), ("key", self.api_key.as_str())],
        )
        .await
        {
            Ok(body) => body.map(GeocodeResponse),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                None
            }
        }
    }
}

/// Build the geocoder for `provider`, if one is needed and configured.
///
/// Returns `None` when locations are disabled, when the provider already
/// names the place, or when no geocoding key is set.
pub fn geocoder_from_config(
    provider: ProviderId,
    config: &Config,
) -> anyhow::Result<Option<Box<dyn Geocoder>>> {
    if !config.include_location || provider.supplies_location() {
        return Ok(None);
    }

    let Some(geocoding) = config.geocoding.as_ref() else {
        tracing::debug!("No geocoding key configured; location will be omitted");
        return Ok(None);
    };

    let http = http_client(config.request_timeout())?;
    Ok(Some(Box::new(GoogleGeocoder::new(
        http,
        geocoding.api_key.clone(),
        geocoding.endpoint.clone(),
    ))))
}

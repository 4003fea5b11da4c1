use std::fmt;

use serde::{Deserialize, Serialize};

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Suffix appended to wind speeds.
    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clock used for sun and moon times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockStyle {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// A provider timestamp, either epoch seconds or ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(i64),
    Iso(String),
}

/// Raw body of a weather request, tagged by the shape the upstream returns.
#[derive(Debug, Clone, PartialEq)]
pub enum RawProviderResponse {
    /// Flat, already unit-converted fields with ISO timestamps and a
    /// comma-joined `location`.
    Flat(serde_json::Value),
    /// One Call style body: `timezone_offset` plus a `daily` array with
    /// numeric readings and epoch timestamps.
    Daily(serde_json::Value),
}

/// Raw body of a reverse-geocoding request (`results[].address_components`).
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResponse(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Temperature {
    /// Daily low and high, floored to whole degrees.
    Range { low: i64, high: i64 },
    /// Value passed through from a provider that formats it itself.
    Single(String),
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Range { low, high } => write!(f, "{low}° / {high}°"),
            Temperature::Single(value) => f.write_str(value),
        }
    }
}

/// Display-ready rise and set times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiseSet {
    pub rise: String,
    pub set: String,
}

impl fmt::Display for RiseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.rise, self.set)
    }
}

/// Canonical, provider-independent weather record.
///
/// Optional fields are `None` when the provider (or the geocoder) could not
/// supply them; the renderer skips those sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub forecast: String,
    pub temperature: Temperature,
    pub humidity: Option<String>,
    pub wind: Option<String>,
    pub sun: Option<RiseSet>,
    pub moon: Option<RiseSet>,
    pub location: Option<Vec<String>>,
}

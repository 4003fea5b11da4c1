//! Conversion of provider-specific bodies into a [`WeatherReport`].
//!
//! Every provider shape has its own typed view deserialized from the raw
//! JSON. A body that does not fit its view yields `None`, the "no results"
//! signal handed back to the pipeline.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::{Deserialize, Deserializer};

use crate::model::{
    ClockStyle, GeocodeResponse, RawProviderResponse, RiseSet, Temperature, Timestamp, Units,
    WeatherReport,
};

/// Zone used when turning instants into wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// Zone of the machine running the pipeline.
    #[default]
    Local,
    /// Offset reported by the provider, falling back to `Local` when absent.
    Provider,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    pub units: Units,
    pub clock: ClockStyle,
    pub zone: DisplayZone,
}

/// Build the canonical report from a weather body and an optional geocoding
/// body. Returns `None` when the weather body lacks the required fields.
pub fn normalize(
    raw: &RawProviderResponse,
    geocode: Option<&GeocodeResponse>,
    opts: &NormalizeOptions,
) -> Option<WeatherReport> {
    let report = match raw {
        RawProviderResponse::Flat(value) => from_flat(value, opts),
        RawProviderResponse::Daily(value) => from_daily(value, opts),
    }?;

    if report.location.is_some() {
        return Some(report);
    }

    Some(WeatherReport {
        location: geocode.and_then(location_from_geocode),
        ..report
    })
}

/// Read a rise/set field, turning values of an unexpected type into `None`
/// so one bad field never discards the whole body. Fractional epochs are
/// floored.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(floor))
            .map(Timestamp::Epoch),
        Some(serde_json::Value::String(text)) => Some(Timestamp::Iso(text)),
        Some(other) => {
            tracing::debug!("Ignoring timestamp of unexpected type: {}", other);
            None
        }
        None => None,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reading {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct FlatBody {
    forecast: String,
    temperature: Reading,
    humidity: Option<Reading>,
    wind: Option<Reading>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    sunrise: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    sunset: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    moonrise: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    moonset: Option<Timestamp>,
    location: Option<String>,
}

fn from_flat(value: &serde_json::Value, opts: &NormalizeOptions) -> Option<WeatherReport> {
    let body: FlatBody = match serde_json::from_value(value.clone()) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Flat weather body did not match expected shape: {}", e);
            return None;
        }
    };

    let temperature = match body.temperature {
        Reading::Number(n) => Temperature::Single(format!("{}°", floor(n))),
        Reading::Text(text) => Temperature::Single(text),
    };

    Some(WeatherReport {
        forecast: body.forecast,
        temperature,
        humidity: body.humidity.map(humidity_text),
        wind: body.wind.map(|w| wind_text(w, opts.units)),
        sun: rise_set(body.sunrise.as_ref(), body.sunset.as_ref(), None, opts),
        moon: rise_set(body.moonrise.as_ref(), body.moonset.as_ref(), None, opts),
        location: body.location.as_deref().and_then(split_places),
    })
}

#[derive(Debug, Deserialize)]
struct DailyBody {
    timezone_offset: Option<i32>,
    #[serde(default)]
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    temp: DailyTemp,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    sunrise: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    sunset: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    moonrise: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    moonset: Option<Timestamp>,
    #[serde(default)]
    weather: Vec<DailyCondition>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct DailyCondition {
    description: String,
}

fn from_daily(value: &serde_json::Value, opts: &NormalizeOptions) -> Option<WeatherReport> {
    let body: DailyBody = match serde_json::from_value(value.clone()) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Daily weather body did not match expected shape: {}", e);
            return None;
        }
    };

    let offset = body.timezone_offset.and_then(FixedOffset::east_opt);

    let Some(today) = body.daily.into_iter().next() else {
        tracing::debug!("Daily weather body contained no days");
        return None;
    };

    let forecast = today
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| "Unknown".to_string());

    Some(WeatherReport {
        forecast,
        temperature: Temperature::Range {
            low: floor(today.temp.min),
            high: floor(today.temp.max),
        },
        humidity: today.humidity.map(|h| humidity_text(Reading::Number(h))),
        wind: today
            .wind_speed
            .map(|w| wind_text(Reading::Number(w), opts.units)),
        sun: rise_set(today.sunrise.as_ref(), today.sunset.as_ref(), offset, opts),
        moon: rise_set(today.moonrise.as_ref(), today.moonset.as_ref(), offset, opts),
        location: None,
    })
}

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, wanted: &[&str]) -> bool {
        self.types.iter().any(|t| wanted.contains(&t.as_str()))
    }
}

/// City and state tokens from a reverse-geocoding body. `None` unless both
/// are found.
fn location_from_geocode(geocode: &GeocodeResponse) -> Option<Vec<String>> {
    let body: GeocodeBody = match serde_json::from_value(geocode.0.clone()) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Geocoding body did not match expected shape: {}", e);
            return None;
        }
    };

    let mut components = body
        .results
        .iter()
        .flat_map(|r| r.address_components.iter());

    let city = components
        .clone()
        .find(|c| c.has_type(&["locality", "sublocality"]))?;
    let state = components.find(|c| c.has_type(&["administrative_area_level_1"]))?;

    Some(vec![city.long_name.clone(), state.short_name.clone()])
}

fn split_places(location: &str) -> Option<Vec<String>> {
    let places: Vec<String> = location
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    (!places.is_empty()).then_some(places)
}

fn floor(value: f64) -> i64 {
    value.floor() as i64
}

fn humidity_text(reading: Reading) -> String {
    match reading {
        Reading::Number(n) => format!("{}%", floor(n)),
        Reading::Text(text) => text,
    }
}

fn wind_text(reading: Reading, units: Units) -> String {
    match reading {
        Reading::Number(n) => format!("{} {}", floor(n), units.wind_suffix()),
        Reading::Text(text) => text,
    }
}

fn rise_set(
    rise: Option<&Timestamp>,
    set: Option<&Timestamp>,
    provider_offset: Option<FixedOffset>,
    opts: &NormalizeOptions,
) -> Option<RiseSet> {
    Some(RiseSet {
        rise: display_time(rise?, provider_offset, opts)?,
        set: display_time(set?, provider_offset, opts)?,
    })
}

/// Format a timestamp as `hour:minute` on the configured clock.
///
/// Epoch values of zero or below mean "no event" (e.g. no moonrise that day).
pub fn display_time(
    ts: &Timestamp,
    provider_offset: Option<FixedOffset>,
    opts: &NormalizeOptions,
) -> Option<String> {
    let time = match ts {
        Timestamp::Epoch(secs) if *secs <= 0 => return None,
        Timestamp::Epoch(secs) => {
            wall_clock(DateTime::from_timestamp(*secs, 0)?, provider_offset, opts.zone)
        }
        Timestamp::Iso(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(at) => wall_clock(at.with_timezone(&Utc), Some(at.offset().fix()), opts.zone),
            // No offset in the text: already a wall-clock time.
            Err(_) => parse_naive(text)?.time(),
        },
    };

    let pattern = match opts.clock {
        ClockStyle::TwelveHour => "%-I:%M %p",
        ClockStyle::TwentyFourHour => "%-H:%M",
    };

    Some(time.format(pattern).to_string())
}

fn wall_clock(
    at: DateTime<Utc>,
    provider_offset: Option<FixedOffset>,
    zone: DisplayZone,
) -> NaiveTime {
    match (zone, provider_offset) {
        (DisplayZone::Fixed(offset), _) | (DisplayZone::Provider, Some(offset)) => {
            at.with_timezone(&offset).time()
        }
        (DisplayZone::Local, _) | (DisplayZone::Provider, None) => at.with_timezone(&Local).time(),
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc_opts(units: Units) -> NormalizeOptions {
        NormalizeOptions {
            units,
            clock: ClockStyle::TwelveHour,
            zone: DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()),
        }
    }

    fn daily_body() -> serde_json::Value {
        json!({
            "timezone_offset": -21600,
            "daily": [{
                "temp": { "min": 41.7, "max": 68.2 },
                "humidity": 57,
                "wind_speed": 12.9,
                // 2024-06-01 11:05:00 UTC and 2024-06-02 02:30:00 UTC
                "sunrise": 1717239900,
                "sunset": 1717295400,
                "moonrise": 1717232400,
                "moonset": 1717282800,
                "weather": [{ "description": "scattered clouds" }]
            }]
        })
    }

    #[test]
    fn daily_readings_are_floored_with_unit_suffix() {
        let raw = RawProviderResponse::Daily(daily_body());
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report");

        assert_eq!(report.forecast, "scattered clouds");
        assert_eq!(report.temperature, Temperature::Range { low: 41, high: 68 });
        assert_eq!(report.humidity.as_deref(), Some("57%"));
        assert_eq!(report.wind.as_deref(), Some("12 mph"));

        let metric = normalize(&raw, None, &utc_opts(Units::Metric))
            .expect("report");
        assert_eq!(metric.wind.as_deref(), Some("12 m/s"));
    }

    #[test]
    fn daily_epoch_times_use_requested_zone() {
        let raw = RawProviderResponse::Daily(daily_body());
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report");
        let sun = report.sun.expect("sun times");
        assert_eq!(sun.rise, "11:05 AM");
        assert_eq!(sun.set, "2:30 AM");

        let provider_zone = NormalizeOptions {
            zone: DisplayZone::Provider,
            clock: ClockStyle::TwentyFourHour,
            ..NormalizeOptions::default()
        };
        let report = normalize(&raw, None, &provider_zone).expect("report");
        let sun = report.sun.expect("sun times");
        assert_eq!(sun.rise, "5:05");
        assert_eq!(sun.set, "20:30");
    }

    #[test]
    fn missing_daily_array_is_no_results() {
        let raw = RawProviderResponse::Daily(json!({ "timezone_offset": 0 }));
        assert!(normalize(&raw, None, &utc_opts(Units::Imperial)).is_none());

        let raw = RawProviderResponse::Daily(json!({ "daily": [] }));
        assert!(normalize(&raw, None, &utc_opts(Units::Imperial)).is_none());
    }

    #[test]
    fn zero_moonrise_drops_moon_pair() {
        let mut body = daily_body();
        body["daily"][0]["moonrise"] = json!(0);

        let raw = RawProviderResponse::Daily(body);
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report");
        assert!(report.moon.is_none());
        assert!(report.sun.is_some());
    }

    #[test]
    fn fractional_epoch_is_floored() {
        let mut body = daily_body();
        body["daily"][0]["sunrise"] = json!(1717239900.7);

        let raw = RawProviderResponse::Daily(body);
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report");
        assert_eq!(report.sun.expect("sun times").rise, "11:05 AM");
    }

    #[test]
    fn mistyped_timestamp_drops_only_its_pair() {
        let mut body = daily_body();
        body["daily"][0]["moonset"] = json!({ "unexpected": true });

        let raw = RawProviderResponse::Daily(body);
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report stays valid");
        assert!(report.moon.is_none());
        assert!(report.sun.is_some());

        let raw = RawProviderResponse::Flat(json!({
            "forecast": "Sunny",
            "temperature": "52°F",
            "sunrise": [1, 2],
            "sunset": "2024-06-01T20:41:00-06:00"
        }));
        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report stays valid");
        assert!(report.sun.is_none());
        assert_eq!(report.forecast, "Sunny");
    }

    #[test]
    fn flat_values_pass_through() {
        let raw = RawProviderResponse::Flat(json!({
            "forecast": "Sunny",
            "temperature": "52°F / 71°F",
            "humidity": "40%",
            "wind": "8 mph NW",
            "sunrise": "2024-06-01T05:20:00-06:00",
            "sunset": "2024-06-01T20:41:00-06:00",
            "moonrise": "2024-06-01T02:03:00-06:00",
            "moonset": "2024-06-01T15:47:00-06:00",
            "location": "Gillette, Campbell County,  WY"
        }));

        let opts = NormalizeOptions {
            zone: DisplayZone::Provider,
            ..NormalizeOptions::default()
        };
        let report = normalize(&raw, None, &opts).expect("report");

        assert_eq!(report.temperature, Temperature::Single("52°F / 71°F".into()));
        assert_eq!(report.humidity.as_deref(), Some("40%"));
        assert_eq!(report.wind.as_deref(), Some("8 mph NW"));
        assert_eq!(
            report.sun,
            Some(RiseSet { rise: "5:20 AM".into(), set: "8:41 PM".into() })
        );
        assert_eq!(
            report.location,
            Some(vec!["Gillette".into(), "Campbell County".into(), "WY".into()])
        );
    }

    #[test]
    fn flat_numeric_humidity_keeps_value() {
        let raw = RawProviderResponse::Flat(json!({
            "forecast": "Fog",
            "temperature": 48.6,
            "humidity": 57
        }));

        let report = normalize(&raw, None, &utc_opts(Units::Imperial))
            .expect("report");
        assert_eq!(report.temperature, Temperature::Single("48°".into()));
        assert_eq!(report.humidity.as_deref(), Some("57%"));
        assert!(report.sun.is_none());
        assert!(report.location.is_none());
    }

    #[test]
    fn flat_body_without_forecast_is_no_results() {
        let raw = RawProviderResponse::Flat(json!({ "temperature": "50°" }));
        assert!(normalize(&raw, None, &utc_opts(Units::Imperial)).is_none());

        let raw = RawProviderResponse::Flat(json!("upstream said no"));
        assert!(normalize(&raw, None, &utc_opts(Units::Imperial)).is_none());
    }

    fn geocode_body() -> GeocodeResponse {
        GeocodeResponse(json!({
            "results": [{
                "address_components": [
                    { "long_name": "1201", "short_name": "1201", "types": ["street_number"] },
                    { "long_name": "Gillette", "short_name": "Gillette", "types": ["locality", "political"] },
                    { "long_name": "Campbell County", "short_name": "Campbell County", "types": ["administrative_area_level_2", "political"] },
                    { "long_name": "Wyoming", "short_name": "WY", "types": ["administrative_area_level_1", "political"] }
                ]
            }]
        }))
    }

    #[test]
    fn geocode_supplies_city_and_state() {
        let report = normalize(
            &RawProviderResponse::Daily(daily_body()),
            Some(&geocode_body()),
            &utc_opts(Units::Imperial),
        )
        .expect("report");

        assert_eq!(report.location, Some(vec!["Gillette".into(), "WY".into()]));
    }

    #[test]
    fn geocode_without_locality_leaves_location_empty() {
        let geocode = GeocodeResponse(json!({
            "results": [{
                "address_components": [
                    { "long_name": "Wyoming", "short_name": "WY", "types": ["administrative_area_level_1"] }
                ]
            }]
        }));

        let report = normalize(
            &RawProviderResponse::Daily(daily_body()),
            Some(&geocode),
            &utc_opts(Units::Imperial),
        )
        .expect("report stays valid");
        assert!(report.location.is_none());

        let empty = GeocodeResponse(json!({ "results": [], "status": "ZERO_RESULTS" }));
        let report = normalize(
            &RawProviderResponse::Daily(daily_body()),
            Some(&empty),
            &utc_opts(Units::Imperial),
        )
        .expect("report stays valid");
        assert!(report.location.is_none());
    }

    #[test]
    fn sublocality_counts_as_city() {
        let geocode = GeocodeResponse(json!({
            "results": [{
                "address_components": [
                    { "long_name": "Brooklyn", "short_name": "Brooklyn", "types": ["political", "sublocality", "sublocality_level_1"] },
                    { "long_name": "New York", "short_name": "NY", "types": ["administrative_area_level_1", "political"] }
                ]
            }]
        }));

        let report = normalize(
            &RawProviderResponse::Daily(daily_body()),
            Some(&geocode),
            &utc_opts(Units::Imperial),
        )
        .expect("report");
        assert_eq!(report.location, Some(vec!["Brooklyn".into(), "NY".into()]));
    }

    #[test]
    fn naive_iso_time_is_shown_as_written() {
        let opts = NormalizeOptions {
            clock: ClockStyle::TwentyFourHour,
            ..NormalizeOptions::default()
        };
        let ts = Timestamp::Iso("2024-06-01T19:05".into());
        assert_eq!(display_time(&ts, None, &opts).as_deref(), Some("19:05"));

        let garbage = Timestamp::Iso("yesterday-ish".into());
        assert!(display_time(&garbage, None, &opts).is_none());
    }
}

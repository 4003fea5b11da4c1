//! Core library for the `daily-weather` tool.
//!
//! This crate turns a coordinate query typed into a note block into a
//! structured weather report:
//! - Coordinate parsing with a configured fallback
//! - Weather providers and reverse geocoding over HTTP
//! - Normalization of provider-specific bodies into one report
//! - Rendering of the report into note blocks
//!
//! The note application is abstracted behind [`pipeline::NoteHost`].

pub mod config;
pub mod coords;
pub mod error;
pub mod geocode;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod render;

pub use config::{Config, GeocodingConfig, ProviderConfig};
pub use coords::{Coordinates, parse_query};
pub use error::{ConfigError, PipelineError, ProviderError};
pub use geocode::{Geocoder, GoogleGeocoder};
pub use model::{
    ClockStyle, GeocodeResponse, RawProviderResponse, RiseSet, Temperature, Timestamp, Units,
    WeatherReport,
};
pub use normalize::{DisplayZone, NormalizeOptions, normalize};
pub use pipeline::{BlockId, Notice, NoteHost, Outcome, Pipeline, Trigger};
pub use provider::{ProviderId, WeatherProvider};
pub use render::{RenderConfig, RenderNode, render};

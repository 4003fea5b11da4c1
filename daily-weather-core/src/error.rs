//! Typed errors for the weather pipeline.
//!
//! Provider and configuration errors carry enough context for logging;
//! "no results" and "unparseable query" are not errors and are signalled
//! with `Option` instead.

use thiserror::Error;

use crate::provider::ProviderId;

/// Failure of a single outbound provider request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream answered with a non-success status. `body` is the captured
    /// response text.
    #[error("{upstream} request failed with status {status}: {body}")]
    Status {
        upstream: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Local coordinates '{0}' are not in the format 'latitude, longitude'.\n\
         Hint: run `daily-weather configure <provider>` and enter valid coordinates."
    )]
    InvalidFallback(String),

    #[error("Unknown provider '{0}'. Supported providers: worker, openweather.")]
    UnknownProvider(String),

    #[error(
        "No API key configured for provider '{0}'.\n\
         Hint: run `daily-weather configure {0}` and enter your API key."
    )]
    MissingApiKey(ProviderId),

    #[error(
        "No default provider configured.\n\
         Hint: run `daily-weather configure <provider>` (e.g. `daily-weather configure worker`) first."
    )]
    NoDefaultProvider,
}

/// Failure talking to the note host after the report was produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Note host error: {0}")]
    Host(#[from] anyhow::Error),
}

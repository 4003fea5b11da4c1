//! Wiring from a note trigger to inserted weather blocks.
//!
//! The note application itself is behind [`NoteHost`]; everything the
//! pipeline needs from it (reading the trigger block, inserting, removing,
//! showing a notice) goes through that trait.

use async_trait::async_trait;

use crate::{
    Config, Coordinates,
    coords::parse_query,
    error::PipelineError,
    geocode::{Geocoder, geocoder_from_config},
    normalize::{NormalizeOptions, normalize},
    provider::{WeatherProvider, default_provider_from_config},
    render::{RenderConfig, RenderNode, render},
};

const NOTICE_PREFIX: &str = "daily-weather ::";

/// Identifier of a block in the host's note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId(pub String);

/// The user asked for weather at this block.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub block: BlockId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

/// How a single run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Report written to the note.
    Inserted,
    /// The block text was not a coordinate pair; nothing was fetched.
    Unparseable,
    /// Provider returned nothing usable.
    NoResults,
    /// Provider answered with a non-success status.
    ProviderFailed,
}

#[async_trait]
pub trait NoteHost: Send + Sync {
    /// First line of the block, or `None` if the block is empty or missing.
    async fn first_line(&self, block: &BlockId) -> anyhow::Result<Option<String>>;

    /// Insert `nodes` as siblings after `block`.
    async fn insert_nodes(&self, block: &BlockId, nodes: &[RenderNode]) -> anyhow::Result<()>;

    /// Replace the text of `block`.
    async fn update_block(&self, block: &BlockId, text: &str) -> anyhow::Result<()>;

    async fn remove_block(&self, block: &BlockId) -> anyhow::Result<()>;

    async fn notify(&self, notice: Notice);
}

/// Parser, provider, normalizer and renderer bound to one configuration.
#[derive(Debug)]
pub struct Pipeline {
    provider: Box<dyn WeatherProvider>,
    geocoder: Option<Box<dyn Geocoder>>,
    fallback: Coordinates,
    render: RenderConfig,
    normalize: NormalizeOptions,
}

impl Pipeline {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        geocoder: Option<Box<dyn Geocoder>>,
        fallback: Coordinates,
        render: RenderConfig,
        normalize: NormalizeOptions,
    ) -> Self {
        Self {
            provider,
            geocoder,
            fallback,
            render,
            normalize,
        }
    }

    /// Build the pipeline for the configured default provider.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = default_provider_from_config(config)?;
        let geocoder = geocoder_from_config(provider.id(), config)?;

        Ok(Self::new(
            provider,
            geocoder,
            config.fallback_coordinates()?,
            config.render_config(),
            config.normalize_options(),
        ))
    }

    /// Handle one trigger end to end.
    pub async fn run(
        &self,
        host: &dyn NoteHost,
        trigger: &Trigger,
    ) -> Result<Outcome, PipelineError> {
        let query = host.first_line(&trigger.block).await?;
        let query = query.as_deref().filter(|q| !q.trim().is_empty());

        let Some(coords) = parse_query(query, &self.fallback) else {
            host.notify(Notice::Error(format!(
                "{NOTICE_PREFIX} Could not parse latitude and longitude from block!"
            )))
            .await;
            return Ok(Outcome::Unparseable);
        };

        tracing::info!(provider = %self.provider.id(), %coords, "Fetching results...");

        let units = self.render.units;
        let (weather, geocode) = tokio::join!(self.provider.fetch(&coords, units), async {
            match &self.geocoder {
                Some(geocoder) => geocoder.reverse(&coords).await,
                None => None,
            }
        });

        let raw = match weather {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("{NOTICE_PREFIX} Error: {}", e);
                return Ok(Outcome::ProviderFailed);
            }
        };

        let Some(report) = raw.and_then(|raw| normalize(&raw, geocode.as_ref(), &self.normalize))
        else {
            host.notify(Notice::Info(format!("{NOTICE_PREFIX} No results!"))).await;
            return Ok(Outcome::NoResults);
        };

        let nodes = render(&report, &self.render);

        match (query.is_some(), self.render.use_single_block) {
            // Empty block and single-block mode: fill the block itself.
            (false, true) => {
                let text = nodes.first().map(|n| n.text.as_str()).unwrap_or_default();
                host.update_block(&trigger.block, text).await?;
            }
            (had_query, _) => {
                host.insert_nodes(&trigger.block, &nodes).await?;
                if had_query {
                    host.remove_block(&trigger.block).await?;
                }
            }
        }

        tracing::info!(block = %trigger.block.0, "Inserted weather report");
        Ok(Outcome::Inserted)
    }
}

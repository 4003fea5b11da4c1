use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use daily_weather_core::{
    BlockId, Config, Coordinates, GeocodingConfig, Outcome, Pipeline, ProviderId, Trigger, Units,
};
use inquire::{Confirm, Password, Select, Text};

use crate::host::{ConsoleHost, OutlineFile};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "daily-weather", version, about = "Daily weather reports for your notes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and defaults for a specific provider.
    Configure {
        /// Provider short name, e.g. "worker" or "openweather".
        provider: String,
    },

    /// Print a weather report for a coordinate query.
    Show {
        /// "latitude, longitude"; the configured local coordinates when absent.
        query: Option<String>,

        /// Emit one block with every line instead of a parent with children.
        #[arg(long)]
        single_block: bool,
    },

    /// Insert a weather report into a Markdown outline file.
    Note {
        /// Outline file to edit in place.
        file: PathBuf,

        /// 1-based line of the block holding the query.
        #[arg(long, default_value_t = 1)]
        line: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show {
                query,
                single_block,
            } => {
                let mut cfg = Config::load()?;
                cfg.use_single_block |= single_block;

                let pipeline = Pipeline::from_config(&cfg)?;
                let host = ConsoleHost::new(query);
                let outcome = pipeline.run(&host, &ConsoleHost::trigger()).await?;
                check(outcome)
            }
            Command::Note { file, line } => {
                let cfg = Config::load()?;
                let pipeline = Pipeline::from_config(&cfg)?;

                let outline = OutlineFile::open(&file).await?;
                let trigger = Trigger {
                    block: BlockId(line.to_string()),
                };
                let outcome = pipeline.run(&outline, &trigger).await?;
                if outcome == Outcome::Inserted {
                    outline.save().await?;
                    tracing::info!(file = %file.display(), line, "Saved outline");
                }
                check(outcome)
            }
        }
    }
}

/// Map pipeline outcomes onto the process exit status.
fn check(outcome: Outcome) -> anyhow::Result<()> {
    tracing::debug!(?outcome, "Pipeline finished");
    match outcome {
        Outcome::Inserted | Outcome::NoResults => Ok(()),
        Outcome::Unparseable => anyhow::bail!("Query is not in the format 'latitude, longitude'"),
        Outcome::ProviderFailed => anyhow::bail!("Weather provider rejected the request"),
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut cfg = Config::load()?;

    println!("Configuring provider: {id}");

    if id.requires_api_key() {
        let key = Password::new("API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        cfg.upsert_provider_api_key(id, key);
    }

    if !id.supplies_location() {
        let key = Text::new("Geocoding API key (leave empty to skip place names):")
            .prompt()
            .context("Failed to read geocoding key")?;
        if !key.trim().is_empty() {
            cfg.geocoding = Some(GeocodingConfig {
                api_key: key.trim().to_string(),
                endpoint: cfg.geocoding.as_ref().and_then(|g| g.endpoint.clone()),
            });
        }
    }

    let coords = Text::new("Local coordinates (latitude, longitude):")
        .with_default(&cfg.local_coordinates)
        .prompt()
        .context("Failed to read local coordinates")?;
    cfg.local_coordinates = coords.parse::<Coordinates>()?.to_string();

    let start = match cfg.units {
        Units::Imperial => 0,
        Units::Metric => 1,
    };
    cfg.units = Select::new("Units:", vec![Units::Imperial, Units::Metric])
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    let make_default = Confirm::new("Use this provider by default?")
        .with_default(true)
        .prompt()
        .context("Failed to read confirmation")?;
    if make_default {
        cfg.set_default_provider(id);
    }

    cfg.save()?;
    let path = Config::config_file_path()?;
    tracing::info!(provider = %id, path = %path.display(), "Configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

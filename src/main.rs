//! CLI entry point for the CTA tracker skill.
//!
//! Runs a single skill event end to end, or exercises the station resolver
//! and arrivals lookup on their own.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cta_tracker::composer::compose;
use cta_tracker::config::{FeedConfig, SkillConfig, StoreConfig};
use cta_tracker::infra::csv_stations::CsvStationDirectory;
use cta_tracker::infra::cta::CtaArrivalsClient;
use cta_tracker::infra::dynamo::{DynamoPreferenceStore, DynamoStationDirectory};
use cta_tracker::infra::keys::SsmKeyStore;
use cta_tracker::infra::memory::MemoryPreferenceStore;
use cta_tracker::resolver::StationResolver;
use cta_tracker::services::{ArrivalFeed, PreferenceStore, StationDirectory};
use cta_tracker::skill::Skill;
use cta_tracker::types::Direction;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cta_tracker")]
#[command(about = "CTA train tracker voice skill", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one skill event and print the response JSON
    Handle {
        /// Path to the event JSON, or "-" for stdin
        #[arg(value_name = "EVENT", default_value = "-")]
        event: String,

        /// Keep preferences in memory instead of DynamoDB
        #[arg(long, default_value_t = false)]
        in_memory: bool,

        /// Pretty-print the response
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List stations on a line matching a spoken name, without saving anything
    Stations {
        /// Line color, e.g. "red"
        line: String,

        /// Spoken station name, e.g. "sheridan"
        name: String,
    },
    /// Fetch arrivals for a station and print the spoken summary
    Arrivals {
        /// Station map id, e.g. 40080
        station_id: String,

        /// "northbound" or "southbound"
        direction: String,

        /// Station name to use in the summary
        #[arg(long, default_value = "the station")]
        station_name: String,

        /// Print the parsed arrivals as JSON instead of the spoken summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cta_tracker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cta_tracker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let sdk = aws_config::load_from_env().await;

    match cli.command {
        Commands::Handle {
            event,
            in_memory,
            pretty,
        } => {
            let config = SkillConfig::from_env()?;
            let body = read_event(&event)?;

            let preferences: Arc<dyn PreferenceStore> = if in_memory {
                Arc::new(MemoryPreferenceStore::new())
            } else {
                Arc::new(DynamoPreferenceStore::new(
                    &sdk,
                    &config.store.favorite_station_table,
                    &config.store.last_direction_table,
                ))
            };
            let skill = Skill::new(
                config.application_id.clone(),
                preferences,
                station_directory(&config.store, &sdk, in_memory)?,
                arrivals_client(&config.feed, &sdk).await?,
            );

            let response = skill.handle_json(&body).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{json}");
        }
        Commands::Stations { line, name } => {
            let directory = station_directory(&StoreConfig::from_env(), &sdk, false)?;
            let preferences = MemoryPreferenceStore::new();
            let resolver = StationResolver::new(directory.as_ref(), &preferences);

            let candidates = resolver.resolve(&line, &name).await?;
            info!(count = candidates.len(), "Matching stations");
            for station in &candidates {
                info!(station_id = %station.station_id, station_name = %station.station_name, "Station");
            }
        }
        Commands::Arrivals {
            station_id,
            direction,
            station_name,
            json,
        } => {
            let direction = Direction::from_spoken(&direction)?;
            let client = arrivals_client(&FeedConfig::from_env()?, &sdk).await?;

            let arrivals = client.fetch_arrivals(&station_id, direction).await?;
            for arrival in &arrivals {
                info!(
                    predicted = %arrival.predicted_time,
                    arrival = %arrival.arrival_time,
                    minutes = arrival.minutes(),
                    "Arrival"
                );
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&arrivals)?);
            } else {
                println!("{}", compose(direction, &station_name, &arrivals));
            }
        }
    }

    Ok(())
}

/// Reads the event body from a file, or stdin for "-".
fn read_event(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut body = Vec::new();
        std::io::stdin().read_to_end(&mut body)?;
        Ok(body)
    } else {
        std::fs::read(source).with_context(|| format!("reading event {source}"))
    }
}

/// The CSV directory when configured, otherwise DynamoDB.
fn station_directory(
    config: &StoreConfig,
    sdk: &aws_config::SdkConfig,
    local_only: bool,
) -> Result<Arc<dyn StationDirectory>> {
    match &config.stations_csv {
        Some(path) => Ok(Arc::new(CsvStationDirectory::from_path(path)?)),
        None if local_only => bail!("STATIONS_CSV must be set when running with --in-memory"),
        None => Ok(Arc::new(DynamoStationDirectory::new(sdk, &config.stations_table))),
    }
}

#[tracing::instrument(skip_all)]
async fn arrivals_client(
    config: &FeedConfig,
    sdk: &aws_config::SdkConfig,
) -> Result<Arc<dyn ArrivalFeed>> {
    let api_key = config.api_key.resolve(&SsmKeyStore::new(sdk)).await?;
    let client = CtaArrivalsClient::new(&config.cta_api_url, api_key, config.feed_timeout)?;
    Ok(Arc::new(client))
}

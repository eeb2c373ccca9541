//! Runtime configuration, read from the environment (and `.env`).
//!
//! Split by concern so each CLI subcommand only requires the variables it
//! uses: [`FeedConfig`] for the arrivals feed, [`StoreConfig`] for
//! preferences and the station directory, and [`SkillConfig`] for the whole
//! skill.

use anyhow::{Context, Result, bail};
use std::time::Duration;

use crate::infra::cta::client::DEFAULT_BASE_URL;
use crate::infra::keys::ApiKeySource;

/// Reads one variable. Empty values count as unset.
fn var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn var_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    var(lookup, name).unwrap_or_else(|| default.to_string())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub api_key: ApiKeySource,
    pub cta_api_url: String,
    pub feed_timeout: Duration,
}

impl FeedConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = match (var(&lookup, "CTA_API_KEY"), var(&lookup, "CTA_API_KEY_PARAMETER")) {
            (Some(key), _) => ApiKeySource::Plain(key),
            (None, Some(reference)) => ApiKeySource::Parameter(reference),
            (None, None) => bail!("either CTA_API_KEY or CTA_API_KEY_PARAMETER must be set"),
        };

        let feed_timeout = match var(&lookup, "CTA_FEED_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("CTA_FEED_TIMEOUT_SECS is not a number: {secs:?}"))?,
            ),
            None => Duration::from_secs(5),
        };

        Ok(Self {
            api_key,
            cta_api_url: var_or(&lookup, "CTA_API_URL", DEFAULT_BASE_URL),
            feed_timeout,
        })
    }
}

/// Table names and the optional local station list. Nothing here is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub favorite_station_table: String,
    pub last_direction_table: String,
    pub stations_table: String,
    /// Local "L" stops CSV. When set, used instead of `stations_table`.
    pub stations_csv: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            favorite_station_table: var_or(&lookup, "FAVORITE_STATION_TABLE", "favorite_station"),
            last_direction_table: var_or(&lookup, "LAST_DIRECTION_TABLE", "last_direction"),
            stations_table: var_or(&lookup, "STATIONS_TABLE", "el_stations"),
            stations_csv: var(&lookup, "STATIONS_CSV"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillConfig {
    /// The only application id this skill answers to.
    pub application_id: String,
    pub feed: FeedConfig,
    pub store: StoreConfig,
}

impl SkillConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let application_id =
            var(&lookup, "SKILL_APPLICATION_ID").context("SKILL_APPLICATION_ID must be set")?;
        Ok(Self {
            application_id,
            feed: FeedConfig::from_lookup(&lookup)?,
            store: StoreConfig::from_lookup(&lookup),
        })
    }
}

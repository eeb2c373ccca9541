//! Station name resolution.
//!
//! Users say partial station names ("sheridan", "belmont"). The resolver
//! finds every station on the spoken line whose name contains the utterance,
//! and only saves a favorite when that search narrows to exactly one station.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, info};

use crate::error::SkillError;
use crate::services::{PreferenceStore, StationDirectory};
use crate::types::{Line, StationCandidate};

/// Outcome of trying to save a favorite station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one match; it has been saved.
    Saved(StationCandidate),
    NoMatch,
    /// Several stations matched. Nothing was saved.
    Ambiguous(Vec<StationCandidate>),
}

/// Case-insensitive substring match of a spoken name against a station name.
pub fn match_station_name(spoken: &str, station_name: &str) -> bool {
    station_name
        .to_uppercase()
        .contains(&spoken.trim().to_uppercase())
}

/// Removes repeats, keeping the first occurrence of each item in place.
pub fn deduplicate<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

pub struct StationResolver<'a> {
    directory: &'a dyn StationDirectory,
    preferences: &'a dyn PreferenceStore,
}

impl<'a> StationResolver<'a> {
    pub fn new(directory: &'a dyn StationDirectory, preferences: &'a dyn PreferenceStore) -> Self {
        Self {
            directory,
            preferences,
        }
    }

    /// Lists the distinct stations on `line_name` matching `spoken_name`.
    ///
    /// # Errors
    ///
    /// [`SkillError::UnknownLine`] if `line_name` is not one of the eight
    /// lines, [`SkillError::Directory`] if the directory can't be read.
    pub async fn resolve(
        &self,
        line_name: &str,
        spoken_name: &str,
    ) -> Result<Vec<StationCandidate>, SkillError> {
        let line: Line = line_name.parse()?;
        let stations = self
            .directory
            .stations_on_line(line)
            .await
            .map_err(SkillError::Directory)?;
        debug!(line = %line, stations = stations.len(), "Stations on line");

        Ok(deduplicate(
            stations
                .into_iter()
                .filter(|s| match_station_name(spoken_name, &s.station_name)),
        ))
    }

    /// Resolves and, when the match is unique, saves it as `user_id`'s favorite.
    #[tracing::instrument(skip(self))]
    pub async fn set_favorite(
        &self,
        user_id: &str,
        line_name: &str,
        spoken_name: &str,
    ) -> Result<Resolution, SkillError> {
        let mut candidates = self.resolve(line_name, spoken_name).await?;

        match candidates.len() {
            0 => {
                info!("No station matched");
                Ok(Resolution::NoMatch)
            }
            1 => {
                let station = candidates.remove(0);
                self.preferences
                    .set_favorite_station(user_id, &station)
                    .await
                    .map_err(SkillError::Store)?;
                info!(station_id = %station.station_id, station_name = %station.station_name, "Favorite station saved");
                Ok(Resolution::Saved(station))
            }
            n => {
                info!(candidates = n, "Station name is ambiguous");
                Ok(Resolution::Ambiguous(candidates))
            }
        }
    }
}

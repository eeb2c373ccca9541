//! In-process preference store for local runs and tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::services::PreferenceStore;
use crate::types::{Direction, StationCandidate, UserPreference};

/// Keeps every user's [`UserPreference`] in a map. Lost on exit.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    records: Mutex<HashMap<String, UserPreference>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one user's record, if any.
    pub async fn record(&self, user_id: &str) -> Option<UserPreference> {
        self.records.lock().await.get(user_id).cloned()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_favorite_station(&self, user_id: &str) -> Option<StationCandidate> {
        self.records
            .lock()
            .await
            .get(user_id)
            .and_then(|r| r.favorite_station.clone())
    }

    async fn get_last_direction(&self, user_id: &str) -> Option<Direction> {
        self.records
            .lock()
            .await
            .get(user_id)
            .and_then(|r| r.last_direction)
    }

    async fn set_direction(&self, user_id: &str, direction: Direction) -> Result<()> {
        self.records
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .last_direction = Some(direction);
        Ok(())
    }

    async fn set_favorite_station(&self, user_id: &str, station: &StationCandidate) -> Result<()> {
        self.records
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .favorite_station = Some(station.clone());
        Ok(())
    }
}

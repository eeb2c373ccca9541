//! Trait for per-user preference persistence.

use anyhow::Result;

use crate::types::{Direction, StationCandidate};

/// Reads and writes a single user's preference record.
///
/// Getters never fail: a missing or incomplete record, or a backend that
/// can't be read, all come back as `None`. Setters are idempotent upserts.
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_favorite_station(&self, user_id: &str) -> Option<StationCandidate>;

    async fn get_last_direction(&self, user_id: &str) -> Option<Direction>;

    async fn set_direction(&self, user_id: &str, direction: Direction) -> Result<()>;

    async fn set_favorite_station(&self, user_id: &str, station: &StationCandidate) -> Result<()>;
}

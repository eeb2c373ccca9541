//! Trait for the station directory.

use anyhow::Result;

use crate::types::{Line, StationCandidate};

/// Abstraction over the list of "L" stations.
#[async_trait::async_trait]
pub trait StationDirectory: Send + Sync {
    /// Returns every station row flagged as served by `line`.
    ///
    /// The same station may appear more than once (one row per platform).
    async fn stations_on_line(&self, line: Line) -> Result<Vec<StationCandidate>>;
}

//! Trait for the live arrivals provider.

use crate::error::FeedError;
use crate::types::{ArrivalRecord, Direction};

/// Abstraction over a live arrivals provider (e.g., the CTA Train Tracker).
#[async_trait::async_trait]
pub trait ArrivalFeed: Send + Sync {
    /// Returns upcoming trains at `station_id` headed in `direction`, in the
    /// provider's order. An empty list means no such trains, not a failure.
    async fn fetch_arrivals(
        &self,
        station_id: &str,
        direction: Direction,
    ) -> Result<Vec<ArrivalRecord>, FeedError>;
}

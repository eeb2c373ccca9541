use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::warn;

use super::{Item, string_attr};
use crate::services::PreferenceStore;
use crate::types::{Direction, StationCandidate};

const USER_ID: &str = "user_id";

/// Preference records split over two tables, both keyed by `user_id`.
pub struct DynamoPreferenceStore {
    client: aws_sdk_dynamodb::Client,
    favorite_table: String,
    direction_table: String,
}

impl DynamoPreferenceStore {
    pub fn new(
        config: &aws_config::SdkConfig,
        favorite_table: impl Into<String>,
        direction_table: impl Into<String>,
    ) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
            favorite_table: favorite_table.into(),
            direction_table: direction_table.into(),
        }
    }

    /// Fetches the item for `user_id`, logging and swallowing read failures.
    async fn get_item(&self, table: &str, user_id: &str) -> Option<Item> {
        match self
            .client
            .get_item()
            .table_name(table)
            .key(USER_ID, AttributeValue::S(user_id.to_string()))
            .send()
            .await
        {
            Ok(output) => output.item,
            Err(e) => {
                warn!(table, error = %e, "Preference read failed, treating as unset");
                None
            }
        }
    }
}

/// A favorite record missing either field reads as unset.
fn favorite_from_item(item: &Item) -> Option<StationCandidate> {
    let station_id = string_attr(item, "station_id")?;
    let station_name = string_attr(item, "station_name")?;
    Some(StationCandidate::new(station_id, station_name))
}

fn direction_from_item(item: &Item) -> Option<Direction> {
    let code = string_attr(item, "direction")?;
    match Direction::from_code(&code) {
        Ok(direction) => Some(direction),
        Err(e) => {
            warn!(error = %e, "Stored direction is invalid, treating as unset");
            None
        }
    }
}

#[async_trait]
impl PreferenceStore for DynamoPreferenceStore {
    async fn get_favorite_station(&self, user_id: &str) -> Option<StationCandidate> {
        favorite_from_item(&self.get_item(&self.favorite_table, user_id).await?)
    }

    async fn get_last_direction(&self, user_id: &str) -> Option<Direction> {
        direction_from_item(&self.get_item(&self.direction_table, user_id).await?)
    }

    async fn set_direction(&self, user_id: &str, direction: Direction) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.direction_table)
            .item(USER_ID, AttributeValue::S(user_id.to_string()))
            .item("direction", AttributeValue::S(direction.code().to_string()))
            .send()
            .await
            .with_context(|| format!("PutItem failed for table '{}'", self.direction_table))?;
        Ok(())
    }

    async fn set_favorite_station(&self, user_id: &str, station: &StationCandidate) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.favorite_table)
            .item(USER_ID, AttributeValue::S(user_id.to_string()))
            .item("station_id", AttributeValue::S(station.station_id.clone()))
            .item("station_name", AttributeValue::S(station.station_name.clone()))
            .send()
            .await
            .with_context(|| format!("PutItem failed for table '{}'", self.favorite_table))?;
        Ok(())
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::{debug, warn};

use super::string_attr;
use crate::services::StationDirectory;
use crate::types::{Line, StationCandidate};

/// Scans the stations table for rows flagged with a line's code.
pub struct DynamoStationDirectory {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoStationDirectory {
    pub fn new(config: &aws_config::SdkConfig, table: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
            table: table.into(),
        }
    }
}

#[async_trait]
impl StationDirectory for DynamoStationDirectory {
    async fn stations_on_line(&self, line: Line) -> Result<Vec<StationCandidate>> {
        let mut stations = Vec::new();
        let mut start_key = None;
        let mut pages = 0;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .filter_expression("#line = :flag")
                .expression_attribute_names("#line", line.code())
                .expression_attribute_values(":flag", AttributeValue::S("TRUE".to_string()))
                .projection_expression("MAP_ID, STATION_NAME")
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .with_context(|| format!("Scan failed for table '{}'", self.table))?;
            pages += 1;

            for item in output.items.unwrap_or_default() {
                match (string_attr(&item, "MAP_ID"), string_attr(&item, "STATION_NAME")) {
                    (Some(id), Some(name)) => stations.push(StationCandidate::new(id, name)),
                    _ => warn!(table = %self.table, "Skipping station row without MAP_ID/STATION_NAME"),
                }
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(line = %line, pages, count = stations.len(), "Station scan complete");
        Ok(stations)
    }
}

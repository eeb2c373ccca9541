//! DynamoDB-backed preference store and station directory.
//!
//! Tables:
//! - `favorite_station`: `user_id` (key), `station_id`, `station_name`
//! - `last_direction`: `user_id` (key), `direction` (`"1"` or `"5"`)
//! - `el_stations`: `MAP_ID`, `STATION_NAME`, and a `"TRUE"`/`"FALSE"`
//!   attribute per line code

mod preferences;
mod stations;

pub use preferences::DynamoPreferenceStore;
pub use stations::DynamoStationDirectory;

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

type Item = HashMap<String, AttributeValue>;

/// Reads a string-ish attribute. Numbers come back in their text form.
fn string_attr(item: &Item, name: &str) -> Option<String> {
    match item.get(name)? {
        AttributeValue::S(s) | AttributeValue::N(s) => Some(s.clone()),
        _ => None,
    }
}

//! XML parser for Train Tracker arrivals responses.

use chrono::NaiveDateTime;
use roxmltree::{Document, Node};

use crate::error::FeedError;
use crate::types::{ArrivalRecord, Direction};

/// Timestamp format used by `prdt` and `arrT`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Parses a `ttarrivals` response, keeping only trains headed in `direction`.
///
/// Entries come back in the order the provider listed them. Entries for the
/// other direction are skipped without inspecting their timestamps.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML, the provider
/// reports a non-zero `errCd`, or a kept entry has a missing field or an
/// unparseable timestamp.
pub fn parse_arrivals(xml: &str, direction: Direction) -> Result<Vec<ArrivalRecord>, FeedError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if let Some(code) = child_text(root, "errCd") {
        if code != "0" {
            return Err(FeedError::Provider {
                code: code.to_string(),
                message: child_text(root, "errNm").unwrap_or_default().to_string(),
            });
        }
    }

    let mut arrivals = Vec::new();
    for eta in root.children().filter(|n| n.has_tag_name("eta")) {
        if required_text(eta, "trDr")? != direction.code() {
            continue;
        }
        let predicted = parse_timestamp(required_text(eta, "prdt")?)?;
        let arrival = parse_timestamp(required_text(eta, "arrT")?)?;
        arrivals.push(ArrivalRecord::new(direction, predicted, arrival)?);
    }

    Ok(arrivals)
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, FeedError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|source| {
        FeedError::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
}

fn required_text<'a>(node: Node<'a, '_>, name: &'static str) -> Result<&'a str, FeedError> {
    child_text(node, name).ok_or(FeedError::MissingField(name))
}

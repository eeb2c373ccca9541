//! Station directory backed by the CTA "L" stops CSV.
//!
//! The published list has one row per stop (platform and direction), a
//! `MAP_ID` / `STATION_NAME` pair identifying the parent station, and one
//! `true`/`false` column per line code.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Read;

use crate::services::StationDirectory;
use crate::types::{Line, StationCandidate};

struct StopRow {
    station: StationCandidate,
    lines: Vec<Line>,
}

pub struct CsvStationDirectory {
    rows: Vec<StopRow>,
}

impl CsvStationDirectory {
    pub fn from_path(path: &str) -> Result<Self> {
        let file =
            std::fs::File::open(path).with_context(|| format!("opening station list {path}"))?;
        Self::from_reader(file).with_context(|| format!("reading station list {path}"))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for result in rdr.deserialize() {
            let record: HashMap<String, String> = result?;
            let field = |name: &str| {
                record
                    .get(name)
                    .map(|v| v.trim().to_string())
                    .with_context(|| format!("station list has no {name} column"))
            };

            let station = StationCandidate::new(field("MAP_ID")?, field("STATION_NAME")?);
            let lines = Line::ALL
                .into_iter()
                .filter(|line| {
                    record
                        .get(line.code())
                        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
                })
                .collect();

            rows.push(StopRow { station, lines });
        }

        Ok(Self { rows })
    }
}

#[async_trait]
impl StationDirectory for CsvStationDirectory {
    async fn stations_on_line(&self, line: Line) -> Result<Vec<StationCandidate>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.lines.contains(&line))
            .map(|row| row.station.clone())
            .collect())
    }
}

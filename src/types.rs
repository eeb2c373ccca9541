//! Domain types shared by the resolver, feed client, composer and router.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FeedError, SkillError};

/// One of the eight CTA "L" lines, named by color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Blue,
    Brown,
    Green,
    Orange,
    Pink,
    Purple,
    Red,
    Yellow,
}

impl Line {
    pub const ALL: [Line; 8] = [
        Line::Blue,
        Line::Brown,
        Line::Green,
        Line::Orange,
        Line::Pink,
        Line::Purple,
        Line::Red,
        Line::Yellow,
    ];

    /// Spoken color name, lower case.
    pub fn name(self) -> &'static str {
        match self {
            Line::Blue => "blue",
            Line::Brown => "brown",
            Line::Green => "green",
            Line::Orange => "orange",
            Line::Pink => "pink",
            Line::Purple => "purple",
            Line::Red => "red",
            Line::Yellow => "yellow",
        }
    }

    /// Column name the station directory uses to flag stops on this line.
    pub fn code(self) -> &'static str {
        match self {
            Line::Blue => "BLUE",
            Line::Brown => "BRN",
            Line::Green => "G",
            Line::Orange => "O",
            Line::Pink => "Pnk",
            Line::Purple => "P",
            Line::Red => "RED",
            Line::Yellow => "Y",
        }
    }
}

impl FromStr for Line {
    type Err = SkillError;

    /// Parses a spoken line name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spoken = s.trim();
        Line::ALL
            .into_iter()
            .find(|line| line.name().eq_ignore_ascii_case(spoken))
            .ok_or_else(|| SkillError::UnknownLine(s.to_string()))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of travel. The Train Tracker encodes these as `1` and `5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Northbound,
    Southbound,
}

impl Direction {
    /// Provider code, as found in `trDr` and in the `last_direction` table.
    pub fn code(self) -> &'static str {
        match self {
            Direction::Northbound => "1",
            Direction::Southbound => "5",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, SkillError> {
        match code {
            "1" => Ok(Direction::Northbound),
            "5" => Ok(Direction::Southbound),
            other => Err(SkillError::InvalidDirection(other.to_string())),
        }
    }

    /// Normalizes a spoken direction slot value.
    pub fn from_spoken(value: &str) -> Result<Self, SkillError> {
        let spoken = value.trim();
        if spoken.eq_ignore_ascii_case("northbound") {
            Ok(Direction::Northbound)
        } else if spoken.eq_ignore_ascii_case("southbound") {
            Ok(Direction::Southbound)
        } else {
            Err(SkillError::InvalidDirection(value.to_string()))
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Direction::Northbound => "northbound",
            Direction::Southbound => "southbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A station as identified by the provider: map id plus display name.
///
/// Used both for resolver candidates and for a user's saved favorite, which
/// is always exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationCandidate {
    pub station_id: String,
    pub station_name: String,
}

impl StationCandidate {
    pub fn new(station_id: impl Into<String>, station_name: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            station_name: station_name.into(),
        }
    }
}

/// Everything we remember about one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPreference {
    pub favorite_station: Option<StationCandidate>,
    pub last_direction: Option<Direction>,
}

/// One upcoming train, as reported by the arrivals feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRecord {
    pub direction: Direction,
    pub predicted_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

impl ArrivalRecord {
    /// Builds a record, rejecting arrivals that precede their prediction.
    pub fn new(
        direction: Direction,
        predicted_time: NaiveDateTime,
        arrival_time: NaiveDateTime,
    ) -> Result<Self, FeedError> {
        if arrival_time < predicted_time {
            return Err(FeedError::NegativeInterval {
                predicted: predicted_time,
                arrival: arrival_time,
            });
        }
        Ok(Self {
            direction,
            predicted_time,
            arrival_time,
        })
    }

    pub fn wait_interval(&self) -> TimeDelta {
        self.arrival_time - self.predicted_time
    }

    /// Minutes component of the wait interval (0-59).
    ///
    /// Waits of an hour or more report only the minutes past the hour.
    pub fn minutes(&self) -> i64 {
        self.wait_interval().num_minutes() % 60
    }
}

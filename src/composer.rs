//! Turns parsed arrivals into the sentence read back to the user.

use crate::types::{ArrivalRecord, Direction};

/// Composes the arrivals summary for `station_name`.
///
/// Phrasing depends on how many trains were found. At most three are read
/// out; anything past the third is left out to keep the answer short.
pub fn compose(direction: Direction, station_name: &str, arrivals: &[ArrivalRecord]) -> String {
    match arrivals {
        [] => format!("No {direction} trains found."),
        [only] => format!(
            "I only found one {direction} train for {station_name}. It arrives in {}.",
            minutes_text(only.minutes())
        ),
        [first, second] => format!(
            "{} trains arriving at {station_name} in {} and {}.",
            capitalized(direction),
            minutes_text(first.minutes()),
            minutes_text(second.minutes())
        ),
        [first, second, third, ..] => format!(
            "{} trains arriving at {station_name} in {}, {}, and {}.",
            capitalized(direction),
            minutes_text(first.minutes()),
            minutes_text(second.minutes()),
            minutes_text(third.minutes())
        ),
    }
}

/// "1 minute", "0 minutes", "7 minutes".
pub fn minutes_text(minutes: i64) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

fn capitalized(direction: Direction) -> &'static str {
    match direction {
        Direction::Northbound => "Northbound",
        Direction::Southbound => "Southbound",
    }
}

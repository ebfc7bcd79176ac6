//! The institution's class periods and their local wall-clock times.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Deserialize;

use crate::error::{ConfigError, FeedError, FeedResult};

/// A local time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
}

impl WallClock {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ConfigError> {
        if hour > 23 || minute > 59 {
            return Err(ConfigError::TimeOfDay(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }
}

impl FromStr for WallClock {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::TimeOfDay(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for WallClock {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The local start and end of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTime {
    pub start: WallClock,
    pub end: WallClock,
}

/// One row of the period table as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeriodEntry {
    pub period: u32,
    pub start: WallClock,
    pub end: WallClock,
}

/// Maps a period number to its local time slot.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTimetable {
    periods: BTreeMap<u32, PeriodTime>,
}

impl PeriodTimetable {
    /// Build a timetable, checking that every period ends after it starts and
    /// that no period is listed twice.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = PeriodEntry>,
    {
        let mut periods = BTreeMap::new();
        for entry in entries {
            if entry.start >= entry.end {
                return Err(ConfigError::Timetable(format!(
                    "period {} starts at {} but ends at {}",
                    entry.period, entry.start, entry.end
                )));
            }
            let time = PeriodTime {
                start: entry.start,
                end: entry.end,
            };
            if periods.insert(entry.period, time).is_some() {
                return Err(ConfigError::Timetable(format!(
                    "period {} is listed more than once",
                    entry.period
                )));
            }
        }
        if periods.is_empty() {
            return Err(ConfigError::Timetable(String::from("no periods configured")));
        }
        Ok(Self { periods })
    }

    /// Look up the local time slot of a period.
    pub fn resolve(&self, period: u32) -> FeedResult<PeriodTime> {
        self.periods
            .get(&period)
            .copied()
            .ok_or(FeedError::InvalidPeriod { period })
    }

    /// Iterate over the configured periods in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, PeriodTime)> + '_ {
        self.periods.iter().map(|(period, time)| (*period, *time))
    }
}

/// The reference timetable.
///
/// <https://www.naist.jp/campuslife/information/calendar.html>
pub fn default_entries() -> Vec<PeriodEntry> {
    [
        (1, (9, 20), (10, 50)),
        (2, (11, 0), (12, 30)),
        (3, (13, 30), (15, 0)),
        (4, (15, 10), (16, 40)),
        (5, (16, 50), (18, 20)),
        (6, (18, 30), (20, 0)),
    ]
    .into_iter()
    .map(|(period, (start_hour, start_minute), (end_hour, end_minute))| PeriodEntry {
        period,
        start: WallClock {
            hour: start_hour,
            minute: start_minute,
        },
        end: WallClock {
            hour: end_hour,
            minute: end_minute,
        },
    })
    .collect()
}

impl Default for PeriodTimetable {
    fn default() -> Self {
        let periods = default_entries()
            .into_iter()
            .map(|entry| {
                (
                    entry.period,
                    PeriodTime {
                        start: entry.start,
                        end: entry.end,
                    },
                )
            })
            .collect();
        Self { periods }
    }
}

//! Turns session labels like `5/12[3]` into absolute instants.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;

use crate::{
    error::{FeedError, FeedResult},
    period_timetable::{PeriodTimetable, WallClock},
};

/// The reference deployment's offset from UTC in hours (JST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

const HOURS_PER_DAY: i64 = 24;

fn label_regex() -> &'static Regex {
    static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();
    LABEL_REGEX.get_or_init(|| {
        Regex::new(
            r"(?x)
                ^\s*
                (?P<month>[^/\[]*) # the month
                /
                (?P<day>[^\[]*) # the day
                (?:
                    \[
                    (?P<period>[^\]]*) # the period
                    \]
                )?
                \s*$
            ",
        )
        .expect("session label pattern is valid")
    })
}

/// Resolves session labels against a timetable in a fixed local offset.
#[derive(Debug, Clone)]
pub struct DateTimeResolver {
    timetable: Arc<PeriodTimetable>,
    utc_offset_hours: i32,
}

impl DateTimeResolver {
    pub fn new(timetable: Arc<PeriodTimetable>, utc_offset_hours: i32) -> Self {
        Self {
            timetable,
            utc_offset_hours,
        }
    }

    /// Resolve a label of the form `MM/DD[period]` within `year` to its UTC
    /// start and end instants.
    pub fn resolve(&self, label: &str, year: &str) -> FeedResult<(DateTime<Utc>, DateTime<Utc>)> {
        let (month, day, period) = parse_label(label)?;
        let period_time = self.timetable.resolve(period)?;
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| FeedError::malformed(label, format!("invalid year: {year}")))?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| FeedError::malformed(label, format!("no such date in {year}")))?;
        let start = self.normalize(label, date, period_time.start)?;
        let end = self.normalize(label, date, period_time.end)?;
        Ok((start, end))
    }

    /// Shift a local wall-clock time on `date` to UTC.
    ///
    /// The hour is reduced modulo 24 and the quotient is carried into the
    /// date, so any offset and any period table roll over correctly.
    fn normalize(&self, label: &str, date: NaiveDate, time: WallClock) -> FeedResult<DateTime<Utc>> {
        let shifted = i64::from(time.hour) - i64::from(self.utc_offset_hours);
        let day_offset = shifted.div_euclid(HOURS_PER_DAY);
        let hour = shifted.rem_euclid(HOURS_PER_DAY);
        let out_of_range = || FeedError::malformed(label, "date out of range");
        let date = date
            .checked_add_signed(Duration::days(day_offset))
            .ok_or_else(out_of_range)?;
        let hour = u32::try_from(hour).map_err(|_| out_of_range())?;
        let naive = date
            .and_hms_opt(hour, time.minute, 0)
            .ok_or_else(out_of_range)?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

/// Split a label into month, day and period.
fn parse_label(label: &str) -> FeedResult<(u32, u32, u32)> {
    let captures = label_regex()
        .captures(label)
        .ok_or_else(|| FeedError::malformed(label, "expected MM/DD[period]"))?;
    let number = |name: &str| -> FeedResult<u32> {
        let Some(value) = captures.name(name) else {
            return Err(FeedError::malformed(label, format!("missing {name}")));
        };
        let value = value.as_str().trim();
        if value.is_empty() {
            return Err(FeedError::malformed(label, format!("missing {name}")));
        }
        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(FeedError::malformed(label, format!("non-numeric {name}: {value}")));
        }
        value
            .parse()
            .map_err(|_| FeedError::malformed(label, format!("{name} out of range: {value}")))
    };
    Ok((number("month")?, number("day")?, number("period")?))
}

//! Builds calendar events from the sessions of the selected courses.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{
    catalog::{Course, Session},
    date_time_resolver::DateTimeResolver,
    error::FeedResult,
};

/// Separates the course name from the session theme in event titles.
static TITLE_SEPARATOR: &str = " | ";
static ESCAPED_NEWLINE: &str = "\\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transparency {
    Opaque,
}

impl Transparency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opaque => "OPAQUE",
        }
    }
}

/// One class session, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub feed_title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub location: String,
    pub description: String,
    pub status: EventStatus,
    pub transparency: Transparency,
    pub uid: String,
}

/// Turns courses into calendar events.
#[derive(Debug, Clone)]
pub struct EventAssembler {
    resolver: DateTimeResolver,
    app_name: String,
    detail_url: String,
    uid_domain: String,
}

impl EventAssembler {
    pub fn new(
        resolver: DateTimeResolver,
        app_name: impl Into<String>,
        detail_url: impl Into<String>,
        uid_domain: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            app_name: app_name.into(),
            detail_url: detail_url.into(),
            uid_domain: uid_domain.into(),
        }
    }

    /// The calendar name used when no single course names the feed.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Build one event per session, in course order and then session order.
    ///
    /// Fails on the first session whose label cannot be resolved; no partial
    /// list is ever returned.
    pub fn assemble(&self, courses: &[&Course], year: &str) -> FeedResult<Vec<CalendarEvent>> {
        let feed_title = match courses {
            [course] => course.class_name().to_string(),
            _ => self.app_name.clone(),
        };
        let mut events = vec![];
        for course in courses {
            for (position, session) in course.schedule.iter().enumerate() {
                events.push(self.build_event(course, session, position + 1, year, &feed_title)?);
            }
        }
        Ok(events)
    }

    fn build_event(
        &self,
        course: &Course,
        session: &Session,
        sequence: usize,
        year: &str,
        feed_title: &str,
    ) -> FeedResult<CalendarEvent> {
        let (start, end) = self.resolver.resolve(&session.datetime, year)?;
        let title = format!(
            "{}{TITLE_SEPARATOR}{}",
            course.class_name(),
            unescape_newlines(&session.theme)
        );
        let description = format!(
            "{}\n{}",
            unescape_newlines(&session.content),
            self.detail_page(course.class_code())
        );
        Ok(CalendarEvent {
            feed_title: feed_title.to_string(),
            start,
            end,
            title,
            location: session.room.clone(),
            description,
            status: EventStatus::Confirmed,
            transparency: Transparency::Opaque,
            uid: uid(year, course.class_code(), sequence, &self.uid_domain),
        })
    }

    fn detail_page(&self, class_code: &str) -> String {
        format!("{}/{class_code}", self.detail_url.trim_end_matches('/'))
    }
}

/// Replace the literal two-character `\n` sequences of the catalog with line
/// breaks.
fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, "\n")
}

/// Get a unique id for a specific session of a course in a year.
///
/// Changing this function is a breaking change! Subscribed calendars would see
/// every session as a new event.
fn uid(year: &str, class_code: &str, sequence: usize, domain: &str) -> String {
    static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
    let whitespace_regex =
        WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
    let whitespace_rep = "-";
    let year = whitespace_regex.replace_all(year.trim(), whitespace_rep);
    let class_code = whitespace_regex.replace_all(class_code.trim(), whitespace_rep);
    format!("{year}-{class_code}-{sequence}@{domain}")
}

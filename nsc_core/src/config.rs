//! Configuration, read once at startup from an optional TOML file.

use std::{fs::read_to_string, path::Path, sync::Arc};

use serde::Deserialize;

use crate::{
    date_time_resolver::{DateTimeResolver, DEFAULT_UTC_OFFSET_HOURS},
    error::ConfigError,
    event_assembler::EventAssembler,
    period_timetable::{default_entries, PeriodEntry, PeriodTimetable},
    syllabus_client::DEFAULT_CATALOG_URL,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: Server,
    pub catalog: Catalog,
    pub feed: Feed,
    pub periods: Periods,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Server {
    /// The socket address the server listens on.
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    /// Where the catalog of a year and language is published, with `{year}`
    /// and `{lang}` placeholders.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Feed {
    /// Calendar name of feeds spanning several courses.
    pub app_name: String,
    /// Course detail pages live at `<detail_url>/<class_code>`.
    pub detail_url: String,
    /// Right-hand side of every event UID.
    pub uid_domain: String,
    /// Offset of the institution's wall clock from UTC.
    pub utc_offset_hours: i32,
}

/// The period table, written as `[[periods.period]]` entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Periods {
    #[serde(rename = "period")]
    pub entries: Vec<PeriodEntry>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            address: String::from("0.0.0.0:8008"),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_CATALOG_URL),
        }
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            app_name: String::from("NAIST Syllabus App"),
            detail_url: String::from("https://syllabus.naist.yashikota.com"),
            uid_domain: String::from("syllabus.naist.yashikota.com"),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl Default for Periods {
    fn default() -> Self {
        Self {
            entries: default_entries(),
        }
    }
}

impl Config {
    /// Load the configuration file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let string = read_to_string(path)?;
        let config = Self::from_toml(&string)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(string: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(string)?;
        // Surface an invalid table at startup rather than on the first request.
        config.timetable()?;
        Ok(config)
    }

    pub fn timetable(&self) -> Result<PeriodTimetable, ConfigError> {
        PeriodTimetable::from_entries(self.periods.entries.iter().cloned())
    }

    /// Wire the resolver and the assembler from this configuration.
    pub fn event_assembler(&self) -> Result<EventAssembler, ConfigError> {
        let resolver = DateTimeResolver::new(Arc::new(self.timetable()?), self.feed.utc_offset_hours);
        Ok(EventAssembler::new(
            resolver,
            &self.feed.app_name,
            &self.feed.detail_url,
            &self.feed.uid_domain,
        ))
    }

    /// The `PRODID` of generated calendars.
    pub fn prod_id(&self) -> String {
        format!("-//{}//{}", self.feed.app_name, self.feed.uid_domain)
    }
}

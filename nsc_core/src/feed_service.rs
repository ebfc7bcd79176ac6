//! Runs one feed request from validation to encoded calendar text.

use chrono::Utc;

use crate::{
    error::{FeedError, FeedResult},
    event_assembler::EventAssembler,
    feed_encoder::FeedEncoder,
    syllabus_client::{CatalogSource, Language},
};

/// The file name calendars are offered under.
pub static FILE_NAME: &str = "course-schedule.ics";
/// The MIME type of the generated feed.
pub static CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// A validated feed request, independent of how it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub year: String,
    pub lang: Language,
    pub class_codes: Vec<String>,
}

impl FeedRequest {
    /// Validate the raw parameters of a request.
    ///
    /// `class_codes` is a comma-separated list; blank entries are ignored.
    pub fn parse(
        year: Option<&str>,
        lang: Option<&str>,
        class_codes: Option<&str>,
    ) -> FeedResult<Self> {
        let year = match year.map(str::trim) {
            None | Some("") => return Err(FeedError::validation("year is required")),
            Some(year) if !year.bytes().all(|byte| byte.is_ascii_digit()) => {
                return Err(FeedError::validation("year must be numeric"))
            }
            Some(year) => year.to_string(),
        };
        let lang = match lang.map(str::trim) {
            None | Some("") => return Err(FeedError::validation("lang is required")),
            Some(lang) => lang.parse::<Language>()?,
        };
        let class_codes: Vec<String> = class_codes
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|class_code| !class_code.is_empty())
            .map(String::from)
            .collect();
        if class_codes.is_empty() {
            return Err(FeedError::validation("class_codes is required"));
        }
        Ok(Self {
            year,
            lang,
            class_codes,
        })
    }
}

/// Generates calendar feeds from a catalog source.
pub struct FeedService<S> {
    source: S,
    assembler: EventAssembler,
    prod_id: String,
}

impl<S: CatalogSource> FeedService<S> {
    pub fn new(source: S, assembler: EventAssembler, prod_id: impl Into<String>) -> Self {
        Self {
            source,
            assembler,
            prod_id: prod_id.into(),
        }
    }

    /// Fetch, filter, assemble and encode.
    ///
    /// Class codes missing from the catalog are skipped, so a request matching
    /// nothing yields an empty calendar.
    #[tracing::instrument(skip_all, fields(year = %request.year, lang = %request.lang))]
    pub async fn generate(&self, request: &FeedRequest) -> FeedResult<String> {
        let catalog = self.source.fetch(&request.year, request.lang).await?;
        tracing::debug!(courses = catalog.len(), "fetched catalog");
        let courses = catalog.select(&request.class_codes);
        tracing::debug!(
            requested = request.class_codes.len(),
            found = courses.len(),
            "filtered courses"
        );
        let events = self.assembler.assemble(&courses, &request.year)?;
        tracing::debug!(events = events.len(), "assembled events");
        let encoder = FeedEncoder::new(&self.prod_id, self.assembler.app_name(), Utc::now());
        encoder.encode(&events)
    }
}

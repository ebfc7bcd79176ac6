//! This crate turns NAIST syllabus course schedules into iCalendar feeds.
//!
//! The catalog is read from <https://yashikota.github.io/syllabus/>, one JSON
//! document per year and language. Each class session becomes one event whose
//! start and end are derived from the session's `MM/DD[period]` label.

pub mod catalog;
pub mod config;
pub mod date_time_resolver;
pub mod error;
pub mod event_assembler;
pub mod feed_encoder;
pub mod feed_service;
pub mod period_timetable;
pub mod syllabus_client;

pub use error::{ConfigError, FeedError, FeedResult};

//! Error types of the feed pipeline.

use thiserror::Error;

/// Result type of the feed pipeline.
pub type FeedResult<T> = Result<T, FeedError>;

/// Everything that can stop a feed from being generated.
///
/// No stage recovers from these; the first one raised ends the request.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request is missing a parameter or carries an invalid one.
    #[error("{0}")]
    Validation(String),

    /// The catalog could not be retrieved or parsed.
    #[error("Failed to fetch the course catalog: {0}")]
    UpstreamFetch(String),

    /// A session label does not follow the `MM/DD[period]` grammar.
    #[error("Failed to parse datetime: {label}, {reason}")]
    MalformedDateTime { label: String, reason: String },

    /// A session label references a period missing from the timetable.
    #[error("Invalid period: {period}")]
    InvalidPeriod { period: u32 },

    /// The encoder was handed events it cannot serialize faithfully.
    #[error("Failed to encode calendar feed: {0}")]
    Encoding(String),
}

impl FeedError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an upstream fetch error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFetch(message.into())
    }

    /// Creates a malformed date time error for the given label.
    pub fn malformed(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDateTime {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Whether the error was caused by the caller rather than by generation.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamFetch(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        Self::UpstreamFetch(err.to_string())
    }
}

/// Errors raised while loading the configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML or has unexpected keys.
    #[error("Failed to parse configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The period table violates one of its invariants.
    #[error("Invalid period table: {0}")]
    Timetable(String),

    /// A time of day is not written as `HH:MM`.
    #[error("Invalid time of day: {0}")]
    TimeOfDay(String),
}

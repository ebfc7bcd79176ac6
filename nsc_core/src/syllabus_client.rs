//! This client fetches the syllabus catalog of a year and language.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use reqwest::Response;

use crate::{
    catalog::Catalog,
    error::{FeedError, FeedResult},
};

pub static DEFAULT_CATALOG_URL: &str = "https://yashikota.github.io/syllabus/{year}-{lang}.json";

/// The languages the catalog is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Ja,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Ja, Language::En];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = FeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|language| language.code() == value)
            .ok_or_else(|| {
                let allowed: Vec<String> = Self::ALL
                    .iter()
                    .map(|language| format!("'{language}'"))
                    .collect();
                FeedError::validation(format!("lang must be {}", allowed.join(" or ")))
            })
    }
}

/// Somewhere a catalog can be read from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, year: &str, lang: Language) -> FeedResult<Catalog>;
}

/// Reads the catalog from the published JSON documents.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url_template: String,
}

impl HttpCatalogSource {
    /// `url_template` may contain the placeholders `{year}` and `{lang}`.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url_template: url_template.into(),
        }
    }

    fn url(&self, year: &str, lang: Language) -> String {
        self.url_template
            .replace("{year}", year)
            .replace("{lang}", lang.code())
    }

    /// Get the catalog response from the publishing server.
    async fn get_response(&self, year: &str, lang: Language) -> FeedResult<Response> {
        let url = self.url(year, lang);
        tracing::debug!(%url, "fetching catalog");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response)
    }
}

impl Default for HttpCatalogSource {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_URL)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, year: &str, lang: Language) -> FeedResult<Catalog> {
        let response = self.get_response(year, lang).await?;
        parse(&response.text().await?)
    }
}

/// A catalog that is already in memory, e.g. read from a local file.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    catalog: Catalog,
}

impl StaticCatalogSource {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Read a catalog JSON document.
    pub fn from_json(json: &str) -> FeedResult<Self> {
        Ok(Self::new(parse(json)?))
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self, _year: &str, _lang: Language) -> FeedResult<Catalog> {
        Ok(self.catalog.clone())
    }
}

/// Parse the catalog JSON document.
fn parse(json: &str) -> FeedResult<Catalog> {
    let catalog = Catalog::from_json(json)?;
    tracing::debug!(courses = catalog.len(), "parsed catalog");
    Ok(catalog)
}

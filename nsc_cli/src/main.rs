use std::{env::current_dir, fs::read_to_string, fs::write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use nsc_core::{
    config::Config,
    feed_service::{FeedRequest, FeedService, FILE_NAME},
    syllabus_client::{CatalogSource, HttpCatalogSource, StaticCatalogSource},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the academic year, e.g. 2024
    pub year: String,
    /// the catalog language, `ja` or `en`
    pub lang: String,
    /// comma-separated class codes
    pub class_codes: String,
    /// the configuration file, defaults are used when omitted
    #[arg(long, env = "NSC_CONFIG")]
    pub config: Option<PathBuf>,
    /// read the catalog from this JSON file instead of downloading it
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// where to write the calendar, defaults to `course-schedule.ics` in the current directory
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Arguments::parse();
    let config = Config::load(args.config.as_deref())?;
    let request = FeedRequest::parse(Some(&args.year), Some(&args.lang), Some(&args.class_codes))?;
    let calendar = match &args.catalog {
        Some(path) => {
            let json = read_to_string(path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            generate(StaticCatalogSource::from_json(&json)?, &config, &request).await?
        }
        None => generate(HttpCatalogSource::new(&config.catalog.url), &config, &request).await?,
    };
    let path = match args.output {
        Some(path) => path,
        None => {
            let mut path = current_dir()?;
            path.push(FILE_NAME);
            path
        }
    };
    write(&path, calendar)?;
    tracing::info!(path = %path.display(), "wrote calendar");
    Ok(())
}

async fn generate<S: CatalogSource>(
    source: S,
    config: &Config,
    request: &FeedRequest,
) -> Result<String> {
    let service = FeedService::new(source, config.event_assembler()?, config.prod_id());
    Ok(service.generate(request).await?)
}

//! This crate implements an iCalendar server serving NAIST course schedules as events.
//!
//! Feeds are available at `/?year=<year>&lang=<ja|en>&class_codes=<codes>` and,
//! for `webcal://` subscriptions, at `/ics/<year>/<lang>/<codes>`.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use nsc_core::{config::Config, feed_service::FeedService, syllabus_client::HttpCatalogSource};
use tracing_subscriber::EnvFilter;

mod route;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the configuration file, defaults are used when omitted
    #[arg(long, env = "NSC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Arguments::parse();
    let config = Config::load(args.config.as_deref())?;
    let service = FeedService::new(
        HttpCatalogSource::new(&config.catalog.url),
        config.event_assembler()?,
        config.prod_id(),
    );
    let app = route::router(Arc::new(service));
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .with_context(|| format!("invalid server address {}", config.server.address))?;
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

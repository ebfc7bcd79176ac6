pub mod calendar;

use std::sync::Arc;

use axum::{routing::get, Router};
use nsc_core::{feed_service::FeedService, syllabus_client::CatalogSource};
use tower_http::trace::TraceLayer;

/// Both request shapes share one handler behind thin adapters.
pub fn router<S>(service: Arc<FeedService<S>>) -> Router
where
    S: CatalogSource + 'static,
{
    Router::new()
        .route("/", get(calendar::query_handler::<S>))
        .route("/ics/:year/:lang/:class_codes", get(calendar::path_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

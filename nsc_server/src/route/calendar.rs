use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use nsc_core::{
    feed_service::{FeedRequest, FeedService, CONTENT_TYPE as CALENDAR_CONTENT_TYPE, FILE_NAME},
    syllabus_client::CatalogSource,
    FeedError,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    year: Option<String>,
    lang: Option<String>,
    class_codes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathParams {
    year: String,
    lang: String,
    class_codes: String,
}

impl TryFrom<QueryParams> for FeedRequest {
    type Error = FeedError;

    fn try_from(value: QueryParams) -> Result<Self, Self::Error> {
        FeedRequest::parse(
            value.year.as_deref(),
            value.lang.as_deref(),
            value.class_codes.as_deref(),
        )
    }
}

impl TryFrom<PathParams> for FeedRequest {
    type Error = FeedError;

    fn try_from(value: PathParams) -> Result<Self, Self::Error> {
        FeedRequest::parse(
            Some(&value.year),
            Some(&value.lang),
            Some(&value.class_codes),
        )
    }
}

fn error_response(err: FeedError) -> (StatusCode, String) {
    if err.is_client_error() {
        tracing::info!(%err, "rejected calendar request");
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        tracing::error!(%err, "failed to generate calendar");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error generating calendar: {err}"),
        )
    }
}

pub async fn handle<S: CatalogSource>(
    service: &FeedService<S>,
    request: Result<FeedRequest, FeedError>,
) -> Result<Response, (StatusCode, String)> {
    let request = request.map_err(error_response)?;
    let ical_calendar = service.generate(&request).await.map_err(error_response)?;
    let response = (
        [
            (CONTENT_TYPE, String::from(CALENDAR_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, format!("attachment; filename={FILE_NAME}")),
        ],
        ical_calendar,
    )
        .into_response();
    Ok(response)
}

/// Handle calendar requests.
///
/// The `year`, `lang` and `class_codes` must be given in the query string.
pub async fn query_handler<S: CatalogSource>(
    State(service): State<Arc<FeedService<S>>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Response, (StatusCode, String)> {
    handle(&service, FeedRequest::try_from(query_params)).await
}

/// Handle calendar subscriptions, e.g. `webcal://host/ics/2024/ja/4001,4002`.
pub async fn path_handler<S: CatalogSource>(
    State(service): State<Arc<FeedService<S>>>,
    Path(path_params): Path<PathParams>,
) -> Result<Response, (StatusCode, String)> {
    handle(&service, FeedRequest::try_from(path_params)).await
}

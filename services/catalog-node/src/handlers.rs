use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use orbital_catalog::{Launch, NewLaunch, Pagination, Planet, ScheduleError, StoreError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

/// Error body returned to clients as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!("Catalog store failure: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Catalog store unavailable")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::UnknownTarget { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            ScheduleError::Store(e) => e.into(),
        }
    }
}

/// Launch submission body; every field is required
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    mission: Option<String>,
    rocket: Option<String>,
    launch_date: Option<String>,
    target: Option<String>,
}

impl LaunchRequest {
    fn validate(self) -> Result<NewLaunch, ApiError> {
        let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());

        let (Some(mission), Some(rocket), Some(launch_date), Some(target)) = (
            present(self.mission),
            present(self.rocket),
            present(self.launch_date),
            present(self.target),
        ) else {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Missing required launch property",
            ));
        };

        let launch_date = parse_launch_date(&launch_date)
            .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Invalid launch date"))?;

        Ok(NewLaunch {
            mission,
            rocket,
            launch_date,
            target,
        })
    }
}

/// Accept RFC 3339 timestamps, plain ISO dates and dates like
/// "February 24, 2030". Bare dates are taken as midnight UTC.
pub fn parse_launch_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }

    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Raw `page`/`limit` query values. Anything that is not an integer falls
/// back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct LaunchListParams {
    page: Option<String>,
    limit: Option<String>,
}

impl LaunchListParams {
    fn pagination(&self) -> Pagination {
        let number = |raw: &Option<String>| -> Option<i64> { raw.as_deref().and_then(|v| v.trim().parse().ok()) };
        Pagination {
            page: number(&self.page),
            limit: number(&self.limit),
        }
    }
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "catalog-node",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn get_all_planets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Planet>>, ApiError> {
    Ok(Json(state.catalog.list_planets().await?))
}

pub async fn get_all_launches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LaunchListParams>,
) -> Result<Json<Vec<Launch>>, ApiError> {
    Ok(Json(state.catalog.list_launches(params.pagination()).await?))
}

pub async fn add_new_launch(
    State(state): State<Arc<AppState>>,
    request: Result<Json<LaunchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Launch>), ApiError> {
    let Json(request) = request?;
    let request = request.validate()?;
    let launch = state.catalog.schedule_launch(request).await?;
    Ok((StatusCode::CREATED, Json(launch)))
}

pub async fn abort_launch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let not_found = || ApiError::new(StatusCode::NOT_FOUND, "Launch not found");

    let flight_number: i64 = id.trim().parse().map_err(|_| not_found())?;
    if !state.catalog.launch_exists(flight_number).await? {
        return Err(not_found());
    }

    if !state.catalog.abort_launch(flight_number).await? {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Launch not aborted"));
    }

    Ok(Json(json!({ "ok": true })))
}

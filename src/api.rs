//! dashsrv HTTP API
//!
//! Serves the dashboard page and the JSON endpoints it calls on
//! date-range changes and on the hourly refresh tick.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::chart::Panel;
use crate::config::Config;
use crate::dashboard;
use crate::error::DashSrvError;
use crate::pipeline::{self, SourceDescriptor};
use crate::store::DateRange;
use crate::sun;
use crate::{SERVICE_NAME, SERVICE_VERSION};

/// Shared router state: the configured sources with their store
/// handles, plus the loaded configuration.
#[derive(Clone)]
pub struct ApiState {
    pub sources: Arc<Vec<SourceDescriptor>>,
    pub config: Arc<Config>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Chart data response
#[derive(Serialize)]
pub struct ChartResponse {
    /// Banner text echoing the effective range.
    pub range: String,
    pub panels: Vec<Panel>,
}

/// Sun banner response
#[derive(Serialize)]
pub struct SunResponse {
    pub info: String,
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: i64,
}

impl From<DashSrvError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: DashSrvError) -> Self {
        let (status, code) = match &err {
            DashSrvError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
            DashSrvError::Astronomy(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ASTRONOMY"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let response = ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
            timestamp: Utc::now().timestamp(),
        };

        (status, Json(response))
    }
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Date-range query parameters; absent bounds default to
/// today..tomorrow in the configured timezone.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Build the dashboard router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health_check))
        .route("/api/chart", get(chart_data))
        .route("/api/sun", get(sun_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Dashboard HTML page
async fn dashboard_page(State(state): State<ApiState>) -> Html<String> {
    Html(dashboard::render(&state.config))
}

/// Health check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
    })
}

/// Run the query pipeline for the requested range.
async fn chart_data(
    State(state): State<ApiState>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<ChartResponse> {
    let tz = state.config.location.timezone;
    let default = DateRange::today_and_tomorrow(tz);
    let range = DateRange::new(
        query.start.unwrap_or(default.start),
        query.end.unwrap_or(default.end),
    )?;

    let spec = pipeline::run(&state.sources, &range).await;

    Ok(Json(ChartResponse {
        range: format!("{} - {}", range.start, range.end),
        panels: spec.panels,
    }))
}

/// Sunrise/sunset banner for the current date.
async fn sun_info(State(state): State<ApiState>) -> ApiResult<SunResponse> {
    let location = &state.config.location;
    let today = Utc::now().with_timezone(&location.timezone).date_naive();
    let info = sun::daily_info(
        location.latitude,
        location.longitude,
        today,
        location.timezone,
    )?;

    Ok(Json(SunResponse { info }))
}

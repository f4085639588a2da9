//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use modguard_engine::EngineError;
use modguard_store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::state::AppState;

/// Header carrying the authenticated user's e-mail address
pub const USER_HEADER: &str = "x-user-email";

/// Status reported for requests still awaiting a verdict
const STATUS_PROCESSING: &str = "processing";

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/v1/moderate/text", post(moderate_text))
        .route("/api/v1/moderate/image", post(moderate_image))
        .route("/api/v1/moderate/:id", get(moderation_status))
        .route("/api/v1/analytics/summary", get(analytics_summary))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct TextSubmission {
    text: String,
}

#[derive(Debug, Serialize)]
struct SubmissionResponse {
    request_id: String,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    request_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    user: Option<String>,
}

/// Submit text for moderation
async fn moderate_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let user = user_identity(&headers)?;
    let submission: TextSubmission = serde_json::from_slice(&body)?;

    let accepted = state
        .orchestrator
        .submit_text(&user, &submission.text)
        .await?;

    Ok(accepted_response(accepted.request_id))
}

/// Submit a raw image body for moderation
async fn moderate_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let user = user_identity(&headers)?;
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .filter(|v| v.starts_with("image/"))
        .ok_or_else(|| AppError::InvalidRequest("Content-Type must be an image/* type".to_string()))?;

    let accepted = state
        .orchestrator
        .submit_image(&user, &media_type, body.to_vec())
        .await?;

    Ok(accepted_response(accepted.request_id))
}

/// Read back a request's status and, once completed, its verdict
async fn moderation_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let user = user_identity(&headers)?;

    let request = state
        .store
        .get_request(&id)
        .await?
        .filter(|r| r.user_id == user)
        .ok_or_else(|| AppError::NotFound(format!("Moderation request {} not found", id)))?;

    if request.is_pending() {
        return Ok(Json(StatusResponse {
            request_id: request.id,
            status: STATUS_PROCESSING,
            classification: None,
            confidence: None,
            reasoning: None,
        }));
    }

    let result = state
        .store
        .get_result(&id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Completed request {} has no result", id)))?;

    Ok(Json(StatusResponse {
        request_id: request.id,
        status: request.status.as_str(),
        classification: Some(result.verdict.classification.to_string()),
        confidence: Some(result.verdict.confidence),
        reasoning: Some(result.verdict.reasoning),
    }))
}

/// Per-user request and verdict counts
async fn analytics_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, AppError> {
    user_identity(&headers)?;

    let user = query
        .user
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Missing 'user' query parameter".to_string()))?;

    let summary = state.store.user_summary(&user).await?;
    if summary.total_requests == 0 {
        return Err(AppError::NotFound(format!("No moderation requests for {}", user)));
    }

    Ok(Json(summary).into_response())
}

async fn fallback() -> impl IntoResponse {
    AppError::NotFound("Route not found".to_string())
}

fn user_identity(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

fn accepted_response(request_id: String) -> Response {
    debug!(request_id = %request_id, "Submission accepted");
    (
        StatusCode::ACCEPTED,
        Json(SubmissionResponse {
            request_id,
            status: STATUS_PROCESSING,
        }),
    )
        .into_response()
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    Unauthorized,
    NotFound(String),
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Moderation request {} not found", id)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidSubmission(e) => AppError::InvalidRequest(e.to_string()),
            EngineError::NotFound(id) => AppError::NotFound(format!("Moderation request {} not found", id)),
            EngineError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request_error", msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                format!("Missing {} header", USER_HEADER),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found_error", msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}

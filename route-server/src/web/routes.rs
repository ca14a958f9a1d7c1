//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Local;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::DomainError;
use crate::proximity::PositionSample;
use crate::sequencer::PlanError;
use crate::tracking::{SessionId, TrackingError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/optimize", post(optimize_route))
        .route("/tracking/sessions", post(create_session))
        .route("/tracking/sessions/:id", delete(end_session))
        .route("/tracking/sessions/:id/stops", put(replace_stops))
        .route("/tracking/sessions/:id/active", put(set_active))
        .route("/tracking/sessions/:id/positions", post(report_position))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, reporting failures as `Invalid JSON: ...`.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "rejected JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

fn session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse().map_err(AppError::from)
}

/// Order a set of stops and attach ETAs.
async fn optimize_route(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: OptimizeRequest = parse_json(&body)?;
    let start = Local::now().naive_local();

    let result = state.planner.plan(req.into(), start).await?;

    Ok(Json(OptimizeResponse::from_result(result)).into_response())
}

/// Start a tracking session.
async fn create_session(State(state): State<AppState>) -> Response {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id })).into_response()
}

/// Replace the stops a session watches.
async fn replace_stops(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let id = session_id(&id)?;
    let req: ReplaceStopsRequest = parse_json(&body)?;
    state.sessions.replace_stops(id, req.stops).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pause or resume arrival detection for a session.
async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let id = session_id(&id)?;
    let req: SetActiveRequest = parse_json(&body)?;
    state.sessions.set_active(id, req.active).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Feed one position sample to a session.
///
/// A body that is not a readable sample is dropped and answered with no event.
async fn report_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<PositionResponse>, AppError> {
    let id = session_id(&id)?;
    let event = match serde_json::from_slice::<PositionSample>(&body) {
        Ok(sample) => state.sessions.observe(id, sample).await?,
        Err(e) => {
            if !state.sessions.contains(id) {
                return Err(TrackingError::UnknownSession(id).into());
            }
            debug!(session = %id, error = %e, "dropping malformed position sample");
            None
        }
    };
    Ok(Json(PositionResponse { event }))
}

/// End a tracking session.
async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = session_id(&id)?;
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Invalid(DomainError::InsufficientStops(_)) => AppError::BadRequest {
                message: "Not enough stops to optimize".to_string(),
            },
            PlanError::Invalid(e) => AppError::BadRequest {
                message: e.to_string(),
            },
            PlanError::Sequence(e) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<TrackingError> for AppError {
    fn from(e: TrackingError) -> Self {
        match e {
            TrackingError::UnknownSession(_) => AppError::NotFound {
                message: e.to_string(),
            },
            TrackingError::InvalidSessionId(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => {
                error!(%message, "internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    auth::AuthenticatedPlayer,
    dto::session::{EnrollResponse, SessionSummary, SessionView},
    error::{AppError, ErrorBody},
    services::{enrollment_service, session_service},
    state::SharedState,
};

/// Session browsing and enrollment for authenticated players.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", get(list_upcoming))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/enroll", post(enroll).delete(withdraw))
}

/// List sessions from today onwards, soonest first.
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    params(("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too")),
    responses(
        (status = 200, description = "Upcoming sessions", body = [SessionSummary]),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_upcoming(
    State(state): State<SharedState>,
    _player: AuthenticatedPlayer,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    Ok(Json(session_service::upcoming_sessions(&state).await?))
}

/// Session details with its balancing teams and curated games.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(
        ("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    _player: AuthenticatedPlayer,
    Path(id): Path<i32>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::session_view(&state, id).await?))
}

/// Enroll the caller and place them on one of the two session teams.
#[utoipa::path(
    post,
    path = "/sessions/{id}/enroll",
    tag = "sessions",
    params(
        ("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Caller enrolled; repeated calls return the same team", body = EnrollResponse),
        (status = 400, description = "Enrollment window closed", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 503, description = "Store unavailable or timed out; nothing was written", body = ErrorBody)
    )
)]
pub async fn enroll(
    State(state): State<SharedState>,
    AuthenticatedPlayer(principal): AuthenticatedPlayer,
    Path(id): Path<i32>,
) -> Result<Json<EnrollResponse>, AppError> {
    Ok(Json(
        enrollment_service::enroll(&state, principal.player_id, id).await?,
    ))
}

/// Withdraw from a session. Not offered yet.
#[utoipa::path(
    delete,
    path = "/sessions/{id}/enroll",
    tag = "sessions",
    params(
        ("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    responses((status = 501, description = "Withdrawal is not supported", body = ErrorBody))
)]
pub async fn withdraw(
    State(state): State<SharedState>,
    AuthenticatedPlayer(principal): AuthenticatedPlayer,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    enrollment_service::withdraw(&state, principal.player_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

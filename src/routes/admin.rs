use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use tracing::debug;

use crate::{
    auth::authenticate,
    dto::{
        admin::{
            CreateGameRequest, EnrolledPlayer, GamesQuery, InviteCodeRequest, InviteCodeResponse,
            SeasonRequest, SeasonResponse, SessionRequest, UpdateGameRequest,
        },
        session::{GameView, SessionResponse, SessionSummary},
    },
    error::{AppError, ErrorBody},
    services::admin_service,
    state::SharedState,
};

/// Admin-only management endpoints for seasons, sessions, invite codes and games.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/seasons", get(list_seasons).post(create_season))
        .route(
            "/admin/seasons/{id}",
            put(update_season).delete(delete_season),
        )
        .route("/admin/sessions", get(list_sessions).post(create_session))
        .route(
            "/admin/sessions/{id}",
            put(update_session).delete(delete_session),
        )
        .route("/admin/sessions/{id}/players", get(session_players))
        .route(
            "/admin/invite-codes",
            get(list_invite_codes).post(create_invite_code),
        )
        .route("/admin/games", get(list_games).post(create_game))
        .route(
            "/admin/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// List every season, newest first.
#[utoipa::path(
    get,
    path = "/admin/seasons",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    responses(
        (status = 200, description = "Seasons, most recent first", body = [SeasonResponse]),
        (status = 403, description = "Caller is not an admin", body = ErrorBody)
    )
)]
pub async fn list_seasons(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SeasonResponse>>, AppError> {
    Ok(Json(admin_service::list_seasons(&state).await?))
}

/// Create a season.
#[utoipa::path(
    post,
    path = "/admin/seasons",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    request_body = SeasonRequest,
    responses(
        (status = 201, description = "Season created", body = SeasonResponse),
        (status = 400, description = "Invalid season", body = ErrorBody)
    )
)]
pub async fn create_season(
    State(state): State<SharedState>,
    Json(payload): Json<SeasonRequest>,
) -> Result<(StatusCode, Json<SeasonResponse>), AppError> {
    let season = admin_service::create_season(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(season)))
}

/// Replace the name and dates of a season.
#[utoipa::path(
    put,
    path = "/admin/seasons/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Season identifier")
    ),
    request_body = SeasonRequest,
    responses(
        (status = 200, description = "Season updated", body = SeasonResponse),
        (status = 404, description = "Unknown season", body = ErrorBody)
    )
)]
pub async fn update_season(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<SeasonRequest>,
) -> Result<Json<SeasonResponse>, AppError> {
    Ok(Json(admin_service::update_season(&state, id, payload).await?))
}

/// Delete a season and everything scheduled in it.
#[utoipa::path(
    delete,
    path = "/admin/seasons/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Season identifier")
    ),
    responses(
        (status = 204, description = "Season deleted"),
        (status = 404, description = "Unknown season", body = ErrorBody)
    )
)]
pub async fn delete_season(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_season(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List every session with its enrollment count.
#[utoipa::path(
    get,
    path = "/admin/sessions",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    responses((status = 200, description = "All sessions, newest first", body = [SessionSummary]))
)]
pub async fn list_sessions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    Ok(Json(admin_service::list_sessions(&state).await?))
}

/// Schedule a session within an existing season.
#[utoipa::path(
    post,
    path = "/admin/sessions",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    request_body = SessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Invalid session", body = ErrorBody),
        (status = 404, description = "Unknown season", body = ErrorBody)
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = admin_service::create_session(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Reschedule or relocate a session.
#[utoipa::path(
    put,
    path = "/admin/sessions/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 404, description = "Unknown session or season", body = ErrorBody)
    )
)]
pub async fn update_session(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(admin_service::update_session(&state, id, payload).await?))
}

/// Delete a session with its enrollments, teams and games.
#[utoipa::path(
    delete,
    path = "/admin/sessions/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enrolled players not yet drafted into one of the session's games.
#[utoipa::path(
    get,
    path = "/admin/sessions/{id}/players",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Available players", body = [EnrolledPlayer]),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn session_players(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<EnrolledPlayer>>, AppError> {
    Ok(Json(admin_service::session_players(&state, id).await?))
}

/// List every invite code.
#[utoipa::path(
    get,
    path = "/admin/invite-codes",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    responses((status = 200, description = "Invite codes, newest first", body = [InviteCodeResponse]))
)]
pub async fn list_invite_codes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<InviteCodeResponse>>, AppError> {
    Ok(Json(admin_service::list_invite_codes(&state).await?))
}

/// Mint a random invite code. The body is optional.
#[utoipa::path(
    post,
    path = "/admin/invite-codes",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    request_body(content = InviteCodeRequest, description = "Optional season binding"),
    responses((status = 201, description = "Invite code created", body = InviteCodeResponse))
)]
pub async fn create_invite_code(
    State(state): State<SharedState>,
    payload: Option<Json<InviteCodeRequest>>,
) -> Result<(StatusCode, Json<InviteCodeResponse>), AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let code = admin_service::create_invite_code(&state, request).await?;
    Ok((StatusCode::CREATED, Json(code)))
}

/// List the curated games of a session.
#[utoipa::path(
    get,
    path = "/admin/games",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        GamesQuery
    ),
    responses(
        (status = 200, description = "Curated games of the session", body = [GameView]),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<Vec<GameView>>, AppError> {
    Ok(Json(
        admin_service::list_games(&state, query.session_id).await?,
    ))
}

/// Create a curated game from two drafted rosters.
#[utoipa::path(
    post,
    path = "/admin/games",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Bearer token of an admin")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameView),
        (status = 400, description = "Invalid teams", body = ErrorBody),
        (status = 409, description = "Unknown player referenced", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameView>), AppError> {
    let game = admin_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Fetch one curated game.
#[utoipa::path(
    get,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Game identifier")
    ),
    responses(
        (status = 200, description = "Game", body = GameView),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(admin_service::get_game(&state, id).await?))
}

/// Replace rosters and set or clear the winner.
#[utoipa::path(
    put,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Game identifier")
    ),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameView),
        (status = 400, description = "Winner or team not part of the game", body = ErrorBody),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateGameRequest>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(admin_service::update_game(&state, id, payload).await?))
}

/// Delete a curated game and its teams.
#[utoipa::path(
    delete,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Bearer token of an admin"),
        ("id" = i32, Path, description = "Game identifier")
    ),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Middleware admitting only authenticated admins.
async fn require_admin(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(req.headers(), &state)?;
    if !principal.is_admin {
        debug!(player_id = principal.player_id, "admin route refused");
        return Err(AppError::Unauthorized("admin rights required".into()));
    }
    Ok(next.run(req).await)
}

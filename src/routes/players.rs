use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    auth::AuthenticatedPlayer,
    dto::player::{
        IsAdminResponse, LeaderboardEntry, LeaderboardQuery, PlayerDetail, ProfileResponse,
        UpdateProfileRequest,
    },
    error::{AppError, ErrorBody},
    services::player_service,
    state::SharedState,
};

/// Leaderboard, player statistics and the caller's own profile.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/players/{id}", get(get_player))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/user/is-admin", get(is_admin))
}

/// Public ranking of players by points.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "players",
    params(LeaderboardQuery),
    responses((status = 200, description = "Players ranked by points", body = [LeaderboardEntry]))
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(player_service::leaderboard(&state, query.limit).await?))
}

/// Statistics and session history of one player.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    params(
        ("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too"),
        ("id" = i32, Path, description = "Player identifier")
    ),
    responses(
        (status = 200, description = "Player statistics and session history", body = PlayerDetail),
        (status = 404, description = "Unknown player", body = ErrorBody)
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    _player: AuthenticatedPlayer,
    Path(id): Path<i32>,
) -> Result<Json<PlayerDetail>, AppError> {
    Ok(Json(player_service::player_detail(&state, id).await?))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/profile",
    tag = "players",
    params(("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too")),
    responses((status = 200, description = "Caller's profile", body = ProfileResponse))
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    AuthenticatedPlayer(principal): AuthenticatedPlayer,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(
        player_service::profile(&state, principal.player_id).await?,
    ))
}

/// Replace the caller's name, position and bio.
#[utoipa::path(
    put,
    path = "/profile",
    tag = "players",
    params(("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid profile fields", body = ErrorBody)
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    AuthenticatedPlayer(principal): AuthenticatedPlayer,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(
        player_service::update_profile(&state, principal.player_id, payload).await?,
    ))
}

/// Whether the caller holds the admin role.
#[utoipa::path(
    get,
    path = "/user/is-admin",
    tag = "players",
    params(("Authorization" = String, Header, description = "Bearer token; the auth cookie is accepted too")),
    responses((status = 200, description = "Whether the caller holds admin rights", body = IsAdminResponse))
)]
pub async fn is_admin(AuthenticatedPlayer(principal): AuthenticatedPlayer) -> Json<IsAdminResponse> {
    Json(player_service::is_admin(&principal))
}

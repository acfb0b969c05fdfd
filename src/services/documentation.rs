use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for League Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sessions::list_upcoming,
        crate::routes::sessions::get_session,
        crate::routes::sessions::enroll,
        crate::routes::sessions::withdraw,
        crate::routes::players::leaderboard,
        crate::routes::players::get_player,
        crate::routes::players::get_profile,
        crate::routes::players::update_profile,
        crate::routes::players::is_admin,
        crate::routes::admin::list_seasons,
        crate::routes::admin::create_season,
        crate::routes::admin::update_season,
        crate::routes::admin::delete_season,
        crate::routes::admin::list_sessions,
        crate::routes::admin::create_session,
        crate::routes::admin::update_session,
        crate::routes::admin::delete_session,
        crate::routes::admin::session_players,
        crate::routes::admin::list_invite_codes,
        crate::routes::admin::create_invite_code,
        crate::routes::admin::list_games,
        crate::routes::admin::create_game,
        crate::routes::admin::get_game,
        crate::routes::admin::update_game,
        crate::routes::admin::delete_game,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::session::SessionSummary,
            crate::dto::session::SessionResponse,
            crate::dto::session::SessionView,
            crate::dto::session::TeamRoster,
            crate::dto::session::RosterPlayer,
            crate::dto::session::GameView,
            crate::dto::session::AssignedTeam,
            crate::dto::session::EnrollResponse,
            crate::dto::player::PlayerStats,
            crate::dto::player::PlayerDetail,
            crate::dto::player::LeaderboardEntry,
            crate::dto::player::ProfileResponse,
            crate::dto::player::UpdateProfileRequest,
            crate::dto::player::IsAdminResponse,
            crate::dto::admin::SeasonRequest,
            crate::dto::admin::SeasonResponse,
            crate::dto::admin::SessionRequest,
            crate::dto::admin::EnrolledPlayer,
            crate::dto::admin::InviteCodeRequest,
            crate::dto::admin::InviteCodeResponse,
            crate::dto::admin::GameTeamInput,
            crate::dto::admin::CreateGameRequest,
            crate::dto::admin::GameTeamUpdate,
            crate::dto::admin::UpdateGameRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sessions", description = "Session browsing and enroll-then-balance"),
        (name = "players", description = "Leaderboard, player statistics and profiles"),
        (name = "admin", description = "Season, session, invite code and game management"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_enrollment_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/sessions/{id}/enroll"));
        assert!(paths.contains_key("/admin/games/{id}"));
        assert!(paths.contains_key("/leaderboard"));
    }
}

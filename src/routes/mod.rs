use axum::Router;

use crate::state::SharedState;

/// Admin management routes.
pub mod admin;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Health probe.
pub mod health;
/// Leaderboard, player and profile routes.
pub mod players;
/// Session listing and enrollment routes.
pub mod sessions;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(sessions::router())
        .merge(players::router())
        .merge(admin::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}

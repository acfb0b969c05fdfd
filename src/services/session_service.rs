use std::sync::Arc;

use time::PrimitiveDateTime;

use super::{enrollment_window::can_enroll, with_deadline};
use crate::{
    dao::{league_store::LeagueStore, models::SessionEntity},
    dto::session::{SessionSummary, SessionView},
    error::ServiceError,
    state::SharedState,
};

/// Sessions dated today or later in league time, soonest first.
pub async fn upcoming_sessions(state: &SharedState) -> Result<Vec<SessionSummary>, ServiceError> {
    let store = state.require_store().await?;
    let now = state.clock().now();
    let items = with_deadline(state, store.list_sessions_from(now.date())).await?;

    Ok(items
        .into_iter()
        .map(|item| {
            let open = can_enroll(item.session.date, now);
            SessionSummary::new(item, open)
        })
        .collect())
}

/// Full view of one session.
pub async fn session_view(state: &SharedState, id: i32) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;
    let session = with_deadline(state, store.find_session(id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("session {id} not found")))?;
    assemble_view(state, &store, session, state.clock().now()).await
}

/// Combine a session row with its balancing rosters and curated games.
pub(crate) async fn assemble_view(
    state: &SharedState,
    store: &Arc<dyn LeagueStore>,
    session: SessionEntity,
    now: PrimitiveDateTime,
) -> Result<SessionView, ServiceError> {
    let teams = with_deadline(state, store.session_teams(session.id)).await?;
    let games = with_deadline(state, store.list_games(session.id)).await?;
    let open = can_enroll(session.date, now);
    Ok(SessionView::new(session, open, teams, games))
}

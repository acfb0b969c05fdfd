//! Enroll-then-balance workflow.
//!
//! The window check runs before any write; the enrollment fact and the team
//! membership are then recorded by the store in one transaction.

use tracing::{debug, info};

use super::{enrollment_window::can_enroll, session_service::assemble_view, with_deadline};
use crate::{
    dto::{
        admin::EnrolledPlayer,
        session::{AssignedTeam, EnrollResponse},
    },
    error::ServiceError,
    state::SharedState,
};

/// Enroll `player_id` into `session_id` and place them on a balancing team.
///
/// Repeating the call is harmless: the caller keeps their enrollment and team.
pub async fn enroll(
    state: &SharedState,
    player_id: i32,
    session_id: i32,
) -> Result<EnrollResponse, ServiceError> {
    let store = state.require_store().await?;
    let session = with_deadline(state, store.find_session(session_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("session {session_id} not found")))?;

    let now = state.clock().now();
    if !can_enroll(session.date, now) {
        debug!(session_id, player_id, %now, "enrollment window closed");
        return Err(ServiceError::EnrollmentClosed { session_id });
    }

    if with_deadline(state, store.find_player(player_id))
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound(format!("player {player_id} not found")));
    }

    let enrollment = with_deadline(state, store.enroll(player_id, session_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("session {session_id} not found")))?;
    info!(
        session_id,
        player_id,
        team_id = enrollment.team_id,
        newly_enrolled = enrollment.newly_enrolled,
        "player enrolled"
    );

    let view = assemble_view(state, &store, session, now).await?;
    Ok(EnrollResponse {
        session: view,
        team: AssignedTeam {
            id: enrollment.team_id,
            name: enrollment.team_name,
        },
        newly_enrolled: enrollment.newly_enrolled,
    })
}

/// Withdrawing from a session is not offered until the re-balancing rules are settled.
pub async fn withdraw(
    _state: &SharedState,
    _player_id: i32,
    session_id: i32,
) -> Result<(), ServiceError> {
    Err(ServiceError::NotImplemented(format!(
        "withdrawing from session {session_id} is not supported"
    )))
}

/// Enrolled players of a session not yet placed into one of its curated games.
pub async fn available_players(
    state: &SharedState,
    session_id: i32,
) -> Result<Vec<EnrolledPlayer>, ServiceError> {
    let store = state.require_store().await?;
    if with_deadline(state, store.find_session(session_id))
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound(format!(
            "session {session_id} not found"
        )));
    }
    let players = with_deadline(state, store.list_enrolled(session_id)).await?;
    Ok(players.into_iter().map(Into::into).collect())
}

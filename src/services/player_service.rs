use tracing::info;
use validator::Validate;

use super::with_deadline;
use crate::{
    auth::Principal,
    dao::models::ProfileUpdateEntity,
    dto::player::{
        IsAdminResponse, LeaderboardEntry, PlayerDetail, ProfileResponse, UpdateProfileRequest,
    },
    error::ServiceError,
    state::SharedState,
};

fn player_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("player {id} not found"))
}

/// Ranking by points; `limit` is clamped between one and the configured cap.
pub async fn leaderboard(
    state: &SharedState,
    limit: Option<i64>,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let cap = state.config().leaderboard_limit.max(1);
    let limit = limit.unwrap_or(cap).clamp(1, cap);

    let store = state.require_store().await?;
    let players = with_deadline(state, store.leaderboard(limit)).await?;
    Ok(players
        .into_iter()
        .enumerate()
        .map(|(index, player)| LeaderboardEntry::new(index + 1, player))
        .collect())
}

/// Statistics of one player plus their session history.
pub async fn player_detail(state: &SharedState, id: i32) -> Result<PlayerDetail, ServiceError> {
    let store = state.require_store().await?;
    let player = with_deadline(state, store.find_player(id))
        .await?
        .ok_or_else(|| player_not_found(id))?;
    let sessions = with_deadline(state, store.player_sessions(id)).await?;

    Ok(PlayerDetail {
        player: player.into(),
        sessions: sessions.into_iter().map(Into::into).collect(),
    })
}

/// Profile of the calling player.
pub async fn profile(state: &SharedState, player_id: i32) -> Result<ProfileResponse, ServiceError> {
    let store = state.require_store().await?;
    with_deadline(state, store.find_player(player_id))
        .await?
        .map(Into::into)
        .ok_or_else(|| player_not_found(player_id))
}

/// Overwrite the caller's editable profile fields. Blank optional fields are cleared.
pub async fn update_profile(
    state: &SharedState,
    player_id: i32,
    request: UpdateProfileRequest,
) -> Result<ProfileResponse, ServiceError> {
    request.validate()?;
    let profile = ProfileUpdateEntity {
        name: request.name.trim().to_owned(),
        position: non_blank(request.position),
        bio: non_blank(request.bio),
    };

    let store = state.require_store().await?;
    let player = with_deadline(state, store.update_profile(player_id, profile))
        .await?
        .ok_or_else(|| player_not_found(player_id))?;
    info!(player_id, "profile updated");
    Ok(player.into())
}

/// Admin flag carried by the caller's credential.
pub fn is_admin(principal: &Principal) -> IsAdminResponse {
    IsAdminResponse {
        is_admin: principal.is_admin,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_are_cleared() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" Striker ".into())), Some("Striker".into()));
        assert_eq!(non_blank(None), None);
    }
}

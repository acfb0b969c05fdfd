//! Player statistics, leaderboard and profile payloads.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{session::SessionResponse, validation::validate_not_blank};
use crate::dao::models::PlayerEntity;

/// Public statistics of a player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub games_played: i32,
    pub win_rate: f64,
}

impl From<PlayerEntity> for PlayerStats {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            position: player.position,
            bio: player.bio,
            avatar_url: player.avatar_url,
            points: player.points,
            games_played: player.games_played,
            win_rate: player.win_rate,
        }
    }
}

/// Player statistics plus the sessions they enrolled in, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerDetail {
    pub player: PlayerStats,
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub games_played: i32,
    pub win_rate: f64,
}

impl LeaderboardEntry {
    pub fn new(rank: usize, player: PlayerEntity) -> Self {
        Self {
            rank,
            id: player.id,
            name: player.name,
            position: player.position,
            avatar_url: player.avatar_url,
            points: player.points,
            games_played: player.games_played,
            win_rate: player.win_rate,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Maximum number of entries; clamped to the configured cap.
    pub limit: Option<i64>,
}

/// The caller's own profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub games_played: i32,
    pub win_rate: f64,
    pub is_admin: bool,
}

impl From<PlayerEntity> for ProfileResponse {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            email: player.email,
            position: player.position,
            bio: player.bio,
            avatar_url: player.avatar_url,
            points: player.points,
            games_played: player.games_played,
            win_rate: player.win_rate,
            is_admin: player.is_admin,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub position: Option<String>,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_name_is_required() {
        let blank: UpdateProfileRequest =
            serde_json::from_str(r#"{"name": "  ", "position": "Goalkeeper"}"#).unwrap();
        assert!(blank.validate().is_err());

        let ok: UpdateProfileRequest = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.position.is_none());
    }
}

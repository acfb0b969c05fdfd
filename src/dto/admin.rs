//! DTO definitions used by the admin REST API and documentation layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use super::{
    format_date,
    validation::{validate_clock_time, validate_iso_date, validate_not_blank},
};
use crate::dao::models::{EnrolledPlayerEntity, InviteCodeEntity, SeasonEntity};

/// Season definition submitted by administrators.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_iso_date"))]
    pub start_date: String,
    #[validate(custom(function = "validate_iso_date"))]
    pub end_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResponse {
    pub id: i32,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<SeasonEntity> for SeasonResponse {
    fn from(season: SeasonEntity) -> Self {
        Self {
            id: season.id,
            name: season.name,
            start_date: format_date(season.start_date),
            end_date: format_date(season.end_date),
        }
    }
}

/// Session definition submitted by administrators.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[validate(custom(function = "validate_iso_date"))]
    pub date: String,
    #[validate(custom(function = "validate_clock_time"))]
    pub time: String,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub location: String,
    pub season_id: i32,
}

/// Enrolled player still available for curated games.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledPlayer {
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    /// Balancing team the player was placed in at enrollment.
    pub session_team_id: Option<i32>,
}

impl From<EnrolledPlayerEntity> for EnrolledPlayer {
    fn from(player: EnrolledPlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            position: player.position,
            avatar_url: player.avatar_url,
            session_team_id: player.session_team_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeRequest {
    #[serde(default)]
    pub season_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeResponse {
    pub id: i32,
    pub code: String,
    pub is_used: bool,
    pub season_id: Option<i32>,
}

impl From<InviteCodeEntity> for InviteCodeResponse {
    fn from(code: InviteCodeEntity) -> Self {
        Self {
            id: code.id,
            code: code.code,
            is_used: code.is_used,
            season_id: code.season_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameTeamInput {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub player_ids: Vec<i32>,
}

/// Curated game with exactly two named teams.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub session_id: i32,
    pub teams: Vec<GameTeamInput>,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.teams.len() != 2 {
            let mut err = ValidationError::new("team_count");
            err.message = Some(
                format!("a game needs exactly two teams (got {})", self.teams.len()).into(),
            );
            errors.add("teams", err);
        }
        if let Err(err) = disjoint_rosters(self.teams.iter().map(|team| &team.player_ids)) {
            errors.add("teams", err);
        }
        for team in &self.teams {
            if let Err(team_errors) = team.validate() {
                errors.merge_self("teams", Err(team_errors));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameTeamUpdate {
    pub id: i32,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub player_ids: Vec<i32>,
}

/// Replacement of a curated game's rosters and winner.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub teams: Vec<GameTeamUpdate>,
    /// Winning team; `null` clears it.
    #[serde(default)]
    pub winner_id: Option<i32>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut ids = HashSet::new();
        if self.teams.iter().any(|team| !ids.insert(team.id)) {
            let mut err = ValidationError::new("duplicate_team");
            err.message = Some("each team may appear only once".into());
            errors.add("teams", err);
        }
        if let Err(err) = disjoint_rosters(self.teams.iter().map(|team| &team.player_ids)) {
            errors.add("teams", err);
        }
        for team in &self.teams {
            if let Err(team_errors) = team.validate() {
                errors.merge_self("teams", Err(team_errors));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct GamesQuery {
    pub session_id: i32,
}

/// A player may appear on at most one team of a game.
fn disjoint_rosters<'a>(
    rosters: impl Iterator<Item = &'a Vec<i32>>,
) -> Result<(), ValidationError> {
    match repeated_player(rosters) {
        Some(player_id) => {
            let mut err = ValidationError::new("player_on_two_teams");
            err.message = Some(format!("player {player_id} is listed more than once").into());
            Err(err)
        }
        None => Ok(()),
    }
}

/// First player id that occurs more than once across `rosters`.
pub(crate) fn repeated_player<'a>(rosters: impl Iterator<Item = &'a Vec<i32>>) -> Option<i32> {
    let mut seen = HashSet::new();
    rosters
        .flatten()
        .copied()
        .find(|player_id| !seen.insert(*player_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, players: &[i32]) -> GameTeamInput {
        GameTeamInput {
            name: name.into(),
            player_ids: players.to_vec(),
        }
    }

    #[test]
    fn game_needs_exactly_two_teams() {
        let request = CreateGameRequest {
            session_id: 1,
            teams: vec![team("Reds", &[1])],
        };
        assert!(request.validate().is_err());

        let request = CreateGameRequest {
            session_id: 1,
            teams: vec![team("Reds", &[1]), team("Blues", &[2]), team("Greens", &[3])],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn player_cannot_play_for_both_teams() {
        let request = CreateGameRequest {
            session_id: 1,
            teams: vec![team("Reds", &[1, 2]), team("Blues", &[2, 3])],
        };
        assert!(request.validate().is_err());

        let request = CreateGameRequest {
            session_id: 1,
            teams: vec![team("Reds", &[1, 2]), team("Blues", &[3, 4])],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn season_dates_must_be_iso() {
        let request: SeasonRequest = serde_json::from_str(
            r#"{"name": "Summer", "startDate": "2025-06-01", "endDate": "01/09/2025"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_rejects_repeated_team() {
        let request: UpdateGameRequest = serde_json::from_str(
            r#"{"teams": [{"id": 4, "name": "A", "playerIds": [1]}, {"id": 4, "name": "B"}], "winnerId": 4}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }
}

//! Session listings, session views and enrollment payloads.

use serde::Serialize;
use utoipa::ToSchema;

use super::{format_date, format_time};
use crate::dao::models::{
    GameEntity, RosterPlayerEntity, SessionEntity, SessionListItemEntity, TeamRosterEntity,
};

/// Session row in listings, annotated for the current caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: i32,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub location: String,
    pub season_id: i32,
    pub season_name: String,
    pub player_count: i64,
    pub can_enroll: bool,
}

impl SessionSummary {
    pub fn new(item: SessionListItemEntity, can_enroll: bool) -> Self {
        Self {
            id: item.session.id,
            date: format_date(item.session.date),
            time: format_time(item.session.time),
            location: item.session.location,
            season_id: item.session.season_id,
            season_name: item.season_name,
            player_count: item.player_count,
            can_enroll,
        }
    }
}

/// Scheduling fields of a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: i32,
    pub date: String,
    pub time: String,
    pub location: String,
    pub season_id: i32,
}

impl From<SessionEntity> for SessionResponse {
    fn from(session: SessionEntity) -> Self {
        Self {
            id: session.id,
            date: format_date(session.date),
            time: format_time(session.time),
            location: session.location,
            season_id: session.season_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterPlayer {
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
}

impl From<RosterPlayerEntity> for RosterPlayer {
    fn from(player: RosterPlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            position: player.position,
        }
    }
}

/// A named team with its members.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamRoster {
    pub id: i32,
    pub name: String,
    pub players: Vec<RosterPlayer>,
}

impl From<TeamRosterEntity> for TeamRoster {
    fn from(team: TeamRosterEntity) -> Self {
        Self {
            id: team.id,
            name: team.name,
            players: team.players.into_iter().map(Into::into).collect(),
        }
    }
}

/// Admin-curated game and its two rosters.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: i32,
    pub session_id: i32,
    pub winner_id: Option<i32>,
    pub teams: Vec<TeamRoster>,
}

impl From<GameEntity> for GameView {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            session_id: game.session_id,
            winner_id: game.winner_id,
            teams: game.teams.into_iter().map(Into::into).collect(),
        }
    }
}

/// Externally visible state of one session.
///
/// `teams` holds the two balancing rosters built by enrollment, `games` the
/// curated games; both are always present, possibly empty.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: i32,
    pub date: String,
    pub time: String,
    pub location: String,
    pub season_id: i32,
    pub can_enroll: bool,
    pub teams: Vec<TeamRoster>,
    pub games: Vec<GameView>,
}

impl SessionView {
    pub fn new(
        session: SessionEntity,
        can_enroll: bool,
        teams: Vec<TeamRosterEntity>,
        games: Vec<GameEntity>,
    ) -> Self {
        Self {
            id: session.id,
            date: format_date(session.date),
            time: format_time(session.time),
            location: session.location,
            season_id: session.season_id,
            can_enroll,
            teams: teams.into_iter().map(Into::into).collect(),
            games: games.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignedTeam {
    pub id: i32,
    pub name: String,
}

/// Result of `POST /sessions/{id}/enroll`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub session: SessionView,
    /// Balancing team the caller belongs to.
    pub team: AssignedTeam,
    /// False when the caller was already enrolled.
    pub newly_enrolled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn view_without_games_serializes_an_empty_array() {
        let session = SessionEntity {
            id: 1,
            date: date!(2025 - 07 - 10),
            time: time!(19:00),
            location: "Riverside Park".into(),
            season_id: 2,
        };
        let view = SessionView::new(session, true, Vec::new(), Vec::new());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["games"], serde_json::json!([]));
        assert_eq!(json["teams"], serde_json::json!([]));
        assert_eq!(json["canEnroll"], serde_json::json!(true));
        assert_eq!(json["date"], "2025-07-10");
        assert_eq!(json["time"], "19:00");
        assert_eq!(json["seasonId"], 2);
    }
}

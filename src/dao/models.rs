//! Typed persistence entities shared by every storage backend and the service layer.

use time::{Date, Time};

/// League season grouping sessions together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEntity {
    /// Stable identifier of the season.
    pub id: i32,
    /// Display name, e.g. "Summer 2025".
    pub name: String,
    /// First day of the season.
    pub start_date: Date,
    /// Last day of the season, never before `start_date`.
    pub end_date: Date,
}

/// Fields required to create or replace a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeasonEntity {
    /// Display name of the season.
    pub name: String,
    /// First day of the season.
    pub start_date: Date,
    /// Last day of the season.
    pub end_date: Date,
}

/// Scheduled league event owned by exactly one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntity {
    /// Stable identifier of the session.
    pub id: i32,
    /// Calendar day the session is played on.
    pub date: Date,
    /// Kick-off time, league wall clock.
    pub time: Time,
    /// Where the session takes place.
    pub location: String,
    /// Owning season.
    pub season_id: i32,
}

/// Fields required to create or replace a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionEntity {
    /// Calendar day the session is played on.
    pub date: Date,
    /// Kick-off time, league wall clock.
    pub time: Time,
    /// Where the session takes place.
    pub location: String,
    /// Owning season, which must exist.
    pub season_id: i32,
}

/// Session row decorated with the data listings need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListItemEntity {
    /// The session row itself.
    pub session: SessionEntity,
    /// Name of the owning season.
    pub season_name: String,
    /// Number of enrollment facts recorded for the session.
    pub player_count: i64,
}

/// Player identity plus the display attributes rosters show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPlayerEntity {
    /// Player identifier.
    pub id: i32,
    /// Player display name.
    pub name: String,
    /// Preferred playing position, if any.
    pub position: Option<String>,
}

/// A team together with its members, either session-scoped or game-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRosterEntity {
    /// Team identifier.
    pub id: i32,
    /// Team display name.
    pub name: String,
    /// Members ordered by name.
    pub players: Vec<RosterPlayerEntity>,
}

/// Admin-curated game played within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    /// Stable identifier of the game.
    pub id: i32,
    /// Session the game belongs to.
    pub session_id: i32,
    /// Winning team, always one of `teams` when set.
    pub winner_id: Option<i32>,
    /// The two competing teams, ordered by id.
    pub teams: Vec<TeamRosterEntity>,
}

/// Team definition supplied when creating a curated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameTeamEntity {
    /// Team display name.
    pub name: String,
    /// Players drafted onto the team.
    pub player_ids: Vec<i32>,
}

/// Fields required to create a curated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameEntity {
    /// Session the game is played in.
    pub session_id: i32,
    /// Exactly two teams with disjoint rosters.
    pub teams: Vec<NewGameTeamEntity>,
}

/// Replacement roster for one existing team of a curated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTeamUpdateEntity {
    /// Existing team of the game.
    pub id: i32,
    /// New display name.
    pub name: String,
    /// Complete replacement roster.
    pub player_ids: Vec<i32>,
}

/// Full replacement of a curated game's rosters and winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameUpdateEntity {
    /// Teams to rewrite; teams left out keep their roster.
    pub teams: Vec<GameTeamUpdateEntity>,
    /// Winning team, `None` clears it.
    pub winner_id: Option<i32>,
}

/// League member with cumulative statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntity {
    /// Stable identifier of the player.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Login email, unique across players.
    pub email: String,
    /// Accumulated league points.
    pub points: i32,
    /// Number of games the player took part in.
    pub games_played: i32,
    /// Share of games won, between 0 and 1.
    pub win_rate: f64,
    /// Preferred playing position.
    pub position: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Link to the profile picture.
    pub avatar_url: Option<String>,
    /// Whether the player may use admin routes.
    pub is_admin: bool,
}

/// Editable profile fields of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdateEntity {
    /// New display name.
    pub name: String,
    /// Preferred position, `None` clears it.
    pub position: Option<String>,
    /// Biography, `None` clears it.
    pub bio: Option<String>,
}

/// Enrolled player still available for curated games in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledPlayerEntity {
    /// Player identifier.
    pub id: i32,
    /// Player display name.
    pub name: String,
    /// Preferred playing position.
    pub position: Option<String>,
    /// Link to the profile picture.
    pub avatar_url: Option<String>,
    /// Ad-hoc balancing team the player was assigned to, if any.
    pub session_team_id: Option<i32>,
}

/// Invite code handed out to prospective players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCodeEntity {
    /// Stable identifier of the code.
    pub id: i32,
    /// The code handed out, 20 hex characters.
    pub code: String,
    /// Set once a registration consumed the code.
    pub is_used: bool,
    /// Season the code grants access to, if any.
    pub season_id: Option<i32>,
}

/// Outcome of one transactional enroll-then-balance operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentEntity {
    /// Enrolled player.
    pub player_id: i32,
    /// Session enrolled in.
    pub session_id: i32,
    /// Session-scoped team the player belongs to after the operation.
    pub team_id: i32,
    /// Display name of `team_id`.
    pub team_name: String,
    /// False when the enrollment fact already existed.
    pub newly_enrolled: bool,
    /// True when this call seeded a new team.
    pub created_team: bool,
}

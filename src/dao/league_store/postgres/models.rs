use diesel::prelude::*;
use time::{Date, Time};

use super::schema::{
    games, invite_codes, player_sessions, player_teams, players, seasons, sessions, teams,
};
use crate::dao::models::{
    InviteCodeEntity, NewSeasonEntity, NewSessionEntity, PlayerEntity, ProfileUpdateEntity,
    SeasonEntity, SessionEntity,
};

#[derive(Queryable, Selectable)]
#[diesel(table_name = players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlayerRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub points: i32,
    pub games_played: i32,
    pub win_rate: f64,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

impl From<PlayerRow> for PlayerEntity {
    fn from(row: PlayerRow) -> Self {
        PlayerEntity {
            id: row.id,
            name: row.name,
            email: row.email,
            points: row.points,
            games_played: row.games_played,
            win_rate: row.win_rate,
            position: row.position,
            bio: row.bio,
            avatar_url: row.avatar_url,
            is_admin: row.is_admin,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = players)]
#[diesel(treat_none_as_null = true)]
pub struct ProfileChangeset {
    pub name: String,
    pub position: Option<String>,
    pub bio: Option<String>,
}

impl From<ProfileUpdateEntity> for ProfileChangeset {
    fn from(profile: ProfileUpdateEntity) -> Self {
        Self {
            name: profile.name,
            position: profile.position,
            bio: profile.bio,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = seasons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SeasonRow {
    pub id: i32,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl From<SeasonRow> for SeasonEntity {
    fn from(row: SeasonRow) -> Self {
        SeasonEntity {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = seasons)]
pub struct SeasonValues {
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl From<NewSeasonEntity> for SeasonValues {
    fn from(season: NewSeasonEntity) -> Self {
        Self {
            name: season.name,
            start_date: season.start_date,
            end_date: season.end_date,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub id: i32,
    pub session_date: Date,
    pub start_time: Time,
    pub location: String,
    pub season_id: i32,
}

impl From<SessionRow> for SessionEntity {
    fn from(row: SessionRow) -> Self {
        SessionEntity {
            id: row.id,
            date: row.session_date,
            time: row.start_time,
            location: row.location,
            season_id: row.season_id,
        }
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = sessions)]
pub struct SessionValues {
    pub session_date: Date,
    pub start_time: Time,
    pub location: String,
    pub season_id: i32,
}

impl From<NewSessionEntity> for SessionValues {
    fn from(session: NewSessionEntity) -> Self {
        Self {
            session_date: session.date,
            start_time: session.time,
            location: session.location,
            season_id: session.season_id,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GameRow {
    pub id: i32,
    pub session_id: i32,
    pub winner_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = games)]
pub struct NewGameRow {
    pub session_id: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamRow {
    pub id: i32,
    pub name: String,
    pub game_id: Option<i32>,
}

/// Exactly one of `session_id` and `game_id` is set.
#[derive(Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeamRow {
    pub name: String,
    pub session_id: Option<i32>,
    pub game_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = player_sessions)]
pub struct PlayerSessionRow {
    pub player_id: i32,
    pub session_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = player_teams)]
pub struct PlayerTeamRow {
    pub player_id: i32,
    pub team_id: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invite_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InviteCodeRow {
    pub id: i32,
    pub code: String,
    pub is_used: bool,
    pub season_id: Option<i32>,
}

impl From<InviteCodeRow> for InviteCodeEntity {
    fn from(row: InviteCodeRow) -> Self {
        InviteCodeEntity {
            id: row.id,
            code: row.code,
            is_used: row.is_used,
            season_id: row.season_id,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = invite_codes)]
pub struct NewInviteCodeRow {
    pub code: String,
    pub season_id: Option<i32>,
}

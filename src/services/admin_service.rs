//! Business logic powering the admin REST routes: season and session
//! maintenance, invite codes, and curated games.

use std::fmt::Write as _;

use rand::Rng;
use tracing::{debug, info, warn};
use validator::Validate;

use super::{enrollment_service, with_deadline};
use crate::{
    dao::models::{
        GameTeamUpdateEntity, GameUpdateEntity, NewGameEntity, NewGameTeamEntity,
        NewSeasonEntity, NewSessionEntity,
    },
    dto::{
        admin::{
            CreateGameRequest, EnrolledPlayer, InviteCodeRequest, InviteCodeResponse,
            SeasonRequest, SeasonResponse, SessionRequest, UpdateGameRequest, repeated_player,
        },
        parse_date, parse_time,
        session::{GameView, SessionResponse, SessionSummary},
    },
    error::ServiceError,
    services::enrollment_window::can_enroll,
    state::SharedState,
};

const INVITE_CODE_BYTES: usize = 10;
const INVITE_CODE_ATTEMPTS: usize = 3;

fn season_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("season {id} not found"))
}

fn session_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("session {id} not found"))
}

fn game_not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("game {id} not found"))
}

fn season_values(request: SeasonRequest) -> Result<NewSeasonEntity, ServiceError> {
    request.validate()?;
    let start_date = parse_date(&request.start_date)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid startDate: {err}")))?;
    let end_date = parse_date(&request.end_date)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid endDate: {err}")))?;
    if end_date < start_date {
        return Err(ServiceError::InvalidInput(
            "endDate must not precede startDate".into(),
        ));
    }
    Ok(NewSeasonEntity {
        name: request.name.trim().to_owned(),
        start_date,
        end_date,
    })
}

/// Every season, newest first.
pub async fn list_seasons(state: &SharedState) -> Result<Vec<SeasonResponse>, ServiceError> {
    let store = state.require_store().await?;
    let seasons = with_deadline(state, store.list_seasons()).await?;
    Ok(seasons.into_iter().map(Into::into).collect())
}

/// Validate and persist a new season.
pub async fn create_season(
    state: &SharedState,
    request: SeasonRequest,
) -> Result<SeasonResponse, ServiceError> {
    let values = season_values(request)?;
    let store = state.require_store().await?;
    let season = with_deadline(state, store.create_season(values)).await?;
    info!(season_id = season.id, name = %season.name, "season created");
    Ok(season.into())
}

/// Replace the name and dates of a season.
pub async fn update_season(
    state: &SharedState,
    id: i32,
    request: SeasonRequest,
) -> Result<SeasonResponse, ServiceError> {
    let values = season_values(request)?;
    let store = state.require_store().await?;
    let season = with_deadline(state, store.update_season(id, values))
        .await?
        .ok_or_else(|| season_not_found(id))?;
    info!(season_id = id, "season updated");
    Ok(season.into())
}

/// Delete a season together with its sessions, games and invite codes.
pub async fn delete_season(state: &SharedState, id: i32) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !with_deadline(state, store.delete_season(id)).await? {
        return Err(season_not_found(id));
    }
    info!(season_id = id, "season deleted");
    Ok(())
}

async fn session_values(
    state: &SharedState,
    request: SessionRequest,
) -> Result<NewSessionEntity, ServiceError> {
    request.validate()?;
    let date = parse_date(&request.date)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid date: {err}")))?;
    let time = parse_time(&request.time)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid time: {err}")))?;

    let store = state.require_store().await?;
    if with_deadline(state, store.find_season(request.season_id))
        .await?
        .is_none()
    {
        return Err(season_not_found(request.season_id));
    }

    Ok(NewSessionEntity {
        date,
        time,
        location: request.location.trim().to_owned(),
        season_id: request.season_id,
    })
}

/// Every session, newest first.
pub async fn list_sessions(state: &SharedState) -> Result<Vec<SessionSummary>, ServiceError> {
    let store = state.require_store().await?;
    let now = state.clock().now();
    let items = with_deadline(state, store.list_sessions()).await?;
    Ok(items
        .into_iter()
        .map(|item| {
            let open = can_enroll(item.session.date, now);
            SessionSummary::new(item, open)
        })
        .collect())
}

/// Schedule a session in an existing season.
pub async fn create_session(
    state: &SharedState,
    request: SessionRequest,
) -> Result<SessionResponse, ServiceError> {
    let values = session_values(state, request).await?;
    let store = state.require_store().await?;
    let session = with_deadline(state, store.create_session(values)).await?;
    info!(session_id = session.id, date = %session.date, "session created");
    Ok(session.into())
}

/// Replace date, time, location and season of a session.
pub async fn update_session(
    state: &SharedState,
    id: i32,
    request: SessionRequest,
) -> Result<SessionResponse, ServiceError> {
    let values = session_values(state, request).await?;
    let store = state.require_store().await?;
    let session = with_deadline(state, store.update_session(id, values))
        .await?
        .ok_or_else(|| session_not_found(id))?;
    info!(session_id = id, "session updated");
    Ok(session.into())
}

/// Delete a session along with its enrollments, teams and games.
pub async fn delete_session(state: &SharedState, id: i32) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !with_deadline(state, store.delete_session(id)).await? {
        return Err(session_not_found(id));
    }
    info!(session_id = id, "session deleted");
    Ok(())
}

/// Players enrolled in a session and not yet drafted into one of its games.
pub async fn session_players(
    state: &SharedState,
    session_id: i32,
) -> Result<Vec<EnrolledPlayer>, ServiceError> {
    enrollment_service::available_players(state, session_id).await
}

/// Every invite code, newest first.
pub async fn list_invite_codes(
    state: &SharedState,
) -> Result<Vec<InviteCodeResponse>, ServiceError> {
    let store = state.require_store().await?;
    let codes = with_deadline(state, store.list_invite_codes()).await?;
    Ok(codes.into_iter().map(Into::into).collect())
}

/// Mint a fresh random invite code, optionally tied to a season.
pub async fn create_invite_code(
    state: &SharedState,
    request: InviteCodeRequest,
) -> Result<InviteCodeResponse, ServiceError> {
    let store = state.require_store().await?;
    if let Some(season_id) = request.season_id {
        if with_deadline(state, store.find_season(season_id))
            .await?
            .is_none()
        {
            return Err(season_not_found(season_id));
        }
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let code = random_code();
        match with_deadline(state, store.create_invite_code(code, request.season_id)).await {
            Ok(invite) => {
                info!(invite_id = invite.id, "invite code created");
                return Ok(invite.into());
            }
            Err(ServiceError::Conflict(message)) if attempt < INVITE_CODE_ATTEMPTS => {
                warn!(attempt, %message, "invite code collision; retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Hex encoding of [`INVITE_CODE_BYTES`] random bytes.
fn random_code() -> String {
    let mut bytes = [0u8; INVITE_CODE_BYTES];
    rand::rng().fill(&mut bytes);
    bytes
        .iter()
        .fold(String::with_capacity(INVITE_CODE_BYTES * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Curated games of one session, by id.
pub async fn list_games(
    state: &SharedState,
    session_id: i32,
) -> Result<Vec<GameView>, ServiceError> {
    let store = state.require_store().await?;
    if with_deadline(state, store.find_session(session_id))
        .await?
        .is_none()
    {
        return Err(session_not_found(session_id));
    }
    let games = with_deadline(state, store.list_games(session_id)).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// One curated game by id.
pub async fn get_game(state: &SharedState, id: i32) -> Result<GameView, ServiceError> {
    let store = state.require_store().await?;
    with_deadline(state, store.find_game(id))
        .await?
        .map(Into::into)
        .ok_or_else(|| game_not_found(id))
}

/// Create a curated game with two named teams drawn from a session's enrollees.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameView, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    if with_deadline(state, store.find_session(request.session_id))
        .await?
        .is_none()
    {
        return Err(session_not_found(request.session_id));
    }

    let game = NewGameEntity {
        session_id: request.session_id,
        teams: request
            .teams
            .into_iter()
            .map(|team| NewGameTeamEntity {
                name: team.name.trim().to_owned(),
                player_ids: team.player_ids,
            })
            .collect(),
    };
    let game = with_deadline(state, store.create_game(game)).await?;
    info!(game_id = game.id, session_id = game.session_id, "game created");
    Ok(game.into())
}

/// Replace rosters and winner of a curated game.
///
/// Every referenced team, the winner included, must belong to the game.
pub async fn update_game(
    state: &SharedState,
    id: i32,
    request: UpdateGameRequest,
) -> Result<GameView, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    let current = with_deadline(state, store.find_game(id))
        .await?
        .ok_or_else(|| game_not_found(id))?;

    let owns = |team_id: i32| current.teams.iter().any(|team| team.id == team_id);
    if let Some(winner_id) = request.winner_id.filter(|winner| !owns(*winner)) {
        debug!(game_id = id, winner_id, "winner is not a team of the game");
        return Err(ServiceError::InvalidInput(format!(
            "team {winner_id} does not play in game {id}"
        )));
    }
    if let Some(team) = request.teams.iter().find(|team| !owns(team.id)) {
        return Err(ServiceError::InvalidInput(format!(
            "team {} does not play in game {id}",
            team.id
        )));
    }

    // Teams left out of the request keep their current roster.
    let rosters: Vec<Vec<i32>> = current
        .teams
        .iter()
        .map(|team| {
            request
                .teams
                .iter()
                .find(|update| update.id == team.id)
                .map(|update| update.player_ids.clone())
                .unwrap_or_else(|| team.players.iter().map(|player| player.id).collect())
        })
        .collect();
    if let Some(player_id) = repeated_player(rosters.iter()) {
        debug!(game_id = id, player_id, "update puts a player on both teams");
        return Err(ServiceError::InvalidInput(format!(
            "player {player_id} would play for both teams of game {id}"
        )));
    }

    let update = GameUpdateEntity {
        teams: request
            .teams
            .into_iter()
            .map(|team| GameTeamUpdateEntity {
                id: team.id,
                name: team.name.trim().to_owned(),
                player_ids: team.player_ids,
            })
            .collect(),
        winner_id: request.winner_id,
    };
    let game = with_deadline(state, store.update_game(id, update))
        .await?
        .ok_or_else(|| game_not_found(id))?;
    info!(game_id = id, winner_id = ?game.winner_id, "game updated");
    Ok(game.into())
}

/// Remove a curated game and its teams.
pub async fn delete_game(state: &SharedState, id: i32) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !with_deadline(state, store.delete_game(id)).await? {
        return Err(game_not_found(id));
    }
    info!(game_id = id, "game deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_twenty_hex_chars() {
        let code = random_code();
        assert_eq!(code.len(), 20);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(code, random_code());
    }

    #[test]
    fn season_end_before_start_is_rejected() {
        let request = SeasonRequest {
            name: "Autumn".into(),
            start_date: "2025-09-01".into(),
            end_date: "2025-08-31".into(),
        };
        assert!(matches!(
            season_values(request),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}

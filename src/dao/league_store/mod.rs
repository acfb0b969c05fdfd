/// Process-local backend.
pub mod memory;
/// Postgres backend built on diesel-async.
#[cfg(feature = "pg-store")]
pub mod postgres;

use futures::future::BoxFuture;
use time::Date;

use crate::dao::models::{
    EnrolledPlayerEntity, EnrollmentEntity, GameEntity, GameUpdateEntity, InviteCodeEntity,
    NewGameEntity, NewSeasonEntity, NewSessionEntity, PlayerEntity, ProfileUpdateEntity,
    SeasonEntity, SessionEntity, SessionListItemEntity, TeamRosterEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the relational persistence layer of the league.
///
/// Every method that writes more than one row runs as a single transaction in
/// the backend: either all of its effects become visible or none do.
pub trait LeagueStore: Send + Sync {
    /// Session by id.
    fn find_session(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Sessions dated on or after `from`, ascending by date then time.
    fn list_sessions_from(
        &self,
        from: Date,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>>;
    /// Every session, newest first.
    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>>;
    /// Insert a session and return it with its id.
    fn create_session(
        &self,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<SessionEntity>>;
    /// Replace a session; `None` when it does not exist.
    fn update_session(
        &self,
        id: i32,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Remove a session with its enrollments, teams and games.
    fn delete_session(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>>;

    /// Record the (player, session) enrollment and assign the player to one of the
    /// two balancing teams of the session, atomically.
    ///
    /// Returns `None` when the session does not exist. Repeated calls for the same
    /// pair leave exactly one enrollment and one team membership behind.
    fn enroll(
        &self,
        player_id: i32,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>>;
    /// Enrolled players of a session, minus those already placed into a curated game
    /// of that same session, ordered by name.
    fn list_enrolled(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrolledPlayerEntity>>>;
    /// Session-scoped balancing teams with their rosters, ordered by team id.
    fn session_teams(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamRosterEntity>>>;

    /// Curated games of a session, ordered by id.
    fn list_games(&self, session_id: i32) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Curated game by id.
    fn find_game(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Insert a game together with its two teams and rosters.
    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Rewrite rosters and winner of a game; `None` when it does not exist.
    fn update_game(
        &self,
        id: i32,
        update: GameUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Remove a game together with its teams.
    fn delete_game(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>>;

    /// Season by id.
    fn find_season(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>>;
    /// Every season, newest first.
    fn list_seasons(&self) -> BoxFuture<'static, StorageResult<Vec<SeasonEntity>>>;
    /// Insert a season and return it with its id.
    fn create_season(
        &self,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<SeasonEntity>>;
    /// Replace a season; `None` when it does not exist.
    fn update_season(
        &self,
        id: i32,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>>;
    /// Remove a season and everything scheduled in it.
    fn delete_season(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>>;

    /// Every invite code, newest first.
    fn list_invite_codes(&self) -> BoxFuture<'static, StorageResult<Vec<InviteCodeEntity>>>;
    /// Persist a freshly generated code, failing with a conflict on collision.
    fn create_invite_code(
        &self,
        code: String,
        season_id: Option<i32>,
    ) -> BoxFuture<'static, StorageResult<InviteCodeEntity>>;

    /// Player by id.
    fn find_player(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Players ordered by points, highest first.
    fn leaderboard(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Sessions the player enrolled in, newest first.
    fn player_sessions(
        &self,
        player_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionEntity>>>;
    /// Overwrite the editable profile fields; `None` when the player is unknown.
    fn update_profile(
        &self,
        player_id: i32,
        profile: ProfileUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;

    /// Cheap round trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

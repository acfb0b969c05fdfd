//! Process-local [`LeagueStore`] used by tests and `LEAGUE_STORE=memory` runs.
//!
//! Every write clones the tables, mutates the draft and swaps it in only when the
//! whole operation succeeded, all under one async mutex. Concurrent callers are
//! therefore serialized the same way row locks serialize them in Postgres.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use thiserror::Error;
use time::Date;
use tokio::sync::Mutex;
use tracing::debug;

use super::LeagueStore;
use crate::{
    dao::{
        models::{
            EnrolledPlayerEntity, EnrollmentEntity, GameEntity, GameUpdateEntity,
            InviteCodeEntity, NewGameEntity, NewSeasonEntity, NewSessionEntity, PlayerEntity,
            ProfileUpdateEntity, RosterPlayerEntity, SeasonEntity, SessionEntity,
            SessionListItemEntity, TeamRosterEntity,
        },
        storage::{StorageError, StorageResult},
    },
    services::balancer::{self, BalancingStage, Placement, TeamLoad},
};

/// Failures produced by the in-memory backend itself.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// The store was switched offline.
    #[error("memory store is switched offline")]
    Offline,
    /// A failure requested through a test hook.
    #[error("injected failure while assigning a team")]
    InjectedFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamScope {
    Session(i32),
    Game(i32),
}

#[derive(Debug, Clone)]
struct TeamRow {
    scope: TeamScope,
    name: String,
}

#[derive(Debug, Clone)]
struct GameRow {
    session_id: i32,
    winner_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
struct Sequence(i32);

impl Sequence {
    fn next(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    season_seq: Sequence,
    session_seq: Sequence,
    game_seq: Sequence,
    team_seq: Sequence,
    player_seq: Sequence,
    invite_seq: Sequence,
    seasons: BTreeMap<i32, SeasonEntity>,
    sessions: BTreeMap<i32, SessionEntity>,
    games: BTreeMap<i32, GameRow>,
    teams: BTreeMap<i32, TeamRow>,
    players: BTreeMap<i32, PlayerEntity>,
    invite_codes: BTreeMap<i32, InviteCodeEntity>,
    /// (player_id, session_id)
    enrollments: BTreeSet<(i32, i32)>,
    /// (player_id, team_id)
    memberships: BTreeSet<(i32, i32)>,
}

impl Tables {
    fn teams_in(&self, scope: TeamScope) -> impl Iterator<Item = (i32, &TeamRow)> {
        self.teams
            .iter()
            .filter(move |(_, team)| team.scope == scope)
            .map(|(id, team)| (*id, team))
    }

    fn members_of(&self, team_id: i32) -> impl Iterator<Item = i32> + '_ {
        self.memberships
            .iter()
            .filter(move |(_, team)| *team == team_id)
            .map(|(player, _)| *player)
    }

    fn roster(&self, team_id: i32, name: &str) -> TeamRosterEntity {
        let mut players: Vec<RosterPlayerEntity> = self
            .members_of(team_id)
            .filter_map(|player_id| self.players.get(&player_id))
            .map(|player| RosterPlayerEntity {
                id: player.id,
                name: player.name.clone(),
                position: player.position.clone(),
            })
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        TeamRosterEntity {
            id: team_id,
            name: name.to_owned(),
            players,
        }
    }

    fn game(&self, id: i32) -> Option<GameEntity> {
        let row = self.games.get(&id)?;
        let teams = self
            .teams_in(TeamScope::Game(id))
            .map(|(team_id, team)| self.roster(team_id, &team.name))
            .collect();
        Some(GameEntity {
            id,
            session_id: row.session_id,
            winner_id: row.winner_id,
            teams,
        })
    }

    fn list_item(&self, session: &SessionEntity) -> SessionListItemEntity {
        let season_name = self
            .seasons
            .get(&session.season_id)
            .map(|season| season.name.clone())
            .unwrap_or_default();
        let player_count = self
            .enrollments
            .iter()
            .filter(|(_, session_id)| *session_id == session.id)
            .count() as i64;
        SessionListItemEntity {
            session: session.clone(),
            season_name,
            player_count,
        }
    }

    fn drop_team(&mut self, team_id: i32) {
        self.teams.remove(&team_id);
        self.memberships.retain(|(_, team)| *team != team_id);
    }

    fn drop_game(&mut self, game_id: i32) -> bool {
        if self.games.remove(&game_id).is_none() {
            return false;
        }
        let team_ids: Vec<i32> = self
            .teams_in(TeamScope::Game(game_id))
            .map(|(id, _)| id)
            .collect();
        for team_id in team_ids {
            self.drop_team(team_id);
        }
        true
    }

    fn drop_session(&mut self, session_id: i32) -> bool {
        if self.sessions.remove(&session_id).is_none() {
            return false;
        }
        self.enrollments.retain(|(_, session)| *session != session_id);
        let team_ids: Vec<i32> = self
            .teams_in(TeamScope::Session(session_id))
            .map(|(id, _)| id)
            .collect();
        for team_id in team_ids {
            self.drop_team(team_id);
        }
        let game_ids: Vec<i32> = self
            .games
            .iter()
            .filter(|(_, game)| game.session_id == session_id)
            .map(|(id, _)| *id)
            .collect();
        for game_id in game_ids {
            self.drop_game(game_id);
        }
        true
    }

    fn insert_rosters(&mut self, team_id: i32, player_ids: &[i32]) -> StorageResult<()> {
        for player_id in player_ids {
            if !self.players.contains_key(player_id) {
                return Err(StorageError::conflict(format!(
                    "player `{player_id}` does not exist"
                )));
            }
            self.memberships.insert((*player_id, team_id));
        }
        Ok(())
    }
}

struct MemoryInner {
    tables: Mutex<Tables>,
    offline: AtomicBool,
    fail_team_assignment: AtomicBool,
    /// Milliseconds the team-assignment step sleeps while holding the lock.
    assignment_stall_ms: AtomicU64,
}

/// In-memory league store with transactional writes and fault injection hooks.
#[derive(Clone)]
pub struct MemoryLeagueStore {
    inner: Arc<MemoryInner>,
}

impl Default for MemoryLeagueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                tables: Mutex::new(Tables::default()),
                offline: AtomicBool::new(false),
                fail_team_assignment: AtomicBool::new(false),
                assignment_stall_ms: AtomicU64::new(0),
            }),
        }
    }

    /// Insert a player row, ignoring the provided id and returning the stored entity.
    ///
    /// Players are created by the registration flow, which lives outside this service.
    pub async fn insert_player(&self, player: PlayerEntity) -> PlayerEntity {
        let mut tables = self.inner.tables.lock().await;
        let id = tables.player_seq.next();
        let stored = PlayerEntity { id, ..player };
        tables.players.insert(id, stored.clone());
        stored
    }

    /// Make every operation fail as if the database connection dropped.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the team-assignment step of [`LeagueStore::enroll`] fail after the
    /// enrollment row has been written to the draft.
    pub fn fail_team_assignment(&self, fail: bool) {
        self.inner.fail_team_assignment.store(fail, Ordering::SeqCst);
    }

    /// Make the team-assignment step of [`LeagueStore::enroll`] sleep for `stall`
    /// before committing, keeping the store locked meanwhile.
    pub fn stall_team_assignment(&self, stall: Option<Duration>) {
        let millis = stall.map_or(0, |stall| stall.as_millis() as u64);
        self.inner.assignment_stall_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of enrollment facts recorded for `(player_id, session_id)`.
    pub async fn enrollment_count(&self, player_id: i32, session_id: i32) -> usize {
        let tables = self.inner.tables.lock().await;
        usize::from(tables.enrollments.contains(&(player_id, session_id)))
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store offline".into(),
                MemoryStoreError::Offline,
            ));
        }
        Ok(())
    }

    async fn read<T>(&self, op: impl FnOnce(&Tables) -> T) -> StorageResult<T> {
        self.check_online()?;
        let tables = self.inner.tables.lock().await;
        Ok(op(&tables))
    }

    async fn write<T>(&self, op: impl FnOnce(&mut Tables) -> StorageResult<T>) -> StorageResult<T> {
        self.check_online()?;
        let mut tables = self.inner.tables.lock().await;
        let mut draft = tables.clone();
        let value = op(&mut draft)?;
        *tables = draft;
        Ok(value)
    }

    async fn enroll_and_balance(
        &self,
        player_id: i32,
        session_id: i32,
    ) -> StorageResult<Option<EnrollmentEntity>> {
        self.check_online()?;
        let mut tables = self.inner.tables.lock().await;
        if !tables.sessions.contains_key(&session_id) {
            return Ok(None);
        }
        if !tables.players.contains_key(&player_id) {
            return Err(StorageError::conflict(format!(
                "player `{player_id}` does not exist"
            )));
        }

        let mut draft = tables.clone();
        let newly_enrolled = draft.enrollments.insert((player_id, session_id));

        let session_teams: Vec<(i32, String)> = draft
            .teams_in(TeamScope::Session(session_id))
            .map(|(id, team)| (id, team.name.clone()))
            .collect();

        if let Some((team_id, team_name)) = session_teams
            .iter()
            .find(|(team_id, _)| draft.memberships.contains(&(player_id, *team_id)))
            .cloned()
        {
            *tables = draft;
            return Ok(Some(EnrollmentEntity {
                player_id,
                session_id,
                team_id,
                team_name,
                newly_enrolled,
                created_team: false,
            }));
        }

        let loads: Vec<TeamLoad> = session_teams
            .iter()
            .map(|(team_id, _)| TeamLoad {
                team_id: *team_id,
                members: draft.members_of(*team_id).count(),
            })
            .collect();

        // Give other enrollments a chance to run between the read and the write.
        tokio::task::yield_now().await;

        let stall_ms = self.inner.assignment_stall_ms.load(Ordering::SeqCst);
        if stall_ms > 0 {
            tokio::time::sleep(Duration::from_millis(stall_ms)).await;
        }

        if self.inner.fail_team_assignment.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                format!("failed to assign team in session `{session_id}`"),
                MemoryStoreError::InjectedFailure,
            ));
        }

        debug!(
            session_id,
            player_id,
            stage = ?BalancingStage::from_team_count(loads.len()),
            "placing enrollee"
        );
        let (team_id, team_name, created_team) = match balancer::place(&loads) {
            Placement::Create { name } => {
                let team_id = draft.team_seq.next();
                draft.teams.insert(
                    team_id,
                    TeamRow {
                        scope: TeamScope::Session(session_id),
                        name: name.clone(),
                    },
                );
                (team_id, name, true)
            }
            Placement::Join(team_id) => {
                let name = session_teams
                    .iter()
                    .find(|(id, _)| *id == team_id)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_default();
                (team_id, name, false)
            }
        };
        draft.memberships.insert((player_id, team_id));
        *tables = draft;

        debug!(player_id, session_id, team_id, created_team, "player assigned to team");
        Ok(Some(EnrollmentEntity {
            player_id,
            session_id,
            team_id,
            team_name,
            newly_enrolled,
            created_team,
        }))
    }
}

impl LeagueStore for MemoryLeagueStore {
    fn find_session(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read(|t| t.sessions.get(&id).cloned()).await })
    }

    fn list_sessions_from(
        &self,
        from: Date,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let mut sessions: Vec<&SessionEntity> =
                        t.sessions.values().filter(|s| s.date >= from).collect();
                    sessions.sort_by_key(|s| (s.date, s.time, s.id));
                    sessions.into_iter().map(|s| t.list_item(s)).collect()
                })
                .await
        })
    }

    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let mut sessions: Vec<&SessionEntity> = t.sessions.values().collect();
                    sessions.sort_by(|a, b| (b.date, b.time, b.id).cmp(&(a.date, a.time, a.id)));
                    sessions.into_iter().map(|s| t.list_item(s)).collect()
                })
                .await
        })
    }

    fn create_session(
        &self,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<SessionEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if !t.seasons.contains_key(&session.season_id) {
                        return Err(StorageError::conflict(format!(
                            "season `{}` does not exist",
                            session.season_id
                        )));
                    }
                    let id = t.session_seq.next();
                    let entity = SessionEntity {
                        id,
                        date: session.date,
                        time: session.time,
                        location: session.location,
                        season_id: session.season_id,
                    };
                    t.sessions.insert(id, entity.clone());
                    Ok(entity)
                })
                .await
        })
    }

    fn update_session(
        &self,
        id: i32,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if !t.seasons.contains_key(&session.season_id) {
                        return Err(StorageError::conflict(format!(
                            "season `{}` does not exist",
                            session.season_id
                        )));
                    }
                    let Some(existing) = t.sessions.get_mut(&id) else {
                        return Ok(None);
                    };
                    existing.date = session.date;
                    existing.time = session.time;
                    existing.location = session.location;
                    existing.season_id = session.season_id;
                    Ok(Some(existing.clone()))
                })
                .await
        })
    }

    fn delete_session(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.write(|t| Ok(t.drop_session(id))).await })
    }

    fn enroll(
        &self,
        player_id: i32,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.enroll_and_balance(player_id, session_id).await })
    }

    fn list_enrolled(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrolledPlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let game_ids: BTreeSet<i32> = t
                        .games
                        .iter()
                        .filter(|(_, game)| game.session_id == session_id)
                        .map(|(id, _)| *id)
                        .collect();
                    let in_games = |player_id: i32| {
                        t.memberships.iter().any(|(player, team)| {
                            *player == player_id
                                && matches!(
                                    t.teams.get(team).map(|row| row.scope),
                                    Some(TeamScope::Game(game_id)) if game_ids.contains(&game_id)
                                )
                        })
                    };

                    let mut players: Vec<EnrolledPlayerEntity> = t
                        .enrollments
                        .iter()
                        .filter(|(_, session)| *session == session_id)
                        .filter(|(player, _)| !in_games(*player))
                        .filter_map(|(player_id, _)| t.players.get(player_id))
                        .map(|player| EnrolledPlayerEntity {
                            id: player.id,
                            name: player.name.clone(),
                            position: player.position.clone(),
                            avatar_url: player.avatar_url.clone(),
                            session_team_id: t
                                .teams_in(TeamScope::Session(session_id))
                                .map(|(team_id, _)| team_id)
                                .find(|team_id| t.memberships.contains(&(player.id, *team_id))),
                        })
                        .collect();
                    players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                    players
                })
                .await
        })
    }

    fn session_teams(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamRosterEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    t.teams_in(TeamScope::Session(session_id))
                        .map(|(id, team)| t.roster(id, &team.name))
                        .collect()
                })
                .await
        })
    }

    fn list_games(&self, session_id: i32) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    t.games
                        .iter()
                        .filter(|(_, game)| game.session_id == session_id)
                        .filter_map(|(id, _)| t.game(*id))
                        .collect()
                })
                .await
        })
    }

    fn find_game(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read(|t| t.game(id)).await })
    }

    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if !t.sessions.contains_key(&game.session_id) {
                        return Err(StorageError::conflict(format!(
                            "session `{}` does not exist",
                            game.session_id
                        )));
                    }
                    let game_id = t.game_seq.next();
                    t.games.insert(
                        game_id,
                        GameRow {
                            session_id: game.session_id,
                            winner_id: None,
                        },
                    );
                    for team in &game.teams {
                        let team_id = t.team_seq.next();
                        t.teams.insert(
                            team_id,
                            TeamRow {
                                scope: TeamScope::Game(game_id),
                                name: team.name.clone(),
                            },
                        );
                        t.insert_rosters(team_id, &team.player_ids)?;
                    }
                    t.game(game_id).ok_or_else(|| {
                        StorageError::conflict(format!("game `{game_id}` vanished during creation"))
                    })
                })
                .await
        })
    }

    fn update_game(
        &self,
        id: i32,
        update: GameUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if !t.games.contains_key(&id) {
                        return Ok(None);
                    }
                    let own_teams: BTreeSet<i32> =
                        t.teams_in(TeamScope::Game(id)).map(|(team_id, _)| team_id).collect();
                    if let Some(winner) = update
                        .winner_id
                        .filter(|winner| !own_teams.contains(winner))
                    {
                        return Err(StorageError::conflict(format!(
                            "team `{winner}` does not play in game `{id}`"
                        )));
                    }
                    for team in &update.teams {
                        if !own_teams.contains(&team.id) {
                            return Err(StorageError::conflict(format!(
                                "team `{}` does not play in game `{id}`",
                                team.id
                            )));
                        }
                        if let Some(row) = t.teams.get_mut(&team.id) {
                            row.name = team.name.clone();
                        }
                        t.memberships.retain(|(_, team_id)| *team_id != team.id);
                        t.insert_rosters(team.id, &team.player_ids)?;
                    }
                    let tables: &Tables = t;
                    let mut seen = BTreeSet::new();
                    if let Some(player_id) = own_teams
                        .iter()
                        .flat_map(move |team_id| tables.members_of(*team_id))
                        .find(|player_id| !seen.insert(*player_id))
                    {
                        return Err(StorageError::conflict(format!(
                            "player `{player_id}` would play for both teams of game `{id}`"
                        )));
                    }
                    if let Some(row) = t.games.get_mut(&id) {
                        row.winner_id = update.winner_id;
                    }
                    Ok(t.game(id))
                })
                .await
        })
    }

    fn delete_game(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.write(|t| Ok(t.drop_game(id))).await })
    }

    fn find_season(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read(|t| t.seasons.get(&id).cloned()).await })
    }

    fn list_seasons(&self) -> BoxFuture<'static, StorageResult<Vec<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let mut seasons: Vec<SeasonEntity> = t.seasons.values().cloned().collect();
                    seasons.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
                    seasons
                })
                .await
        })
    }

    fn create_season(
        &self,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<SeasonEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    let id = t.season_seq.next();
                    let entity = SeasonEntity {
                        id,
                        name: season.name,
                        start_date: season.start_date,
                        end_date: season.end_date,
                    };
                    t.seasons.insert(id, entity.clone());
                    Ok(entity)
                })
                .await
        })
    }

    fn update_season(
        &self,
        id: i32,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    let Some(existing) = t.seasons.get_mut(&id) else {
                        return Ok(None);
                    };
                    existing.name = season.name;
                    existing.start_date = season.start_date;
                    existing.end_date = season.end_date;
                    Ok(Some(existing.clone()))
                })
                .await
        })
    }

    fn delete_season(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if t.seasons.remove(&id).is_none() {
                        return Ok(false);
                    }
                    let session_ids: Vec<i32> = t
                        .sessions
                        .values()
                        .filter(|session| session.season_id == id)
                        .map(|session| session.id)
                        .collect();
                    for session_id in session_ids {
                        t.drop_session(session_id);
                    }
                    t.invite_codes.retain(|_, code| code.season_id != Some(id));
                    Ok(true)
                })
                .await
        })
    }

    fn list_invite_codes(&self) -> BoxFuture<'static, StorageResult<Vec<InviteCodeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| t.invite_codes.values().rev().cloned().collect())
                .await
        })
    }

    fn create_invite_code(
        &self,
        code: String,
        season_id: Option<i32>,
    ) -> BoxFuture<'static, StorageResult<InviteCodeEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    if t.invite_codes.values().any(|existing| existing.code == code) {
                        return Err(StorageError::conflict("invite code already exists"));
                    }
                    if let Some(season_id) = season_id
                        .filter(|season_id| !t.seasons.contains_key(season_id))
                    {
                        return Err(StorageError::conflict(format!(
                            "season `{season_id}` does not exist"
                        )));
                    }
                    let id = t.invite_seq.next();
                    let entity = InviteCodeEntity {
                        id,
                        code,
                        is_used: false,
                        season_id,
                    };
                    t.invite_codes.insert(id, entity.clone());
                    Ok(entity)
                })
                .await
        })
    }

    fn find_player(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read(|t| t.players.get(&id).cloned()).await })
    }

    fn leaderboard(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let mut players: Vec<PlayerEntity> = t.players.values().cloned().collect();
                    players.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));
                    players.truncate(usize::try_from(limit).unwrap_or(0));
                    players
                })
                .await
        })
    }

    fn player_sessions(
        &self,
        player_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read(|t| {
                    let mut sessions: Vec<SessionEntity> = t
                        .enrollments
                        .iter()
                        .filter(|(player, _)| *player == player_id)
                        .filter_map(|(_, session_id)| t.sessions.get(session_id).cloned())
                        .collect();
                    sessions.sort_by(|a, b| (b.date, b.time, b.id).cmp(&(a.date, a.time, a.id)));
                    sessions
                })
                .await
        })
    }

    fn update_profile(
        &self,
        player_id: i32,
        profile: ProfileUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(|t| {
                    let Some(player) = t.players.get_mut(&player_id) else {
                        return Ok(None);
                    };
                    player.name = profile.name;
                    player.position = profile.position;
                    player.bio = profile.bio;
                    Ok(Some(player.clone()))
                })
                .await
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_online() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn player(name: &str) -> PlayerEntity {
        PlayerEntity {
            id: 0,
            name: name.into(),
            email: format!("{}@league.test", name.to_lowercase()),
            points: 0,
            games_played: 0,
            win_rate: 0.0,
            position: Some("Midfield".into()),
            bio: None,
            avatar_url: None,
            is_admin: false,
        }
    }

    async fn seeded_session(store: &MemoryLeagueStore) -> SessionEntity {
        let season = store
            .create_season(NewSeasonEntity {
                name: "Summer".into(),
                start_date: date!(2025 - 06 - 01),
                end_date: date!(2025 - 09 - 01),
            })
            .await
            .unwrap();
        store
            .create_session(NewSessionEntity {
                date: date!(2025 - 07 - 10),
                time: time!(19:00),
                location: "Riverside Park".into(),
                season_id: season.id,
            })
            .await
            .unwrap()
    }

    async fn team_sizes(store: &MemoryLeagueStore, session_id: i32) -> Vec<usize> {
        store
            .session_teams(session_id)
            .await
            .unwrap()
            .iter()
            .map(|team| team.players.len())
            .collect()
    }

    #[tokio::test]
    async fn enrolling_twice_keeps_one_enrollment_and_one_membership() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let p1 = store.insert_player(player("Ada")).await;

        let first = store.enroll(p1.id, session.id).await.unwrap().unwrap();
        let again = store.enroll(p1.id, session.id).await.unwrap().unwrap();
        let third = store.enroll(p1.id, session.id).await.unwrap().unwrap();

        assert!(first.newly_enrolled);
        assert!(!again.newly_enrolled);
        assert_eq!(first.team_id, again.team_id);
        assert_eq!(first.team_id, third.team_id);
        assert_eq!(store.enrollment_count(p1.id, session.id).await, 1);
        assert_eq!(team_sizes(&store, session.id).await, vec![1]);
    }

    #[tokio::test]
    async fn second_player_seeds_team_two() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let p1 = store.insert_player(player("Ada")).await;
        let p2 = store.insert_player(player("Brook")).await;

        let first = store.enroll(p1.id, session.id).await.unwrap().unwrap();
        let second = store.enroll(p2.id, session.id).await.unwrap().unwrap();

        assert_eq!(first.team_name, "Team 1");
        assert!(first.created_team);
        assert_eq!(second.team_name, "Team 2");
        assert!(second.created_team);
        assert_ne!(first.team_id, second.team_id);
    }

    #[tokio::test]
    async fn missing_session_yields_none_and_writes_nothing() {
        let store = MemoryLeagueStore::new();
        let p1 = store.insert_player(player("Ada")).await;

        assert!(store.enroll(p1.id, 42).await.unwrap().is_none());
        assert_eq!(store.enrollment_count(p1.id, 42).await, 0);
    }

    #[tokio::test]
    async fn failed_team_assignment_rolls_back_the_enrollment() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let p1 = store.insert_player(player("Ada")).await;

        store.fail_team_assignment(true);
        assert!(store.enroll(p1.id, session.id).await.is_err());
        assert_eq!(store.enrollment_count(p1.id, session.id).await, 0);
        assert!(store.session_teams(session.id).await.unwrap().is_empty());

        store.fail_team_assignment(false);
        let outcome = store.enroll(p1.id, session.id).await.unwrap().unwrap();
        assert!(outcome.newly_enrolled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enrollments_stay_balanced_with_two_teams() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let mut players = Vec::new();
        for index in 0..10 {
            players.push(store.insert_player(player(&format!("P{index:02}"))).await);
        }

        let handles: Vec<_> = players
            .iter()
            .map(|p| {
                let store = store.clone();
                let player_id = p.id;
                let session_id = session.id;
                tokio::spawn(async move { store.enroll(player_id, session_id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap().unwrap();
        }

        let teams = store.session_teams(session.id).await.unwrap();
        assert_eq!(teams.len(), 2);
        let total: usize = teams.iter().map(|team| team.players.len()).sum();
        assert_eq!(total, 10);
        assert!(teams[0].players.len().abs_diff(teams[1].players.len()) <= 1);
        for p in &players {
            assert_eq!(store.enrollment_count(p.id, session.id).await, 1);
        }
    }

    #[tokio::test]
    async fn list_enrolled_skips_players_already_in_a_game_of_the_session() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let ada = store.insert_player(player("Ada")).await;
        let brook = store.insert_player(player("Brook")).await;
        let cy = store.insert_player(player("Cy")).await;
        for p in [&ada, &brook, &cy] {
            store.enroll(p.id, session.id).await.unwrap().unwrap();
        }

        store
            .create_game(NewGameEntity {
                session_id: session.id,
                teams: vec![
                    crate::dao::models::NewGameTeamEntity {
                        name: "Reds".into(),
                        player_ids: vec![ada.id],
                    },
                    crate::dao::models::NewGameTeamEntity {
                        name: "Blues".into(),
                        player_ids: vec![brook.id],
                    },
                ],
            })
            .await
            .unwrap();

        let available = store.list_enrolled(session.id).await.unwrap();
        let names: Vec<&str> = available.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cy"]);
        assert!(available[0].session_team_id.is_some());
    }

    #[tokio::test]
    async fn deleting_a_session_cascades_to_teams_and_enrollments() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let ada = store.insert_player(player("Ada")).await;
        store.enroll(ada.id, session.id).await.unwrap().unwrap();

        assert!(store.delete_session(session.id).await.unwrap());
        assert!(store.session_teams(session.id).await.unwrap().is_empty());
        assert_eq!(store.enrollment_count(ada.id, session.id).await, 0);
        assert!(store.player_sessions(ada.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn game_update_cannot_put_a_player_on_both_teams() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let ada = store.insert_player(player("Ada")).await;
        let bob = store.insert_player(player("Bob")).await;
        let game = store
            .create_game(NewGameEntity {
                session_id: session.id,
                teams: vec![
                    crate::dao::models::NewGameTeamEntity {
                        name: "Reds".into(),
                        player_ids: vec![ada.id],
                    },
                    crate::dao::models::NewGameTeamEntity {
                        name: "Blues".into(),
                        player_ids: vec![bob.id],
                    },
                ],
            })
            .await
            .unwrap();
        let reds = game.teams[0].id;

        let result = store
            .update_game(
                game.id,
                GameUpdateEntity {
                    teams: vec![crate::dao::models::GameTeamUpdateEntity {
                        id: reds,
                        name: "Reds".into(),
                        player_ids: vec![ada.id, bob.id],
                    }],
                    winner_id: None,
                },
            )
            .await;
        assert!(matches!(result, Err(StorageError::Conflict { .. })));

        let stored = store.find_game(game.id).await.unwrap().unwrap();
        let rosters: Vec<Vec<i32>> = stored
            .teams
            .iter()
            .map(|team| team.players.iter().map(|p| p.id).collect())
            .collect();
        assert_eq!(rosters, vec![vec![ada.id], vec![bob.id]]);
    }

    #[tokio::test(start_paused = true)]
    async fn enrollment_dropped_mid_assignment_leaves_no_trace() {
        let store = MemoryLeagueStore::new();
        let session = seeded_session(&store).await;
        let ada = store.insert_player(player("Ada")).await;
        store.stall_team_assignment(Some(Duration::from_secs(30)));

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            store.enroll(ada.id, session.id),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(store.enrollment_count(ada.id, session.id).await, 0);
        assert!(store.session_teams(session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryLeagueStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.find_session(1).await,
            Err(StorageError::Unavailable { .. })
        ));
        assert!(store.health_check().await.is_err());
    }
}

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use diesel::{dsl::count_star, prelude::*};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use scoped_futures::ScopedFutureExt;
use time::Date;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    config::PgConfig,
    connection::{PgConnection, PgPool, checkout, establish_pool, ping},
    error::{PgDaoError, PgResult, query},
    models::{
        GameRow, InviteCodeRow, NewGameRow, NewInviteCodeRow, NewTeamRow, PlayerRow,
        PlayerSessionRow, PlayerTeamRow, ProfileChangeset, SeasonRow, SeasonValues, SessionRow,
        SessionValues, TeamRow,
    },
    schema::{games, invite_codes, player_sessions, player_teams, players, seasons, sessions, teams},
};
use crate::{
    dao::{
        league_store::LeagueStore,
        models::{
            EnrolledPlayerEntity, EnrollmentEntity, GameEntity, GameUpdateEntity,
            InviteCodeEntity, NewGameEntity, NewSeasonEntity, NewSessionEntity, PlayerEntity,
            ProfileUpdateEntity, RosterPlayerEntity, SeasonEntity, SessionEntity,
            SessionListItemEntity, TeamRosterEntity,
        },
        storage::StorageResult,
    },
    services::balancer::{self, BalancingStage, Placement, TeamLoad},
};

/// Postgres-backed league store sharing one bb8 pool of async diesel connections.
#[derive(Clone)]
pub struct PgLeagueStore {
    inner: Arc<PgInner>,
}

struct PgInner {
    pool: RwLock<PgPool>,
    config: PgConfig,
}

impl PgInner {
    async fn pool(&self) -> PgPool {
        self.pool.read().await.clone()
    }

    async fn reconnect(&self) -> PgResult<()> {
        let pool = establish_pool(&self.config).await?;
        *self.pool.write().await = pool;
        info!("Postgres pool re-established");
        Ok(())
    }
}

impl PgLeagueStore {
    /// Connect to Postgres and make sure the league tables exist.
    pub async fn connect(config: PgConfig) -> PgResult<Self> {
        let pool = establish_pool(&config).await?;
        Ok(Self {
            inner: Arc::new(PgInner {
                pool: RwLock::new(pool),
                config,
            }),
        })
    }

    async fn conn(&self) -> PgResult<PgConnection> {
        let pool = self.inner.pool().await;
        checkout(&pool).await
    }

    async fn find_session(&self, id: i32) -> PgResult<Option<SessionEntity>> {
        let mut conn = self.conn().await?;
        let row = sessions::table
            .find(id)
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query("find_session"))?;
        Ok(row.map(Into::into))
    }

    async fn list_sessions_from(&self, from: Date) -> PgResult<Vec<SessionListItemEntity>> {
        let mut conn = self.conn().await?;
        let rows: Vec<(SessionRow, String)> = sessions::table
            .inner_join(seasons::table)
            .filter(sessions::session_date.ge(from))
            .order((
                sessions::session_date.asc(),
                sessions::start_time.asc(),
                sessions::id.asc(),
            ))
            .select((SessionRow::as_select(), seasons::name))
            .load(&mut conn)
            .await
            .map_err(query("list_sessions_from"))?;
        with_player_counts(&mut conn, rows)
            .await
            .map_err(query("list_sessions_from"))
    }

    async fn list_sessions(&self) -> PgResult<Vec<SessionListItemEntity>> {
        let mut conn = self.conn().await?;
        let rows: Vec<(SessionRow, String)> = sessions::table
            .inner_join(seasons::table)
            .order((
                sessions::session_date.desc(),
                sessions::start_time.desc(),
                sessions::id.desc(),
            ))
            .select((SessionRow::as_select(), seasons::name))
            .load(&mut conn)
            .await
            .map_err(query("list_sessions"))?;
        with_player_counts(&mut conn, rows)
            .await
            .map_err(query("list_sessions"))
    }

    async fn create_session(&self, session: NewSessionEntity) -> PgResult<SessionEntity> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(sessions::table)
            .values(SessionValues::from(session))
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(query("create_session"))?;
        Ok(row.into())
    }

    async fn update_session(
        &self,
        id: i32,
        session: NewSessionEntity,
    ) -> PgResult<Option<SessionEntity>> {
        let mut conn = self.conn().await?;
        let row = diesel::update(sessions::table.find(id))
            .set(SessionValues::from(session))
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(query("update_session"))?;
        Ok(row.map(Into::into))
    }

    async fn delete_session(&self, id: i32) -> PgResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(sessions::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(query("delete_session"))?;
        Ok(deleted > 0)
    }

    async fn enroll(&self, player_id: i32, session_id: i32) -> PgResult<Option<EnrollmentEntity>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let outcome = conn
            .transaction::<_, PgDaoError, _>(move |conn| {
                async move {
                    // Serializes concurrent enrollments into the same session.
                    let locked: Vec<i32> = sessions::table
                        .filter(sessions::id.eq(session_id))
                        .select(sessions::id)
                        .for_update()
                        .load(conn)
                        .await?;
                    if locked.is_empty() {
                        return Ok(None);
                    }

                    let inserted = diesel::insert_into(player_sessions::table)
                        .values(PlayerSessionRow {
                            player_id,
                            session_id,
                        })
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    let newly_enrolled = inserted > 0;

                    let session_teams: Vec<(i32, String)> = teams::table
                        .filter(teams::session_id.eq(session_id))
                        .order(teams::id.asc())
                        .select((teams::id, teams::name))
                        .load(conn)
                        .await?;
                    let team_ids: Vec<i32> = session_teams.iter().map(|(id, _)| *id).collect();
                    let name_of = |team_id: i32| {
                        session_teams
                            .iter()
                            .find(|(id, _)| *id == team_id)
                            .map(|(_, name)| name.clone())
                            .unwrap_or_default()
                    };

                    let current: Option<i32> = player_teams::table
                        .filter(player_teams::player_id.eq(player_id))
                        .filter(player_teams::team_id.eq_any(team_ids.clone()))
                        .select(player_teams::team_id)
                        .first(conn)
                        .await
                        .optional()?;
                    if let Some(team_id) = current {
                        return Ok(Some(EnrollmentEntity {
                            player_id,
                            session_id,
                            team_id,
                            team_name: name_of(team_id),
                            newly_enrolled,
                            created_team: false,
                        }));
                    }

                    let counts: HashMap<i32, i64> = player_teams::table
                        .filter(player_teams::team_id.eq_any(team_ids))
                        .group_by(player_teams::team_id)
                        .select((player_teams::team_id, count_star()))
                        .load::<(i32, i64)>(conn)
                        .await?
                        .into_iter()
                        .collect();
                    let loads: Vec<TeamLoad> = session_teams
                        .iter()
                        .map(|(team_id, _)| TeamLoad {
                            team_id: *team_id,
                            members: counts.get(team_id).copied().unwrap_or(0) as usize,
                        })
                        .collect();

                    debug!(
                        session_id,
                        player_id,
                        stage = ?BalancingStage::from_team_count(loads.len()),
                        "placing enrollee"
                    );
                    let (team_id, team_name, created_team) = match balancer::place(&loads) {
                        Placement::Create { name } => {
                            let team_id: i32 = diesel::insert_into(teams::table)
                                .values(NewTeamRow {
                                    name: name.clone(),
                                    session_id: Some(session_id),
                                    game_id: None,
                                })
                                .returning(teams::id)
                                .get_result(conn)
                                .await?;
                            (team_id, name, true)
                        }
                        Placement::Join(team_id) => (team_id, name_of(team_id), false),
                    };

                    diesel::insert_into(player_teams::table)
                        .values(PlayerTeamRow { player_id, team_id })
                        .execute(conn)
                        .await?;

                    Ok(Some(EnrollmentEntity {
                        player_id,
                        session_id,
                        team_id,
                        team_name,
                        newly_enrolled,
                        created_team,
                    }))
                }
                .scope_boxed()
            })
            .await?;

        if let Some(enrollment) = &outcome {
            debug!(
                player_id,
                session_id,
                team_id = enrollment.team_id,
                created_team = enrollment.created_team,
                "player assigned to team"
            );
        }
        Ok(outcome)
    }

    async fn list_enrolled(&self, session_id: i32) -> PgResult<Vec<EnrolledPlayerEntity>> {
        let mut conn = self.conn().await?;
        let enrolled: Vec<(i32, String, Option<String>, Option<String>)> = player_sessions::table
            .inner_join(players::table)
            .filter(player_sessions::session_id.eq(session_id))
            .order((players::name.asc(), players::id.asc()))
            .select((
                players::id,
                players::name,
                players::position,
                players::avatar_url,
            ))
            .load(&mut conn)
            .await
            .map_err(query("list_enrolled"))?;

        let in_games: HashSet<i32> = player_teams::table
            .inner_join(teams::table.inner_join(games::table))
            .filter(games::session_id.eq(session_id))
            .select(player_teams::player_id)
            .load::<i32>(&mut conn)
            .await
            .map_err(query("list_enrolled"))?
            .into_iter()
            .collect();

        let session_team_of: HashMap<i32, i32> = player_teams::table
            .inner_join(teams::table)
            .filter(teams::session_id.eq(session_id))
            .select((player_teams::player_id, player_teams::team_id))
            .load::<(i32, i32)>(&mut conn)
            .await
            .map_err(query("list_enrolled"))?
            .into_iter()
            .collect();

        Ok(enrolled
            .into_iter()
            .filter(|(id, ..)| !in_games.contains(id))
            .map(|(id, name, position, avatar_url)| EnrolledPlayerEntity {
                id,
                name,
                position,
                avatar_url,
                session_team_id: session_team_of.get(&id).copied(),
            })
            .collect())
    }

    async fn session_teams(&self, session_id: i32) -> PgResult<Vec<TeamRosterEntity>> {
        let mut conn = self.conn().await?;
        let rows: Vec<(i32, String)> = teams::table
            .filter(teams::session_id.eq(session_id))
            .order(teams::id.asc())
            .select((teams::id, teams::name))
            .load(&mut conn)
            .await
            .map_err(query("session_teams"))?;
        load_rosters(&mut conn, rows)
            .await
            .map_err(query("session_teams"))
    }

    async fn list_games(&self, session_id: i32) -> PgResult<Vec<GameEntity>> {
        let mut conn = self.conn().await?;
        let rows: Vec<GameRow> = games::table
            .filter(games::session_id.eq(session_id))
            .order(games::id.asc())
            .select(GameRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query("list_games"))?;
        load_games(&mut conn, rows)
            .await
            .map_err(query("list_games"))
    }

    async fn find_game(&self, id: i32) -> PgResult<Option<GameEntity>> {
        let mut conn = self.conn().await?;
        find_game(&mut conn, id).await.map_err(query("find_game"))
    }

    async fn create_game(&self, game: NewGameEntity) -> PgResult<GameEntity> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, PgDaoError, _>(move |conn| {
            async move {
                let game_id: i32 = diesel::insert_into(games::table)
                    .values(NewGameRow {
                        session_id: game.session_id,
                    })
                    .returning(games::id)
                    .get_result(conn)
                    .await?;

                for team in game.teams {
                    let team_id: i32 = diesel::insert_into(teams::table)
                        .values(NewTeamRow {
                            name: team.name,
                            session_id: None,
                            game_id: Some(game_id),
                        })
                        .returning(teams::id)
                        .get_result(conn)
                        .await?;
                    let members: Vec<PlayerTeamRow> = team
                        .player_ids
                        .into_iter()
                        .map(|player_id| PlayerTeamRow { player_id, team_id })
                        .collect();
                    if !members.is_empty() {
                        diesel::insert_into(player_teams::table)
                            .values(&members)
                            .execute(conn)
                            .await?;
                    }
                }

                find_game(conn, game_id)
                    .await?
                    .ok_or_else(|| PgDaoError::Rejected {
                        message: format!("game `{game_id}` vanished during creation"),
                    })
            }
            .scope_boxed()
        })
        .await
    }

    async fn update_game(&self, id: i32, update: GameUpdateEntity) -> PgResult<Option<GameEntity>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, PgDaoError, _>(move |conn| {
            async move {
                let locked: Vec<i32> = games::table
                    .filter(games::id.eq(id))
                    .select(games::id)
                    .for_update()
                    .load(conn)
                    .await?;
                if locked.is_empty() {
                    return Ok(None);
                }

                let own_teams: HashSet<i32> = teams::table
                    .filter(teams::game_id.eq(id))
                    .select(teams::id)
                    .load::<i32>(conn)
                    .await?
                    .into_iter()
                    .collect();
                if let Some(winner) = update
                    .winner_id
                    .filter(|winner| !own_teams.contains(winner))
                {
                    return Err(PgDaoError::Rejected {
                        message: format!("team `{winner}` does not play in game `{id}`"),
                    });
                }

                for team in update.teams {
                    if !own_teams.contains(&team.id) {
                        return Err(PgDaoError::Rejected {
                            message: format!("team `{}` does not play in game `{id}`", team.id),
                        });
                    }
                    diesel::update(teams::table.find(team.id))
                        .set(teams::name.eq(team.name))
                        .execute(conn)
                        .await?;
                    diesel::delete(player_teams::table.filter(player_teams::team_id.eq(team.id)))
                        .execute(conn)
                        .await?;
                    let members: Vec<PlayerTeamRow> = team
                        .player_ids
                        .into_iter()
                        .map(|player_id| PlayerTeamRow {
                            player_id,
                            team_id: team.id,
                        })
                        .collect();
                    if !members.is_empty() {
                        diesel::insert_into(player_teams::table)
                            .values(&members)
                            .execute(conn)
                            .await?;
                    }
                }

                let doubled: Option<i32> = player_teams::table
                    .inner_join(teams::table)
                    .filter(teams::game_id.eq(id))
                    .group_by(player_teams::player_id)
                    .having(count_star().gt(1_i64))
                    .select(player_teams::player_id)
                    .first(conn)
                    .await
                    .optional()?;
                if let Some(player_id) = doubled {
                    return Err(PgDaoError::Rejected {
                        message: format!(
                            "player `{player_id}` would play for both teams of game `{id}`"
                        ),
                    });
                }

                diesel::update(games::table.find(id))
                    .set(games::winner_id.eq(update.winner_id))
                    .execute(conn)
                    .await?;

                Ok(find_game(conn, id).await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_game(&self, id: i32) -> PgResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(games::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(query("delete_game"))?;
        Ok(deleted > 0)
    }

    async fn find_season(&self, id: i32) -> PgResult<Option<SeasonEntity>> {
        let mut conn = self.conn().await?;
        let row = seasons::table
            .find(id)
            .select(SeasonRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query("find_season"))?;
        Ok(row.map(Into::into))
    }

    async fn list_seasons(&self) -> PgResult<Vec<SeasonEntity>> {
        let mut conn = self.conn().await?;
        let rows = seasons::table
            .order((seasons::start_date.desc(), seasons::id.desc()))
            .select(SeasonRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query("list_seasons"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_season(&self, season: NewSeasonEntity) -> PgResult<SeasonEntity> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(seasons::table)
            .values(SeasonValues::from(season))
            .returning(SeasonRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(query("create_season"))?;
        Ok(row.into())
    }

    async fn update_season(
        &self,
        id: i32,
        season: NewSeasonEntity,
    ) -> PgResult<Option<SeasonEntity>> {
        let mut conn = self.conn().await?;
        let row = diesel::update(seasons::table.find(id))
            .set(SeasonValues::from(season))
            .returning(SeasonRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(query("update_season"))?;
        Ok(row.map(Into::into))
    }

    async fn delete_season(&self, id: i32) -> PgResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(seasons::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(query("delete_season"))?;
        Ok(deleted > 0)
    }

    async fn list_invite_codes(&self) -> PgResult<Vec<InviteCodeEntity>> {
        let mut conn = self.conn().await?;
        let rows = invite_codes::table
            .order(invite_codes::id.desc())
            .select(InviteCodeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query("list_invite_codes"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_invite_code(
        &self,
        code: String,
        season_id: Option<i32>,
    ) -> PgResult<InviteCodeEntity> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(invite_codes::table)
            .values(NewInviteCodeRow { code, season_id })
            .returning(InviteCodeRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(query("create_invite_code"))?;
        Ok(row.into())
    }

    async fn find_player(&self, id: i32) -> PgResult<Option<PlayerEntity>> {
        let mut conn = self.conn().await?;
        let row = players::table
            .find(id)
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query("find_player"))?;
        Ok(row.map(Into::into))
    }

    async fn leaderboard(&self, limit: i64) -> PgResult<Vec<PlayerEntity>> {
        let mut conn = self.conn().await?;
        let rows = players::table
            .order((players::points.desc(), players::id.asc()))
            .limit(limit)
            .select(PlayerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query("leaderboard"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn player_sessions(&self, player_id: i32) -> PgResult<Vec<SessionEntity>> {
        let mut conn = self.conn().await?;
        let rows = player_sessions::table
            .inner_join(sessions::table)
            .filter(player_sessions::player_id.eq(player_id))
            .order((
                sessions::session_date.desc(),
                sessions::start_time.desc(),
                sessions::id.desc(),
            ))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query("player_sessions"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_profile(
        &self,
        player_id: i32,
        profile: ProfileUpdateEntity,
    ) -> PgResult<Option<PlayerEntity>> {
        let mut conn = self.conn().await?;
        let row = diesel::update(players::table.find(player_id))
            .set(ProfileChangeset::from(profile))
            .returning(PlayerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(query("update_profile"))?;
        Ok(row.map(Into::into))
    }
}

async fn with_player_counts(
    conn: &mut AsyncPgConnection,
    rows: Vec<(SessionRow, String)>,
) -> QueryResult<Vec<SessionListItemEntity>> {
    let ids: Vec<i32> = rows.iter().map(|(session, _)| session.id).collect();
    let counts: HashMap<i32, i64> = player_sessions::table
        .filter(player_sessions::session_id.eq_any(ids))
        .group_by(player_sessions::session_id)
        .select((player_sessions::session_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|(session, season_name)| SessionListItemEntity {
            player_count: counts.get(&session.id).copied().unwrap_or(0),
            session: session.into(),
            season_name,
        })
        .collect())
}

/// Attach members to `teams`, keeping the given team order and sorting players by name.
async fn load_rosters(
    conn: &mut AsyncPgConnection,
    teams: Vec<(i32, String)>,
) -> QueryResult<Vec<TeamRosterEntity>> {
    let ids: Vec<i32> = teams.iter().map(|(id, _)| *id).collect();
    let members: Vec<(i32, i32, String, Option<String>)> = player_teams::table
        .inner_join(players::table)
        .filter(player_teams::team_id.eq_any(ids))
        .order((players::name.asc(), players::id.asc()))
        .select((
            player_teams::team_id,
            players::id,
            players::name,
            players::position,
        ))
        .load(conn)
        .await?;

    let mut rosters: IndexMap<i32, TeamRosterEntity> = teams
        .into_iter()
        .map(|(id, name)| {
            (
                id,
                TeamRosterEntity {
                    id,
                    name,
                    players: Vec::new(),
                },
            )
        })
        .collect();
    for (team_id, id, name, position) in members {
        if let Some(roster) = rosters.get_mut(&team_id) {
            roster.players.push(RosterPlayerEntity { id, name, position });
        }
    }
    Ok(rosters.into_values().collect())
}

async fn load_games(
    conn: &mut AsyncPgConnection,
    rows: Vec<GameRow>,
) -> QueryResult<Vec<GameEntity>> {
    let game_ids: Vec<i32> = rows.iter().map(|game| game.id).collect();
    let team_rows: Vec<TeamRow> = teams::table
        .filter(teams::game_id.eq_any(game_ids))
        .order(teams::id.asc())
        .select(TeamRow::as_select())
        .load(conn)
        .await?;

    let owners: HashMap<i32, i32> = team_rows
        .iter()
        .filter_map(|team| team.game_id.map(|game_id| (team.id, game_id)))
        .collect();
    let rosters = load_rosters(
        conn,
        team_rows
            .into_iter()
            .map(|team| (team.id, team.name))
            .collect(),
    )
    .await?;

    let mut games: IndexMap<i32, GameEntity> = rows
        .into_iter()
        .map(|row| {
            (
                row.id,
                GameEntity {
                    id: row.id,
                    session_id: row.session_id,
                    winner_id: row.winner_id,
                    teams: Vec::new(),
                },
            )
        })
        .collect();
    for roster in rosters {
        if let Some(game) = owners.get(&roster.id).and_then(|id| games.get_mut(id)) {
            game.teams.push(roster);
        }
    }
    Ok(games.into_values().collect())
}

async fn find_game(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<GameEntity>> {
    let Some(row) = games::table
        .find(id)
        .select(GameRow::as_select())
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };
    Ok(load_games(conn, vec![row]).await?.into_iter().next())
}

impl LeagueStore for PgLeagueStore {
    fn find_session(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_session(id).await.map_err(Into::into) })
    }

    fn list_sessions_from(
        &self,
        from: Date,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_sessions_from(from).await.map_err(Into::into) })
    }

    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_sessions().await.map_err(Into::into) })
    }

    fn create_session(
        &self,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<SessionEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_session(session).await.map_err(Into::into) })
    }

    fn update_session(
        &self,
        id: i32,
        session: NewSessionEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_session(id, session).await.map_err(Into::into) })
    }

    fn delete_session(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_session(id).await.map_err(Into::into) })
    }

    fn enroll(
        &self,
        player_id: i32,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.enroll(player_id, session_id).await.map_err(Into::into) })
    }

    fn list_enrolled(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrolledPlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_enrolled(session_id).await.map_err(Into::into) })
    }

    fn session_teams(
        &self,
        session_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamRosterEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.session_teams(session_id).await.map_err(Into::into) })
    }

    fn list_games(&self, session_id: i32) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(session_id).await.map_err(Into::into) })
    }

    fn find_game(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(game).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: i32,
        update: GameUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_game(id, update).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn find_season(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_season(id).await.map_err(Into::into) })
    }

    fn list_seasons(&self) -> BoxFuture<'static, StorageResult<Vec<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_seasons().await.map_err(Into::into) })
    }

    fn create_season(
        &self,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<SeasonEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_season(season).await.map_err(Into::into) })
    }

    fn update_season(
        &self,
        id: i32,
        season: NewSeasonEntity,
    ) -> BoxFuture<'static, StorageResult<Option<SeasonEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_season(id, season).await.map_err(Into::into) })
    }

    fn delete_season(&self, id: i32) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_season(id).await.map_err(Into::into) })
    }

    fn list_invite_codes(&self) -> BoxFuture<'static, StorageResult<Vec<InviteCodeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_invite_codes().await.map_err(Into::into) })
    }

    fn create_invite_code(
        &self,
        code: String,
        season_id: Option<i32>,
    ) -> BoxFuture<'static, StorageResult<InviteCodeEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .create_invite_code(code, season_id)
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn leaderboard(&self, limit: i64) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.leaderboard(limit).await.map_err(Into::into) })
    }

    fn player_sessions(
        &self,
        player_id: i32,
    ) -> BoxFuture<'static, StorageResult<Vec<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.player_sessions(player_id).await.map_err(Into::into) })
    }

    fn update_profile(
        &self,
        player_id: i32,
        profile: ProfileUpdateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_profile(player_id, profile)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let pool = store.inner.pool().await;
            ping(&pool).await.map_err(Into::into)
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

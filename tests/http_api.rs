//! HTTP scenarios driven through the composed router over the in-memory store.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use time::{
    OffsetDateTime,
    macros::{date, datetime, time},
};
use tower::ServiceExt;

use league_back::{
    auth::{Claims, HmacCredentials},
    config::AppConfig,
    dao::{
        league_store::{LeagueStore, memory::MemoryLeagueStore},
        models::{NewSeasonEntity, NewSessionEntity, PlayerEntity},
    },
    routes,
    state::{AppState, ManualClock},
};

const SECRET: &[u8] = b"integration-secret";

struct Harness {
    app: Router,
    store: MemoryLeagueStore,
    clock: Arc<ManualClock>,
    credentials: HmacCredentials,
    session_id: i32,
}

impl Harness {
    async fn new() -> Self {
        let store = MemoryLeagueStore::default();
        let clock = Arc::new(ManualClock::new(datetime!(2025-07-07 00:00:00)));
        let credentials = HmacCredentials::new(SECRET);
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(credentials.clone()),
            clock.clone(),
        );
        state.install_store(Arc::new(store.clone())).await;

        let season = store
            .create_season(NewSeasonEntity {
                name: "Summer 2025".into(),
                start_date: date!(2025 - 06 - 01),
                end_date: date!(2025 - 08 - 31),
            })
            .await
            .unwrap();
        let session = store
            .create_session(NewSessionEntity {
                date: date!(2025 - 07 - 10),
                time: time!(19:00),
                location: "Riverside Park".into(),
                season_id: season.id,
            })
            .await
            .unwrap();

        Self {
            app: routes::router(state),
            store,
            clock,
            credentials,
            session_id: session.id,
        }
    }

    async fn player(&self, name: &str, is_admin: bool) -> i32 {
        self.store
            .insert_player(PlayerEntity {
                id: 0,
                name: name.into(),
                email: format!("{}@league.test", name.to_lowercase()),
                points: 0,
                games_played: 0,
                win_rate: 0.0,
                position: None,
                bio: None,
                avatar_url: None,
                is_admin,
            })
            .await
            .id
    }

    fn token(&self, player_id: i32, is_admin: bool) -> String {
        let claims = Claims {
            id: player_id,
            email: format!("player{player_id}@league.test"),
            is_admin,
            exp: OffsetDateTime::now_utc().unix_timestamp() + 3_600,
            iat: None,
        };
        self.credentials.sign(&claims).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn enroll(&self, player_id: i32) -> (StatusCode, Value) {
        let token = self.token(player_id, false);
        self.send(
            Method::POST,
            &format!("/sessions/{}/enroll", self.session_id),
            Some(&token),
            None,
        )
        .await
    }
}

fn roster_names(team: &Value) -> Vec<String> {
    team["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|player| player["name"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn enrollment_requires_credentials() {
    let harness = Harness::new().await;
    let (status, body) = harness
        .send(
            Method::POST,
            &format!("/sessions/{}/enroll", harness.session_id),
            None,
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn five_enrollments_alternate_between_two_teams() {
    let harness = Harness::new().await;
    let mut players = Vec::new();
    for name in ["P1", "P2", "P3", "P4", "P5"] {
        players.push(harness.player(name, false).await);
    }

    let mut assigned = Vec::new();
    for player in &players {
        let (status, body) = harness.enroll(*player).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["newlyEnrolled"], true);
        assigned.push(body["team"]["name"].as_str().unwrap().to_owned());
    }
    assert_eq!(
        assigned,
        vec!["Team 1", "Team 2", "Team 1", "Team 2", "Team 1"]
    );

    let token = harness.token(players[0], false);
    let (status, view) = harness
        .send(
            Method::GET,
            &format!("/sessions/{}", harness.session_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["games"], json!([]));
    assert_eq!(view["canEnroll"], true);

    let teams = view["teams"].as_array().unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0]["name"], "Team 1");
    assert_eq!(roster_names(&teams[0]), vec!["P1", "P3", "P5"]);
    assert_eq!(roster_names(&teams[1]), vec!["P2", "P4"]);
}

#[tokio::test]
async fn repeated_enrollment_keeps_the_same_team() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;

    let (_, first) = harness.enroll(player).await;
    let (status, second) = harness.enroll(player).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["newlyEnrolled"], false);
    assert_eq!(first["team"]["id"], second["team"]["id"]);
    assert_eq!(
        harness
            .store
            .enrollment_count(player, harness.session_id)
            .await,
        1
    );
}

#[tokio::test]
async fn closed_window_rejects_without_writing() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    harness.clock.set(datetime!(2025-07-06 23:59:59));

    let (status, body) = harness.enroll(player).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "enrollment_closed");
    assert_eq!(
        harness
            .store
            .enrollment_count(player, harness.session_id)
            .await,
        0
    );
}

#[tokio::test]
async fn auth_cookie_is_accepted() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    let request = Request::builder()
        .uri("/user/is-admin")
        .header(
            header::COOKIE,
            format!("theme=dark; token={}", harness.token(player, false)),
        )
        .body(Body::empty())
        .unwrap();

    let response = harness.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    let token = harness.token(player, false);

    let (status, body) = harness
        .send(Method::POST, "/sessions/999/enroll", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn withdrawal_is_not_implemented() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    let token = harness.token(player, false);

    let (status, body) = harness
        .send(
            Method::DELETE,
            &format!("/sessions/{}/enroll", harness.session_id),
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["kind"], "not_implemented");
}

#[tokio::test]
async fn unreachable_store_answers_service_unavailable() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    harness.store.set_offline(true);

    let (status, body) = harness.enroll(player).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "store_unavailable");

    let (status, health) = harness
        .send(Method::GET, "/healthcheck", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
}

#[tokio::test]
async fn leaderboard_is_public() {
    let harness = Harness::new().await;
    harness.player("Ada", false).await;

    let (status, body) = harness
        .send(Method::GET, "/leaderboard?limit=10", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["rank"], 1);
    assert_eq!(body[0]["name"], "Ada");
}

#[tokio::test]
async fn admin_routes_require_admin_rights() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    let admin = harness.player("Root", true).await;
    let season = json!({"name": "Autumn", "startDate": "2025-09-01", "endDate": "2025-11-30"});

    let (status, _) = harness
        .send(Method::POST, "/admin/seasons", None, Some(season.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = harness.token(player, false);
    let (status, body) = harness
        .send(
            Method::POST,
            "/admin/seasons",
            Some(&token),
            Some(season.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unauthorized");

    let token = harness.token(admin, true);
    let (status, body) = harness
        .send(Method::POST, "/admin/seasons", Some(&token), Some(season))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Autumn");
}

#[tokio::test]
async fn curated_game_drafts_players_and_validates_winner() {
    let harness = Harness::new().await;
    let admin = harness.player("Root", true).await;
    let ada = harness.player("Ada", false).await;
    let bob = harness.player("Bob", false).await;
    let cy = harness.player("Cy", false).await;
    for player in [ada, bob, cy] {
        harness.enroll(player).await;
    }
    let token = harness.token(admin, true);

    let (status, game) = harness
        .send(
            Method::POST,
            "/admin/games",
            Some(&token),
            Some(json!({
                "sessionId": harness.session_id,
                "teams": [
                    {"name": "Reds", "playerIds": [ada]},
                    {"name": "Blues", "playerIds": [bob]}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let game_id = game["id"].as_i64().unwrap();

    let (status, available) = harness
        .send(
            Method::GET,
            &format!("/admin/sessions/{}/players", harness.session_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["name"], "Cy");

    let (status, body) = harness
        .send(
            Method::PUT,
            &format!("/admin/games/{game_id}"),
            Some(&token),
            Some(json!({"winnerId": 999_999})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");

    let winner = game["teams"][0]["id"].clone();
    let (status, body) = harness
        .send(
            Method::PUT,
            &format!("/admin/games/{game_id}"),
            Some(&token),
            Some(json!({"winnerId": winner})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winnerId"], winner);

    let (_, view) = harness
        .send(
            Method::GET,
            &format!("/sessions/{}", harness.session_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(view["games"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn game_update_keeps_rosters_disjoint() {
    let harness = Harness::new().await;
    let admin = harness.player("Root", true).await;
    let ada = harness.player("Ada", false).await;
    let bob = harness.player("Bob", false).await;
    let token = harness.token(admin, true);

    let (status, game) = harness
        .send(
            Method::POST,
            "/admin/games",
            Some(&token),
            Some(json!({
                "sessionId": harness.session_id,
                "teams": [
                    {"name": "Reds", "playerIds": [ada]},
                    {"name": "Blues", "playerIds": [bob]}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let game_id = game["id"].as_i64().unwrap();
    let reds = game["teams"][0]["id"].clone();

    let (status, body) = harness
        .send(
            Method::PUT,
            &format!("/admin/games/{game_id}"),
            Some(&token),
            Some(json!({"teams": [{"id": reds, "name": "Reds", "playerIds": [ada, bob]}]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");

    let (status, stored) = harness
        .send(
            Method::GET,
            &format!("/admin/games/{game_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster_names(&stored["teams"][0]), vec!["Ada"]);
    assert_eq!(roster_names(&stored["teams"][1]), vec!["Bob"]);
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out_without_partial_enrollment() {
    let harness = Harness::new().await;
    let player = harness.player("Ada", false).await;
    harness
        .store
        .stall_team_assignment(Some(Duration::from_secs(60)));

    let (status, body) = harness.enroll(player).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "store_unavailable");
    assert_eq!(
        harness
            .store
            .enrollment_count(player, harness.session_id)
            .await,
        0
    );
    assert!(
        harness
            .store
            .session_teams(harness.session_id)
            .await
            .unwrap()
            .is_empty()
    );

    harness.store.stall_team_assignment(None);
    let (status, _) = harness.enroll(player).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        harness
            .store
            .enrollment_count(player, harness.session_id)
            .await,
        1
    );
}

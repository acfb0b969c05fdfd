//! League Back binary entrypoint wiring configuration, storage supervision and the REST API.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_back::{
    auth::HmacCredentials,
    config::AppConfig,
    dao::league_store::memory::MemoryLeagueStore,
    routes,
    state::{AppState, SharedState, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let clock = SystemClock::new(config.utc_offset);
    let app_state = AppState::new(
        config,
        Arc::new(HmacCredentials::new(secret)),
        Arc::new(clock),
    );

    start_store(app_state.clone()).await?;
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the backend selected by `LEAGUE_STORE`: `memory`, or `postgres` (the default)
/// under a background supervisor.
async fn start_store(state: SharedState) -> anyhow::Result<()> {
    let backend = env::var("LEAGUE_STORE").unwrap_or_else(|_| "postgres".into());
    match backend.as_str() {
        "memory" => {
            warn!("using the in-memory league store; data is lost on restart");
            state.install_store(Arc::new(MemoryLeagueStore::default())).await;
            Ok(())
        }
        #[cfg(feature = "pg-store")]
        "postgres" => {
            use league_back::{
                dao::league_store::{
                    LeagueStore,
                    postgres::{PgConfig, PgLeagueStore},
                },
                services::storage_supervisor,
            };

            let pg_config = PgConfig::from_env().context("reading postgres configuration")?;
            tokio::spawn(storage_supervisor::run(state, move || {
                let pg_config = pg_config.clone();
                async move {
                    let store = PgLeagueStore::connect(pg_config).await?;
                    Ok(Arc::new(store) as Arc<dyn LeagueStore>)
                }
            }));
            Ok(())
        }
        other => anyhow::bail!("unsupported LEAGUE_STORE backend `{other}`"),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

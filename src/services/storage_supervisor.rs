use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{league_store::LeagueStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep a league store connected, holding the shared state in degraded mode while it is not.
///
/// A store that stays unreachable after [`MAX_RECONNECT_ATTEMPTS`] is dropped and
/// `connect` is retried with exponential backoff.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn LeagueStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, retry_in_ms = delay.as_millis() as u64, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        state.install_store(store.clone()).await;
        info!("storage connection established; leaving degraded mode");
        delay = INITIAL_DELAY;

        while watch_health(&state, store.as_ref()).await {}

        warn!("exhausted storage reconnect attempts; dropping store");
        state.clear_store().await;
        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// One health probe. Returns `false` once the store is beyond recovery.
async fn watch_health(state: &SharedState, store: &dyn LeagueStore) -> bool {
    if store.health_check().await.is_ok() {
        if state.is_degraded() {
            info!("storage healthy again; leaving degraded mode");
            state.set_degraded(false);
        }
        sleep(HEALTH_POLL_INTERVAL).await;
        return true;
    }

    let mut reconnect_delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                state.set_degraded(false);
                sleep(HEALTH_POLL_INTERVAL).await;
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "storage reconnect first attempt failed; entering degraded mode");
                    state.set_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::HmacCredentials,
        config::AppConfig,
        dao::league_store::memory::MemoryLeagueStore,
        state::{AppState, ManualClock},
    };
    use time::macros::datetime;

    #[tokio::test(start_paused = true)]
    async fn installs_store_and_leaves_degraded_mode() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(HmacCredentials::new(b"secret")),
            Arc::new(ManualClock::new(datetime!(2025-07-07 00:00:00))),
        );
        assert!(state.is_degraded());

        let mut watcher = state.degraded_watcher();
        let supervised = state.clone();
        let task = tokio::spawn(run(supervised, || async {
            Ok(Arc::new(MemoryLeagueStore::default()) as Arc<dyn LeagueStore>)
        }));

        watcher.wait_for(|degraded| !degraded).await.unwrap();
        assert!(state.store().await.is_some());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_store_puts_state_back_in_degraded_mode() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(HmacCredentials::new(b"secret")),
            Arc::new(ManualClock::new(datetime!(2025-07-07 00:00:00))),
        );
        let store = MemoryLeagueStore::default();
        let handle = store.clone();

        let mut watcher = state.degraded_watcher();
        let task = tokio::spawn(run(state.clone(), move || {
            let store = store.clone();
            async move { Ok(Arc::new(store) as Arc<dyn LeagueStore>) }
        }));

        watcher.wait_for(|degraded| !degraded).await.unwrap();
        handle.set_offline(true);
        watcher.wait_for(|degraded| *degraded).await.unwrap();
        assert!(state.require_store().await.is_err());
        task.abort();
    }
}

/// League wall-clock sources.
pub mod clock;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    auth::CredentialVerifier, config::AppConfig, dao::league_store::LeagueStore,
    error::ServiceError,
};

pub use self::clock::{Clock, ManualClock, SystemClock};

/// Reference-counted handle to [`AppState`] shared by handlers.
pub type SharedState = Arc<AppState>;

/// Central application state: the store handle plus the collaborators every request needs.
pub struct AppState {
    store: RwLock<Option<Arc<dyn LeagueStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    verifier: Arc<dyn CredentialVerifier>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(
        config: AppConfig,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            config,
            verifier,
            clock,
        })
    }

    /// Obtain a handle to the current league store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn LeagueStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Store handle for operations that cannot run in degraded mode.
    pub async fn require_store(&self) -> Result<Arc<dyn LeagueStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new league store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn LeagueStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.set_degraded(false);
    }

    /// Remove the current league store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.set_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn set_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Verifier for request credentials.
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }

    /// League wall clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::HmacCredentials, dao::league_store::memory::MemoryLeagueStore};
    use time::macros::datetime;

    fn state() -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(HmacCredentials::new(b"secret")),
            Arc::new(ManualClock::new(datetime!(2025-07-07 00:00:00))),
        )
    }

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = state();
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .install_store(Arc::new(MemoryLeagueStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(state.require_store().await.is_ok());
    }

    #[tokio::test]
    async fn degraded_flag_is_broadcast_on_change() {
        let state = state();
        let mut watcher = state.degraded_watcher();
        state
            .install_store(Arc::new(MemoryLeagueStore::new()))
            .await;
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow_and_update());

        state.clear_store().await;
        watcher.changed().await.unwrap();
        assert!(*watcher.borrow());
        assert!(state.store().await.is_none());
    }
}

use std::future::Future;

use tokio::time::timeout;
use tracing::warn;

use crate::{
    dao::storage::{StorageError, StorageResult},
    error::ServiceError,
    state::AppState,
};

/// Admin workflows for seasons, sessions, invite codes and curated games.
pub mod admin_service;
/// Least-loaded assignment of enrollees to the two session teams.
pub mod balancer;
/// OpenAPI documentation generation.
pub mod documentation;
/// Time window gating enrollment.
pub mod enrollment_window;
/// Enroll-then-balance workflow and the available-players pool.
pub mod enrollment_service;
/// Health check service.
pub mod health_service;
/// Player statistics, leaderboard and profile.
pub mod player_service;
/// Session listings and session view assembly.
pub mod session_service;
/// Keeps a store connected and toggles degraded mode.
pub mod storage_supervisor;

/// Await a store operation under the configured deadline.
///
/// A timed-out operation is dropped mid-flight, which rolls its transaction back.
pub(crate) async fn with_deadline<T>(
    state: &AppState,
    operation: impl Future<Output = StorageResult<T>>,
) -> Result<T, ServiceError> {
    match timeout(state.config().store_timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            if let StorageError::Unavailable { .. } = &err {
                warn!(error = %err, "storage operation failed");
            }
            Err(err.into())
        }
        Err(_) => {
            warn!(
                timeout_ms = state.config().store_timeout.as_millis() as u64,
                "storage operation timed out"
            );
            Err(ServiceError::Timeout)
        }
    }
}

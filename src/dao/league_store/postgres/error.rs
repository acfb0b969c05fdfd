use diesel::result::Error as DieselError;
use thiserror::Error;

/// Result alias for Postgres DAO operations.
pub type PgResult<T> = std::result::Result<T, PgDaoError>;

/// Failures of the Postgres backend, converted into [`StorageError`] at the trait boundary.
///
/// [`StorageError`]: crate::dao::storage::StorageError
#[derive(Debug, Error)]
pub enum PgDaoError {
    /// A required environment variable is not set.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// An environment variable holds an unusable value.
    #[error("invalid value `{value}` for `{var}`")]
    InvalidEnvVar {
        /// Name of the variable.
        var: &'static str,
        /// Value that was rejected.
        value: String,
    },
    /// The connection pool could not be created.
    #[error("failed to build Postgres connection pool: {message}")]
    PoolBuild {
        /// Pool builder error text.
        message: String,
    },
    /// No connection could be taken from the pool.
    #[error("failed to check out a Postgres connection: {message}")]
    Checkout {
        /// Pool checkout error text.
        message: String,
    },
    /// Applying the schema DDL failed.
    #[error("failed to apply league schema")]
    EnsureSchema {
        /// Underlying diesel error.
        #[source]
        source: DieselError,
    },
    /// The health query failed.
    #[error("Postgres health check failed")]
    HealthPing {
        /// Underlying diesel error.
        #[source]
        source: DieselError,
    },
    /// A single statement failed.
    #[error("query `{operation}` failed")]
    Query {
        /// Store operation that issued the statement.
        operation: &'static str,
        /// Underlying diesel error.
        #[source]
        source: DieselError,
    },
    /// A transaction failed or was rolled back.
    #[error("database transaction failed")]
    Transaction {
        /// Underlying diesel error.
        #[from]
        source: DieselError,
    },
    /// The transaction was aborted because the write breaks a league rule.
    #[error("{message}")]
    Rejected {
        /// Which rule the write broke.
        message: String,
    },
}

/// Map a diesel failure of `operation` into a [`PgDaoError`].
pub fn query(operation: &'static str) -> impl FnOnce(DieselError) -> PgDaoError {
    move |source| PgDaoError::Query { operation, source }
}

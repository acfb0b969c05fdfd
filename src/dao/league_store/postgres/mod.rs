mod config;
mod connection;
mod error;
mod models;
mod schema;
/// [`LeagueStore`](super::LeagueStore) implementation.
pub mod store;

pub use config::PgConfig;
pub use error::PgDaoError;
pub use store::PgLeagueStore;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::dao::storage::StorageError;

impl From<PgDaoError> for StorageError {
    fn from(err: PgDaoError) -> Self {
        let conflict = match &err {
            PgDaoError::Rejected { .. } => true,
            PgDaoError::Query { source, .. } | PgDaoError::Transaction { source } => {
                violates_constraint(source)
            }
            _ => false,
        };
        if conflict {
            StorageError::conflict(err.to_string())
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}

fn violates_constraint(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation,
            _
        )
    )
}

use std::time::Duration;

use diesel_async::{
    AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection,
    pooled_connection::{
        AsyncDieselConnectionManager,
        bb8::{Pool, PooledConnection},
    },
};
use tokio::time::sleep;
use tracing::warn;

use super::{
    config::PgConfig,
    error::{PgDaoError, PgResult},
};

pub type PgPool = Pool<AsyncPgConnection>;
pub type PgConnection = PooledConnection<'static, AsyncPgConnection>;

const SCHEMA: &str = include_str!("schema.sql");

struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 250;

    fn initial_delay() -> Duration {
        Duration::from_millis(Self::INITIAL_DELAY_MS)
    }

    fn next_delay(current: Duration) -> Duration {
        (current * 2).min(Duration::from_secs(5))
    }
}

/// Build a connection pool, wait until the database answers and apply the schema.
pub async fn establish_pool(config: &PgConfig) -> PgResult<PgPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(manager)
        .await
        .map_err(|err| PgDaoError::PoolBuild {
            message: err.to_string(),
        })?;

    let mut attempts = 0;
    let mut delay = RetryPolicy::initial_delay();
    let mut conn = loop {
        match checkout(&pool).await {
            Ok(conn) => break conn,
            Err(err) => {
                attempts += 1;
                if attempts >= RetryPolicy::MAX_ATTEMPTS {
                    return Err(err);
                }
                warn!(error = %err, attempts, "Postgres not reachable yet; retrying");
                sleep(delay).await;
                delay = RetryPolicy::next_delay(delay);
            }
        }
    };

    conn.batch_execute(SCHEMA)
        .await
        .map_err(|source| PgDaoError::EnsureSchema { source })?;

    Ok(pool)
}

/// Check a connection out of `pool` without borrowing the pool.
pub async fn checkout(pool: &PgPool) -> PgResult<PgConnection> {
    pool.get_owned().await.map_err(|err| PgDaoError::Checkout {
        message: err.to_string(),
    })
}

/// Round-trip a trivial statement through a pooled connection.
pub async fn ping(pool: &PgPool) -> PgResult<()> {
    let mut conn = checkout(pool).await?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(|source| PgDaoError::HealthPing { source })?;
    Ok(())
}

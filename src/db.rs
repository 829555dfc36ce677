use std::time::Duration;

use sqlx::{
    pool::PoolConnection,
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::QueryAs,
    FromRow, PgPool, Postgres,
};
use tracing::error;

use crate::config::DbConfig;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("timed out after {0:?} waiting for a database connection")]
    AcquisitionTimeout(Duration),
    #[error(transparent)]
    Statement(#[from] sqlx::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Statement(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }

    /// Database diagnostic suitable for an API response (no connection details).
    pub fn detail(&self) -> String {
        match self {
            DbError::Statement(sqlx::Error::Database(e)) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Bounded, lazily opened connection pool. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    acquire_timeout: Duration,
}

impl Database {
    /// Does not touch the network; the first connection opens on first query.
    pub fn new(cfg: &DbConfig) -> Self {
        let pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout)
            .connect_lazy_with(cfg.connect.clone());
        Self {
            pool,
            acquire_timeout: cfg.acquire_timeout,
        }
    }

    #[cfg(test)]
    pub fn from_pool(pool: PgPool) -> Self {
        let acquire_timeout = pool.options().get_acquire_timeout();
        Self {
            pool,
            acquire_timeout,
        }
    }

    async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        match self.pool.acquire().await {
            Ok(conn) => Ok(conn),
            Err(sqlx::Error::PoolTimedOut) => {
                error!(
                    timeout_secs = self.acquire_timeout.as_secs(),
                    max_connections = self.pool.options().get_max_connections(),
                    open = self.pool.size(),
                    idle = self.pool.num_idle(),
                    "timed out acquiring database connection"
                );
                Err(DbError::AcquisitionTimeout(self.acquire_timeout))
            }
            Err(e) => Err(DbError::Statement(e)),
        }
    }

    /// Runs the query and returns every row, possibly none.
    pub async fn query_all<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, DbError>
    where
        T: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        let mut conn = self.acquire().await?;
        Ok(query.fetch_all(&mut *conn).await?)
    }

    /// Runs the query and returns the first row, or `None` for an empty result.
    pub async fn query_one<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Option<T>, DbError>
    where
        T: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        let mut conn = self.acquire().await?;
        Ok(query.fetch_optional(&mut *conn).await?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

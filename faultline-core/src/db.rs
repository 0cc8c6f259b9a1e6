use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::CoreConfig;
use crate::errors::Result;

/// Wrapper around the Postgres connection pool provided to the services.
#[derive(Clone)]
pub struct DatabasePool {
    pool: Pool<Postgres>,
}

impl DatabasePool {
    /// Builds a lazily connected pool when the configuration names a database.
    pub fn connect_lazy(config: &CoreConfig) -> Result<Option<Self>> {
        match config.database_url() {
            Some(url) => Ok(Some(Self::connect_lazy_with_url(url)?)),
            None => {
                info!("no database configured");
                Ok(None)
            }
        }
    }

    /// Builds a pool that only connects on first use.
    pub fn connect_lazy_with_url(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Round-trips a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CommonErrorKind;

    #[tokio::test]
    async fn no_url_means_no_pool() {
        let pool = DatabasePool::connect_lazy(&CoreConfig::default()).expect("lazy pool");
        assert!(pool.is_none());
    }

    #[tokio::test]
    async fn malformed_url_is_a_database_error() {
        let err = DatabasePool::connect_lazy_with_url("not a url").err().expect("invalid url");
        assert_eq!(err.kind(), &CommonErrorKind::DatabaseError);
        assert!(err.is_from_module("database"));
    }
}

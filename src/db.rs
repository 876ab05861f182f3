use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

/// Error taxonomy shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Record absent, or present but not owned by the caller.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("duplicate value: {0}")]
    Duplicate(String),
    #[error("database unavailable: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl RepoError {
    pub fn is_connection(&self) -> bool {
        matches!(self, RepoError::Connection(_))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(
            e,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ) {
            return RepoError::Connection(e);
        }
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return RepoError::Duplicate(db.message().to_string());
            }
        }
        RepoError::Query(e)
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

/// Ids are `BIGSERIAL` in Postgres and `u32` in the API.
pub(crate) fn id_param(id: u32) -> i64 {
    i64::from(id)
}

//! Postgres-backed repository implementations.

mod defaults;
mod overrides;
mod sites;

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::application::repos::RepoError;
use crate::config::DatabaseSettings;

use super::error::InfraError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, InfraError> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .map_err(|err| InfraError::database(format!("failed to connect: {err}")))
}

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::Database(db) if db.message().contains("violates") => RepoError::Integrity {
            message: db.message().to_string(),
        },
        other => RepoError::from_persistence(other),
    }
}

pub(crate) fn kind_from_tag(tag: &str) -> Result<crate::domain::kinds::Kind, RepoError> {
    crate::domain::kinds::Kind::from_tag(tag).ok_or_else(|| RepoError::Integrity {
        message: format!("unknown kind tag `{tag}`"),
    })
}

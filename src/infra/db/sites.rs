use async_trait::async_trait;

use crate::{
    application::repos::{RepoError, SitesRepo},
    domain::entities::SiteRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SiteRow {
    url: String,
    auth_url: String,
}

impl From<SiteRow> for SiteRecord {
    fn from(row: SiteRow) -> Self {
        Self {
            url: row.url,
            auth_url: row.auth_url,
        }
    }
}

#[async_trait]
impl SitesRepo for PostgresRepositories {
    async fn find_site(&self, site_url: &str) -> Result<Option<SiteRecord>, RepoError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT url, auth_url
            FROM sites
            WHERE url = $1
            "#,
        )
        .bind(site_url)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SiteRecord::from))
    }

    async fn upsert_site(&self, site: SiteRecord) -> Result<SiteRecord, RepoError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"
            INSERT INTO sites (url, auth_url)
            VALUES ($1, $2)
            ON CONFLICT (url) DO UPDATE SET auth_url = EXCLUDED.auth_url
            RETURNING url, auth_url
            "#,
        )
        .bind(&site.url)
        .bind(&site.auth_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SiteRecord::from(row))
    }
}

use async_trait::async_trait;

use crate::{
    application::repos::{DefaultsRepo, RepoError, UpsertDefaultParams},
    domain::entities::DefaultRecord,
};

use super::{PostgresRepositories, kind_from_tag, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct DefaultRow {
    site_url: String,
    key: String,
    kind: String,
    value: String,
    deprecated: bool,
}

impl DefaultRow {
    fn into_record(self) -> Result<DefaultRecord, RepoError> {
        Ok(DefaultRecord {
            kind: kind_from_tag(&self.kind)?,
            site_url: self.site_url,
            key: self.key,
            value: self.value,
            deprecated: self.deprecated,
        })
    }
}

#[async_trait]
impl DefaultsRepo for PostgresRepositories {
    async fn list_defaults(&self, site_url: &str) -> Result<Vec<DefaultRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DefaultRow>(
            r#"
            SELECT site_url, key, kind, value, deprecated
            FROM defaults
            WHERE site_url = $1
            ORDER BY key
            "#,
        )
        .bind(site_url)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DefaultRow::into_record).collect()
    }

    async fn find_default(
        &self,
        site_url: &str,
        key: &str,
    ) -> Result<Option<DefaultRecord>, RepoError> {
        let row = sqlx::query_as::<_, DefaultRow>(
            r#"
            SELECT site_url, key, kind, value, deprecated
            FROM defaults
            WHERE site_url = $1 AND key = $2
            "#,
        )
        .bind(site_url)
        .bind(key)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DefaultRow::into_record).transpose()
    }

    async fn upsert_default(
        &self,
        params: UpsertDefaultParams,
    ) -> Result<DefaultRecord, RepoError> {
        let row = sqlx::query_as::<_, DefaultRow>(
            r#"
            INSERT INTO defaults (site_url, key, kind, value, deprecated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (site_url, key) DO UPDATE SET
                kind = EXCLUDED.kind,
                value = EXCLUDED.value,
                deprecated = EXCLUDED.deprecated
            RETURNING site_url, key, kind, value, deprecated
            "#,
        )
        .bind(&params.site_url)
        .bind(&params.key)
        .bind(params.kind.tag())
        .bind(&params.value)
        .bind(params.deprecated)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.into_record()
    }

    async fn delete_default(&self, site_url: &str, key: &str) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM defaults
            WHERE site_url = $1 AND key = $2
            "#,
        )
        .bind(site_url)
        .bind(key)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

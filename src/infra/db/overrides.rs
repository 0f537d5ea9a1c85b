use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{OverridesRepo, RepoError, UpsertOverrideParams},
    domain::entities::OverrideRecord,
};

use super::{PostgresRepositories, kind_from_tag, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct OverrideRow {
    id: Uuid,
    site_url: String,
    user_id: String,
    key: String,
    kind: String,
    value: String,
}

impl OverrideRow {
    fn into_record(self) -> Result<OverrideRecord, RepoError> {
        Ok(OverrideRecord {
            kind: kind_from_tag(&self.kind)?,
            id: self.id,
            site_url: self.site_url,
            user_id: self.user_id,
            key: self.key,
            value: self.value,
        })
    }
}

#[async_trait]
impl OverridesRepo for PostgresRepositories {
    async fn list_overrides(
        &self,
        site_url: &str,
        user_id: &str,
    ) -> Result<Vec<OverrideRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT id, site_url, user_id, key, kind, value
            FROM overrides
            WHERE site_url = $1 AND user_id = $2
            "#,
        )
        .bind(site_url)
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(OverrideRow::into_record).collect()
    }

    async fn upsert_override(
        &self,
        params: UpsertOverrideParams,
    ) -> Result<OverrideRecord, RepoError> {
        // Single atomic statement; concurrent updates for the same
        // (site, user, key) cannot create duplicate rows.
        let row = sqlx::query_as::<_, OverrideRow>(
            r#"
            INSERT INTO overrides (id, site_url, user_id, key, kind, value)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (site_url, user_id, key) DO UPDATE SET
                kind = EXCLUDED.kind,
                value = EXCLUDED.value
            RETURNING id, site_url, user_id, key, kind, value
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.site_url)
        .bind(&params.user_id)
        .bind(&params.key)
        .bind(params.kind.tag())
        .bind(&params.value)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.into_record()
    }

    async fn delete_override(
        &self,
        site_url: &str,
        user_id: &str,
        key: &str,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM overrides
            WHERE site_url = $1 AND user_id = $2 AND key = $3
            "#,
        )
        .bind(site_url)
        .bind(user_id)
        .bind(key)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

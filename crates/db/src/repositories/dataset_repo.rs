//! Repository for the `datasets` table.

use sqlx::{PgConnection, PgPool};
use sources_core::permissions::PermissionStrings;
use sources_core::types::DbId;

use crate::models::dataset::{CreateDataset, Dataset};

/// Column list for `datasets` queries.
const COLUMNS: &str = "\
    id, kind, name, perm, schema_perm, catalog_perm, cache_timeout, \
    created_at, updated_at";

pub struct DatasetRepo;

impl DatasetRepo {
    pub async fn create(pool: &PgPool, input: &CreateDataset) -> Result<Dataset, sqlx::Error> {
        let query = format!(
            "INSERT INTO datasets (kind, name, perm, schema_perm, catalog_perm, cache_timeout) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dataset>(&query)
            .bind(&input.kind)
            .bind(&input.name)
            .bind(&input.perm)
            .bind(&input.schema_perm)
            .bind(&input.catalog_perm)
            .bind(input.cache_timeout)
            .fetch_one(pool)
            .await
    }

    /// Find a dataset by its `(kind, id)` reference.
    pub async fn find_by_ref(
        pool: &PgPool,
        kind: &str,
        id: DbId,
    ) -> Result<Option<Dataset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM datasets WHERE kind = $1 AND id = $2");
        sqlx::query_as::<_, Dataset>(&query)
            .bind(kind)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permission strings of the referenced dataset, read on the caller's
    /// connection so the lookup joins the surrounding write transaction.
    pub async fn find_permissions(
        conn: &mut PgConnection,
        kind: &str,
        id: DbId,
    ) -> Result<Option<PermissionStrings>, sqlx::Error> {
        let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT perm, schema_perm FROM datasets WHERE kind = $1 AND id = $2",
        )
        .bind(kind)
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(|(perm, schema_perm)| PermissionStrings { perm, schema_perm }))
    }
}

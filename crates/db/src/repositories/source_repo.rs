//! Repository for the `sources` table and its owner associations.
//!
//! Every insert or update runs inside one transaction:
//! before-write hooks, the statement itself, owner changes, commit. The
//! after-write hooks run only once the commit has succeeded.
//!
//! Update, metadata and delete lock the row and check ownership against
//! `source_owners` on the same transaction before touching anything.

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use sources_core::authz::AuthContext;
use sources_core::extra_json::merge_columns;
use sources_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use sources_core::types::{DbId, Timestamp};

use crate::error::DbError;
use crate::hooks::{SourceHooks, SourceWrite};
use crate::models::source::{CreateSource, ListSourcesParams, Source, UpdateSource};

/// Column list for `sources` queries.
const COLUMNS: &str = "\
    id, source_name, source_type, description, cache_timeout, \
    params, query_context, extra_json, datasource_id, datasource_type, \
    perm, schema_perm, catalog_perm, last_saved_at, last_saved_by, \
    is_managed_externally, external_url, \
    created_by, changed_by, created_on, changed_on";

/// Provides CRUD and sync queries for sources.
pub struct SourceRepo;

impl SourceRepo {
    /// Find a source by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Source>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sources WHERE id = $1");
        sqlx::query_as::<_, Source>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sources, most recently changed first, optionally filtered by a
    /// case-insensitive substring of `source_name`.
    pub async fn list(
        pool: &PgPool,
        params: &ListSourcesParams,
    ) -> Result<Vec<Source>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(params.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM sources \
             WHERE ($1::TEXT IS NULL OR source_name ILIKE '%' || $1 || '%' ESCAPE '\\') \
             ORDER BY changed_on DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Source>(&query)
            .bind(params.q.as_deref().filter(|q| !q.is_empty()).map(escape_like))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Insert a source. The acting user (if any) and `input.owners` become
    /// its owners.
    pub async fn create(
        pool: &PgPool,
        hooks: &SourceHooks,
        ctx: &AuthContext,
        input: &CreateSource,
    ) -> Result<Source, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut write = SourceWrite {
            source_id: None,
            datasource_id: input.datasource_id,
            datasource_type: input.datasource_type.clone(),
            permissions: Default::default(),
        };
        hooks.run_before_write(&mut tx, &mut write).await?;

        let query = format!(
            "INSERT INTO sources \
                 (source_name, source_type, description, cache_timeout, params, \
                  query_context, datasource_id, datasource_type, perm, schema_perm, \
                  is_managed_externally, external_url, \
                  created_by, changed_by, last_saved_at, last_saved_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13, NOW(), $13) \
             RETURNING {COLUMNS}"
        );
        let source = sqlx::query_as::<_, Source>(&query)
            .bind(&input.source_name)
            .bind(&input.source_type)
            .bind(&input.description)
            .bind(input.cache_timeout)
            .bind(&input.params)
            .bind(&input.query_context)
            .bind(write.datasource_id)
            .bind(&write.datasource_type)
            .bind(&write.permissions.perm)
            .bind(&write.permissions.schema_perm)
            .bind(input.is_managed_externally)
            .bind(&input.external_url)
            .bind(ctx.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let owners: Vec<DbId> = ctx.user_id.into_iter().chain(input.owners.iter().copied()).collect();
        insert_owners(&mut tx, source.id, &owners).await?;

        tx.commit().await?;
        hooks.run_after_write(ctx, &source);
        Ok(source)
    }

    /// Apply a partial update. Returns `None` if the source does not exist.
    ///
    /// Fails with `Forbidden` unless `ctx` owns the source or is an admin.
    /// Also stamps `changed_by`, `last_saved_at` and `last_saved_by`. When
    /// `input.owners` is present it replaces the owner set.
    pub async fn update(
        pool: &PgPool,
        hooks: &SourceHooks,
        ctx: &AuthContext,
        id: DbId,
        input: &UpdateSource,
    ) -> Result<Option<Source>, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = lock_for_write(&mut tx, id).await? else {
            return Ok(None);
        };
        authorize(&mut tx, ctx, id, "update").await?;

        let mut write = SourceWrite {
            source_id: Some(id),
            datasource_id: input.datasource_id.or(current.datasource_id),
            datasource_type: input
                .datasource_type
                .clone()
                .or_else(|| current.datasource_type.clone()),
            permissions: current.permissions(),
        };
        hooks.run_before_write(&mut tx, &mut write).await?;

        let query = format!(
            "UPDATE sources SET \
                 source_name = COALESCE($2, source_name), \
                 source_type = COALESCE($3, source_type), \
                 description = COALESCE($4, description), \
                 cache_timeout = COALESCE($5, cache_timeout), \
                 params = COALESCE($6, params), \
                 query_context = COALESCE($7, query_context), \
                 datasource_id = $8, \
                 datasource_type = $9, \
                 perm = $10, \
                 schema_perm = $11, \
                 is_managed_externally = COALESCE($12, is_managed_externally), \
                 external_url = COALESCE($13, external_url), \
                 changed_by = $14, \
                 last_saved_at = NOW(), \
                 last_saved_by = $14 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let source = sqlx::query_as::<_, Source>(&query)
            .bind(id)
            .bind(&input.source_name)
            .bind(&input.source_type)
            .bind(&input.description)
            .bind(input.cache_timeout)
            .bind(&input.params)
            .bind(&input.query_context)
            .bind(write.datasource_id)
            .bind(&write.datasource_type)
            .bind(&write.permissions.perm)
            .bind(&write.permissions.schema_perm)
            .bind(input.is_managed_externally)
            .bind(&input.external_url)
            .bind(ctx.user_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(owners) = &input.owners {
            replace_owners(&mut tx, id, owners).await?;
        }

        tx.commit().await?;
        hooks.run_after_write(ctx, &source);
        Ok(Some(source))
    }

    /// Merge column metadata from `payload["columns"]` into `extra_json`.
    ///
    /// Other keys of the bag are preserved. The row is written like any other
    /// update, so `changed_on` moves and the hooks run. Ownership is checked
    /// as for [`SourceRepo::update`]. Returns `None` if the source does not
    /// exist.
    pub async fn save_metadata(
        pool: &PgPool,
        hooks: &SourceHooks,
        ctx: &AuthContext,
        id: DbId,
        payload: &Value,
    ) -> Result<Option<Source>, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = lock_for_write(&mut tx, id).await? else {
            return Ok(None);
        };
        authorize(&mut tx, ctx, id, "update").await?;
        let extra_json = merge_columns(Some(&current.extra_json), payload);

        let mut write = SourceWrite {
            source_id: Some(id),
            datasource_id: current.datasource_id,
            datasource_type: current.datasource_type.clone(),
            permissions: current.permissions(),
        };
        hooks.run_before_write(&mut tx, &mut write).await?;

        let query = format!(
            "UPDATE sources SET extra_json = $2, perm = $3, schema_perm = $4, changed_by = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let source = sqlx::query_as::<_, Source>(&query)
            .bind(id)
            .bind(&extra_json)
            .bind(&write.permissions.perm)
            .bind(&write.permissions.schema_perm)
            .bind(ctx.user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        hooks.run_after_write(ctx, &source);
        Ok(Some(source))
    }

    /// Delete a source owned by `ctx` (or any source, for admins). Owner
    /// associations, queued thumbnail jobs and the cached thumbnail cascade.
    /// Returns `false` if the source does not exist.
    pub async fn delete(pool: &PgPool, ctx: &AuthContext, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if lock_for_write(&mut tx, id).await?.is_none() {
            return Ok(false);
        }
        authorize(&mut tx, ctx, id, "delete").await?;

        let result = sqlx::query("DELETE FROM sources WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sources owned by `user_id` whose `changed_on` is at or after `since`.
    pub async fn changed_since(
        pool: &PgPool,
        user_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<Source>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sources \
             WHERE changed_on >= $2 \
               AND id IN (SELECT source_id FROM source_owners WHERE user_id = $1) \
             ORDER BY changed_on ASC, id ASC"
        );
        sqlx::query_as::<_, Source>(&query)
            .bind(user_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// IDs of the users owning a source, ascending.
    pub async fn owner_ids(pool: &PgPool, source_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        owners_of(&mut conn, source_id).await
    }

    /// Replace the owner set of a source.
    ///
    /// Takes the same row lock as the guarded writes, so an ownership check
    /// never races with an owner change.
    pub async fn set_owners(
        pool: &PgPool,
        source_id: DbId,
        owners: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_for_write(&mut tx, source_id).await?;
        replace_owners(&mut tx, source_id, owners).await?;
        tx.commit().await
    }
}

/// Escape `LIKE` wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fetch the current row and hold its lock until the transaction ends.
async fn lock_for_write(conn: &mut PgConnection, id: DbId) -> Result<Option<Source>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM sources WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Source>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn owners_of(conn: &mut PgConnection, source_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(
        "SELECT user_id FROM source_owners WHERE source_id = $1 ORDER BY user_id",
    )
    .bind(source_id)
    .fetch_all(conn)
    .await
}

/// Ownership check against the owner set visible to the locking transaction.
async fn authorize(
    conn: &mut PgConnection,
    ctx: &AuthContext,
    source_id: DbId,
    action: &str,
) -> Result<(), DbError> {
    let owners = owners_of(conn, source_id).await?;
    ctx.raise_for_ownership(&owners, action)?;
    Ok(())
}

async fn insert_owners(
    conn: &mut PgConnection,
    source_id: DbId,
    owners: &[DbId],
) -> Result<(), sqlx::Error> {
    if owners.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO source_owners (source_id, user_id) \
         SELECT $1, UNNEST($2::BIGINT[]) \
         ON CONFLICT ON CONSTRAINT uq_source_owners_source_user DO NOTHING",
    )
    .bind(source_id)
    .bind(owners)
    .execute(conn)
    .await?;
    Ok(())
}

async fn replace_owners(
    conn: &mut PgConnection,
    source_id: DbId,
    owners: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM source_owners WHERE source_id = $1 AND NOT (user_id = ANY($2))")
        .bind(source_id)
        .bind(owners)
        .execute(&mut *conn)
        .await?;
    insert_owners(conn, source_id, owners).await
}

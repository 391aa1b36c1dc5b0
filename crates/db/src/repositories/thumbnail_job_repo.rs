//! Repository for the `thumbnail_jobs` queue.
//!
//! Jobs move `pending -> running -> completed | skipped | failed`. Claiming
//! uses `FOR UPDATE SKIP LOCKED` so several workers can poll the same table.
//! A `running` job whose claim is older than the lease belongs to a worker
//! that died; it is claimable again and no longer counts as open.

use std::time::Duration;

use sqlx::PgPool;
use sources_core::thumbnail::ThumbnailTask;
use sources_core::types::DbId;

use crate::models::thumbnail::{ThumbnailJob, ThumbnailJobStatus};

/// Column list for `thumbnail_jobs` queries.
const COLUMNS: &str = "\
    id, source_id, user_id, force, status, error_message, \
    claimed_at, finished_at, created_at, updated_at";

pub struct ThumbnailJobRepo;

impl ThumbnailJobRepo {
    /// Queue a render task.
    pub async fn enqueue(pool: &PgPool, task: &ThumbnailTask) -> Result<ThumbnailJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO thumbnail_jobs (source_id, user_id, force, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ThumbnailJob>(&query)
            .bind(task.source_id)
            .bind(task.user_id)
            .bind(task.force)
            .bind(ThumbnailJobStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest pending job, or a running job whose claim
    /// is older than `lease`.
    pub async fn claim_next(
        pool: &PgPool,
        lease: Duration,
    ) -> Result<Option<ThumbnailJob>, sqlx::Error> {
        let query = format!(
            "UPDATE thumbnail_jobs \
             SET status = $1, claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM thumbnail_jobs \
                 WHERE status = $2 \
                    OR (status = $1 AND claimed_at < NOW() - make_interval(secs => $3)) \
                 ORDER BY created_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ThumbnailJob>(&query)
            .bind(ThumbnailJobStatus::Running.as_str())
            .bind(ThumbnailJobStatus::Pending.as_str())
            .bind(lease.as_secs_f64())
            .fetch_optional(pool)
            .await
    }

    /// Whether a job for this source is waiting, or running within `lease`.
    pub async fn has_open_job(
        pool: &PgPool,
        source_id: DbId,
        lease: Duration,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM thumbnail_jobs \
                 WHERE source_id = $1 \
                   AND (status = $2 \
                        OR (status = $3 AND claimed_at >= NOW() - make_interval(secs => $4))) \
             )",
        )
        .bind(source_id)
        .bind(ThumbnailJobStatus::Pending.as_str())
        .bind(ThumbnailJobStatus::Running.as_str())
        .bind(lease.as_secs_f64())
        .fetch_one(pool)
        .await
    }

    /// Number of jobs not yet claimed by a worker.
    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM thumbnail_jobs WHERE status = $1")
            .bind(ThumbnailJobStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// All jobs for a source, oldest first.
    pub async fn list_for_source(
        pool: &PgPool,
        source_id: DbId,
    ) -> Result<Vec<ThumbnailJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM thumbnail_jobs WHERE source_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, ThumbnailJob>(&query)
            .bind(source_id)
            .fetch_all(pool)
            .await
    }

    pub async fn complete(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        Self::finish(pool, job_id, ThumbnailJobStatus::Completed, None).await
    }

    /// Finish a job without rendering (source gone, or digest unchanged).
    pub async fn skip(pool: &PgPool, job_id: DbId, reason: &str) -> Result<(), sqlx::Error> {
        Self::finish(pool, job_id, ThumbnailJobStatus::Skipped, Some(reason)).await
    }

    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        Self::finish(pool, job_id, ThumbnailJobStatus::Failed, Some(error)).await
    }

    async fn finish(
        pool: &PgPool,
        job_id: DbId,
        status: ThumbnailJobStatus,
        message: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE thumbnail_jobs \
             SET status = $2, error_message = $3, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(status.as_str())
        .bind(message)
        .execute(pool)
        .await?;
        Ok(())
    }
}

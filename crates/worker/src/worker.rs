//! Thumbnail job poller.
//!
//! Each tick drains the queue: claim a pending job (`SKIP LOCKED`, so several
//! workers can share one queue), re-read the source, and either skip, render
//! or fail the job. State captured at enqueue time is never trusted.

use std::time::Duration;

use sqlx::PgPool;
use sources_core::types::DbId;
use sources_db::models::thumbnail::{ThumbnailJob, DEFAULT_CLAIM_TIMEOUT_SECS};
use sources_db::repositories::{SourceRepo, SourceThumbnailRepo, ThumbnailJobRepo};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::render::{render_card, CONTENT_TYPE};

/// Default delay between queue polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

pub const SKIP_SOURCE_DELETED: &str = "source deleted";
pub const SKIP_DIGEST_UNCHANGED: &str = "digest unchanged";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    /// A `running` job claimed longer ago than this is reclaimed.
    pub claim_timeout: Duration,
}

impl WorkerConfig {
    /// Reads `THUMBNAIL_POLL_INTERVAL_MS` (default 2000) and
    /// `THUMBNAIL_CLAIM_TIMEOUT_SECS` (default 300). Both must be positive.
    pub fn from_env() -> Result<Self, WorkerError> {
        let poll_interval_ms = match std::env::var("THUMBNAIL_POLL_INTERVAL_MS") {
            Ok(raw) => parse_positive("THUMBNAIL_POLL_INTERVAL_MS", &raw)?,
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };
        let claim_timeout_secs = match std::env::var("THUMBNAIL_CLAIM_TIMEOUT_SECS") {
            Ok(raw) => parse_positive("THUMBNAIL_CLAIM_TIMEOUT_SECS", &raw)?,
            Err(_) => DEFAULT_CLAIM_TIMEOUT_SECS,
        };
        Ok(Self {
            poll_interval: Duration::from_millis(poll_interval_ms),
            claim_timeout: Duration::from_secs(claim_timeout_secs),
        })
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            claim_timeout: Duration::from_secs(DEFAULT_CLAIM_TIMEOUT_SECS),
        }
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64, WorkerError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(WorkerError::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}

/// What happened to the job claimed by one [`ThumbnailWorker::process_next`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The queue was empty.
    Idle,
    Rendered { job_id: DbId, source_id: DbId, digest: String },
    Skipped { job_id: DbId, reason: &'static str },
    Failed { job_id: DbId, error: String },
}

pub struct ThumbnailWorker {
    pool: PgPool,
    config: WorkerConfig,
}

impl ThumbnailWorker {
    pub fn new(pool: PgPool, config: WorkerConfig) -> Self {
        Self { pool, config }
    }

    /// Claim and process at most one job.
    ///
    /// Errors raised while handling a claimed job are recorded on the job and
    /// reported as [`JobOutcome::Failed`]. Only failures to claim or to record
    /// the outcome surface as `Err`.
    pub async fn process_next(&self) -> Result<JobOutcome, WorkerError> {
        let Some(job) = ThumbnailJobRepo::claim_next(&self.pool, self.config.claim_timeout).await? else {
            return Ok(JobOutcome::Idle);
        };

        match self.handle(&job).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let error = e.to_string();
                tracing::error!(job_id = job.id, source_id = job.source_id, error = %error, "Thumbnail job failed");
                ThumbnailJobRepo::fail(&self.pool, job.id, &error).await?;
                Ok(JobOutcome::Failed { job_id: job.id, error })
            }
        }
    }

    async fn handle(&self, job: &ThumbnailJob) -> Result<JobOutcome, WorkerError> {
        let Some(source) = SourceRepo::find_by_id(&self.pool, job.source_id).await? else {
            ThumbnailJobRepo::skip(&self.pool, job.id, SKIP_SOURCE_DELETED).await?;
            tracing::debug!(job_id = job.id, source_id = job.source_id, "Source gone, job skipped");
            return Ok(JobOutcome::Skipped {
                job_id: job.id,
                reason: SKIP_SOURCE_DELETED,
            });
        };

        let digest = source.digest();
        if !job.force {
            let cached = SourceThumbnailRepo::find_by_source(&self.pool, source.id).await?;
            if cached.is_some_and(|c| c.digest == digest) {
                ThumbnailJobRepo::skip(&self.pool, job.id, SKIP_DIGEST_UNCHANGED).await?;
                tracing::debug!(job_id = job.id, source_id = source.id, "Thumbnail up to date");
                return Ok(JobOutcome::Skipped {
                    job_id: job.id,
                    reason: SKIP_DIGEST_UNCHANGED,
                });
            }
        }

        let image = render_card(&source);
        SourceThumbnailRepo::upsert(&self.pool, source.id, &digest, CONTENT_TYPE, &image).await?;
        ThumbnailJobRepo::complete(&self.pool, job.id).await?;

        tracing::info!(
            job_id = job.id,
            source_id = source.id,
            force = job.force,
            bytes = image.len(),
            "Thumbnail rendered",
        );

        Ok(JobOutcome::Rendered {
            job_id: job.id,
            source_id: source.id,
            digest,
        })
    }

    /// Process every job currently claimable. Returns how many were handled.
    pub async fn drain(&self, cancel: &CancellationToken) -> Result<usize, WorkerError> {
        let mut handled = 0;
        while !cancel.is_cancelled() {
            if self.process_next().await? == JobOutcome::Idle {
                break;
            }
            handled += 1;
        }
        Ok(handled)
    }

    /// Poll the queue until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Thumbnail worker started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Thumbnail worker stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.drain(&cancel).await {
                        Ok(0) => {}
                        Ok(handled) => tracing::debug!(handled, "Thumbnail queue drained"),
                        Err(e) => tracing::error!(error = %e, "Thumbnail queue poll failed"),
                    }
                }
            }
        }
    }
}

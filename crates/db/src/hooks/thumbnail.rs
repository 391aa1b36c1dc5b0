//! After-write hook queueing a forced thumbnail refresh.

use std::sync::Arc;

use sqlx::PgPool;
use sources_core::authz::AuthContext;
use sources_core::thumbnail::{ThumbnailQueue, ThumbnailTask};

use super::AfterWrite;
use crate::models::source::Source;
use crate::repositories::ThumbnailJobRepo;

/// Enqueues one forced render per committed write.
pub struct ThumbnailInvalidation {
    queue: Arc<dyn ThumbnailQueue>,
}

impl ThumbnailInvalidation {
    pub fn new(queue: Arc<dyn ThumbnailQueue>) -> Self {
        Self { queue }
    }
}

impl AfterWrite for ThumbnailInvalidation {
    fn name(&self) -> &'static str {
        "thumbnail_invalidation"
    }

    fn after_write(&self, ctx: &AuthContext, source: &Source) {
        self.queue
            .enqueue(ThumbnailTask::force_refresh(ctx.user_id, source.id));
    }
}

/// Queue backed by the `thumbnail_jobs` table.
///
/// The insert runs on a spawned task; failures are logged and dropped.
#[derive(Debug, Clone)]
pub struct PgThumbnailQueue {
    pool: PgPool,
}

impl PgThumbnailQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ThumbnailQueue for PgThumbnailQueue {
    fn enqueue(&self, task: ThumbnailTask) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(source_id = task.source_id, "No async runtime, dropping thumbnail task");
            return;
        };

        let pool = self.pool.clone();
        runtime.spawn(async move {
            match ThumbnailJobRepo::enqueue(&pool, &task).await {
                Ok(job) => {
                    tracing::debug!(job_id = job.id, source_id = task.source_id, force = task.force, "Thumbnail job queued");
                }
                Err(e) => {
                    tracing::warn!(source_id = task.source_id, error = %e, "Failed to queue thumbnail job");
                }
            }
        });
    }
}

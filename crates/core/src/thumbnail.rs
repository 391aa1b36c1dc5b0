//! Thumbnail job description and the queue seam.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A request to (re)render the preview image of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailTask {
    /// User on whose behalf the render runs, if any.
    pub user_id: Option<DbId>,
    pub source_id: DbId,
    /// Render even when the cached digest still matches.
    pub force: bool,
}

impl ThumbnailTask {
    /// The task enqueued after every committed write.
    pub fn force_refresh(user_id: Option<DbId>, source_id: DbId) -> Self {
        Self {
            user_id,
            source_id,
            force: true,
        }
    }
}

/// Destination for thumbnail tasks.
///
/// `enqueue` must return without waiting on I/O and must never fail the
/// caller: implementations log and drop tasks they cannot deliver.
pub trait ThumbnailQueue: Send + Sync {
    fn enqueue(&self, task: ThumbnailTask);
}

/// A queue that discards everything. Used when thumbnails are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledQueue;

impl ThumbnailQueue for DisabledQueue {
    fn enqueue(&self, task: ThumbnailTask) {
        tracing::debug!(source_id = task.source_id, "Thumbnails disabled, dropping task");
    }
}

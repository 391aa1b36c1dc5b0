//! Thumbnail job queue rows and the rendered preview cache.

use serde::Serialize;
use sqlx::FromRow;
use sources_core::types::{DbId, Timestamp};

/// How long a `running` job may go unfinished before another worker may
/// claim it.
pub const DEFAULT_CLAIM_TIMEOUT_SECS: u64 = 300;

/// Lifecycle of a row in `thumbnail_jobs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailJobStatus {
    Pending,
    Running,
    Completed,
    Skipped,
    Failed,
}

impl ThumbnailJobStatus {
    /// The value stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// A row from the `thumbnail_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThumbnailJob {
    pub id: DbId,
    pub source_id: DbId,
    pub user_id: Option<DbId>,
    pub force: bool,
    pub status: String,
    pub error_message: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `source_thumbnails` table.
#[derive(Debug, Clone, FromRow)]
pub struct SourceThumbnail {
    pub id: DbId,
    pub source_id: DbId,
    /// Digest of the source state the image was rendered from.
    pub digest: String,
    pub content_type: String,
    pub image: Vec<u8>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

//! Repository for the `source_thumbnails` preview cache.

use sqlx::PgPool;
use sources_core::types::DbId;

use crate::models::thumbnail::SourceThumbnail;

const COLUMNS: &str = "id, source_id, digest, content_type, image, created_at, updated_at";

pub struct SourceThumbnailRepo;

impl SourceThumbnailRepo {
    pub async fn find_by_source(
        pool: &PgPool,
        source_id: DbId,
    ) -> Result<Option<SourceThumbnail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM source_thumbnails WHERE source_id = $1");
        sqlx::query_as::<_, SourceThumbnail>(&query)
            .bind(source_id)
            .fetch_optional(pool)
            .await
    }

    /// Store (or replace) the rendered preview of a source.
    pub async fn upsert(
        pool: &PgPool,
        source_id: DbId,
        digest: &str,
        content_type: &str,
        image: &[u8],
    ) -> Result<SourceThumbnail, sqlx::Error> {
        let query = format!(
            "INSERT INTO source_thumbnails (source_id, digest, content_type, image) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_source_thumbnails_source DO UPDATE SET \
                 digest = EXCLUDED.digest, \
                 content_type = EXCLUDED.content_type, \
                 image = EXCLUDED.image \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SourceThumbnail>(&query)
            .bind(source_id)
            .bind(digest)
            .bind(content_type)
            .bind(image)
            .fetch_one(pool)
            .await
    }
}

//! Before-write hook copying permission strings from the upstream dataset.

use async_trait::async_trait;
use sqlx::PgConnection;
use sources_core::permissions::{inherit_permissions, PermissionStrings};
use sources_core::types::DbId;

use super::{BeforeWrite, SourceWrite};
use crate::repositories::DatasetRepo;

/// Looks up the permission strings of a dataset by `(kind, id)`.
#[async_trait]
pub trait DatasetResolver: Send + Sync {
    async fn resolve(
        &self,
        conn: &mut PgConnection,
        kind: &str,
        id: DbId,
    ) -> Result<Option<PermissionStrings>, sqlx::Error>;
}

/// Resolver backed by the `datasets` table.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgDatasetResolver;

#[async_trait]
impl DatasetResolver for PgDatasetResolver {
    async fn resolve(
        &self,
        conn: &mut PgConnection,
        kind: &str,
        id: DbId,
    ) -> Result<Option<PermissionStrings>, sqlx::Error> {
        DatasetRepo::find_permissions(conn, kind, id).await
    }
}

/// Overwrites `perm` and `schema_perm` of the write with the upstream
/// dataset's values. A missing or dangling reference leaves them as they are.
pub struct PermissionSync<R> {
    resolver: R,
}

impl<R: DatasetResolver> PermissionSync<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<R: DatasetResolver> BeforeWrite for PermissionSync<R> {
    fn name(&self) -> &'static str {
        "permission_sync"
    }

    async fn before_write(
        &self,
        conn: &mut PgConnection,
        write: &mut SourceWrite,
    ) -> Result<(), sqlx::Error> {
        let (Some(id), Some(kind)) = (write.datasource_id, write.datasource_type.as_deref()) else {
            tracing::debug!(source_id = ?write.source_id, "No upstream dataset reference, keeping permissions");
            return Ok(());
        };

        let upstream = self.resolver.resolve(conn, kind, id).await?;
        if upstream.is_none() {
            tracing::debug!(
                source_id = ?write.source_id,
                datasource_id = id,
                datasource_type = kind,
                "Upstream dataset not found, keeping permissions",
            );
        }

        if inherit_permissions(&mut write.permissions, upstream.as_ref()) {
            tracing::debug!(
                source_id = ?write.source_id,
                datasource_id = id,
                perm = ?write.permissions.perm,
                "Permissions synced from upstream dataset",
            );
        }
        Ok(())
    }
}

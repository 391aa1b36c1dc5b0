//! Hooks run around every source insert and update.
//!
//! Hooks are registered explicitly on a [`SourceHooks`] value that the
//! caller hands to the repository. Before-write hooks run on the write
//! transaction's connection and may rewrite the in-flight [`SourceWrite`];
//! an error from one aborts the write. After-write hooks run once the
//! transaction has committed and cannot fail the write.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgConnection;
use sources_core::authz::AuthContext;
use sources_core::permissions::PermissionStrings;
use sources_core::thumbnail::ThumbnailQueue;
use sources_core::types::DbId;

use crate::models::source::Source;

pub mod permission_sync;
pub mod thumbnail;

pub use permission_sync::{DatasetResolver, PermissionSync, PgDatasetResolver};
pub use thumbnail::{PgThumbnailQueue, ThumbnailInvalidation};

/// The fields of a pending write that hooks may read or rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceWrite {
    /// `None` for inserts.
    pub source_id: Option<DbId>,
    pub datasource_id: Option<DbId>,
    pub datasource_type: Option<String>,
    pub permissions: PermissionStrings,
}

#[async_trait]
pub trait BeforeWrite: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before_write(
        &self,
        conn: &mut PgConnection,
        write: &mut SourceWrite,
    ) -> Result<(), sqlx::Error>;
}

pub trait AfterWrite: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must not block on I/O.
    fn after_write(&self, ctx: &AuthContext, source: &Source);
}

/// Ordered set of registered hooks.
#[derive(Clone, Default)]
pub struct SourceHooks {
    before: Vec<Arc<dyn BeforeWrite>>,
    after: Vec<Arc<dyn AfterWrite>>,
}

impl SourceHooks {
    /// A registry with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permission sync against `datasets` plus thumbnail invalidation on
    /// `queue`.
    pub fn standard(queue: Arc<dyn ThumbnailQueue>) -> Self {
        Self::new()
            .with_before_write(PermissionSync::new(PgDatasetResolver))
            .with_after_write(ThumbnailInvalidation::new(queue))
    }

    pub fn with_before_write(mut self, hook: impl BeforeWrite + 'static) -> Self {
        self.before.push(Arc::new(hook));
        self
    }

    pub fn with_after_write(mut self, hook: impl AfterWrite + 'static) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    pub async fn run_before_write(
        &self,
        conn: &mut PgConnection,
        write: &mut SourceWrite,
    ) -> Result<(), sqlx::Error> {
        for hook in &self.before {
            tracing::trace!(hook = hook.name(), source_id = ?write.source_id, "Running before-write hook");
            hook.before_write(conn, write).await?;
        }
        Ok(())
    }

    pub fn run_after_write(&self, ctx: &AuthContext, source: &Source) {
        for hook in &self.after {
            tracing::trace!(hook = hook.name(), source_id = source.id, "Running after-write hook");
            hook.after_write(ctx, source);
        }
    }
}

impl std::fmt::Debug for SourceHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHooks")
            .field("before", &self.before.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("after", &self.after.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use sources_core::thumbnail::DisabledQueue;

    use super::*;

    #[test]
    fn standard_registers_both_hooks_in_order() {
        let hooks = SourceHooks::standard(Arc::new(DisabledQueue));
        let debug = format!("{hooks:?}");
        assert!(debug.contains("permission_sync"));
        assert!(debug.contains("thumbnail_invalidation"));
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let hooks = SourceHooks::new();
        assert_eq!(format!("{hooks:?}"), r#"SourceHooks { before: [], after: [] }"#);
    }
}

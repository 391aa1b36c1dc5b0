//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sqlx::PgPool;
use sources_core::authz::AuthContext;
use sources_core::thumbnail::{ThumbnailQueue, ThumbnailTask};
use sources_db::hooks::SourceHooks;
use sources_db::models::dataset::{CreateDataset, Dataset};
use sources_db::models::source::CreateSource;
use sources_db::models::user::CreateUser;
use sources_db::repositories::{DatasetRepo, UserRepo};

/// Queue that remembers every task instead of persisting it.
#[derive(Default)]
pub struct RecordingQueue(Mutex<Vec<ThumbnailTask>>);

impl RecordingQueue {
    pub fn tasks(&self) -> Vec<ThumbnailTask> {
        self.0.lock().unwrap().clone()
    }
}

impl ThumbnailQueue for RecordingQueue {
    fn enqueue(&self, task: ThumbnailTask) {
        self.0.lock().unwrap().push(task);
    }
}

/// Standard hooks wired to a recording queue.
pub fn recording_hooks() -> (SourceHooks, Arc<RecordingQueue>) {
    let queue = Arc::new(RecordingQueue::default());
    (SourceHooks::standard(queue.clone()), queue)
}

pub async fn new_user(pool: &PgPool, username: &str, role: &str) -> AuthContext {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    AuthContext::user(user.id, user.role)
}

pub async fn new_dataset(pool: &PgPool, kind: &str, perm: &str, schema_perm: &str) -> Dataset {
    DatasetRepo::create(
        pool,
        &CreateDataset {
            kind: kind.to_string(),
            name: format!("{kind}_dataset"),
            perm: Some(perm.to_string()),
            schema_perm: Some(schema_perm.to_string()),
            catalog_perm: Some("[main]".to_string()),
            cache_timeout: Some(300),
        },
    )
    .await
    .unwrap()
}

pub fn new_source(name: &str) -> CreateSource {
    CreateSource {
        source_name: Some(name.to_string()),
        source_type: Some("shopify".to_string()),
        params: Some(r#"{"viz_type":"table"}"#.to_string()),
        ..Default::default()
    }
}

pub fn bound_source(name: &str, dataset: &Dataset) -> CreateSource {
    CreateSource {
        datasource_id: Some(dataset.id),
        datasource_type: Some(dataset.kind.clone()),
        ..new_source(name)
    }
}

/// Overwrite `changed_on` without the monotonic trigger interfering.
pub async fn force_changed_on(pool: &PgPool, source_id: i64, at: chrono::DateTime<chrono::Utc>) {
    let mut tx = pool.begin().await.unwrap();
    sqlx::query("ALTER TABLE sources DISABLE TRIGGER trg_sources_changed_on")
        .execute(&mut *tx)
        .await
        .unwrap();
    sqlx::query("UPDATE sources SET changed_on = $2 WHERE id = $1")
        .bind(source_id)
        .bind(at)
        .execute(&mut *tx)
        .await
        .unwrap();
    sqlx::query("ALTER TABLE sources ENABLE TRIGGER trg_sources_changed_on")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

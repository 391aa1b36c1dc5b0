//! Repository for the `users` table.

use sqlx::PgPool;
use sources_core::types::DbId;

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, username, role, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, role) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// The subset of `ids` that has no matching user, in input order.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>(
            "SELECT wanted.id \
             FROM UNNEST($1::BIGINT[]) WITH ORDINALITY AS wanted(id, ord) \
             WHERE NOT EXISTS (SELECT 1 FROM users u WHERE u.id = wanted.id) \
             ORDER BY wanted.ord",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}

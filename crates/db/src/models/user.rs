//! Users referenced by ownership and audit columns.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sources_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub role: String,
}

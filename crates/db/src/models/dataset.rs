//! Upstream datasets a source derives its permissions from.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sources_core::permissions::PermissionStrings;
use sources_core::types::{DbId, Timestamp};

/// A row from the `datasets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dataset {
    pub id: DbId,
    pub kind: String,
    pub name: String,
    pub perm: Option<String>,
    pub schema_perm: Option<String>,
    pub catalog_perm: Option<String>,
    pub cache_timeout: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Dataset {
    pub fn permissions(&self) -> PermissionStrings {
        PermissionStrings {
            perm: self.perm.clone(),
            schema_perm: self.schema_perm.clone(),
        }
    }
}

/// DTO for registering a dataset.
#[derive(Debug, Deserialize)]
pub struct CreateDataset {
    pub kind: String,
    pub name: String,
    pub perm: Option<String>,
    pub schema_perm: Option<String>,
    pub catalog_perm: Option<String>,
    pub cache_timeout: Option<i32>,
}

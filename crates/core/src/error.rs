//! Domain error type shared by every crate in the workspace.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity does not exist (or is not visible to the caller).
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Caller-supplied input was rejected before any mutation.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable identity was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The identity is known but may not perform the action (e.g. not an owner).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for the most common lookup failure in this service.
    pub fn source_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Source",
            id,
        }
    }
}

use sources_core::error::CoreError;

/// Errors from repository operations that enforce domain rules inside the
/// database transaction (ownership checks) as well as running statements.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sources_core::error::CoreError;
use sources_core::roles::{ROLE_ADMIN, ROLE_EDITOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `editor` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn create(RequireEditor(user): RequireEditor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_EDITOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Editor or Admin role required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}

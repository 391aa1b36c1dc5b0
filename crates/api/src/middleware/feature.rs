//! Feature-flag gate for the sources resource.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Succeeds only while `SOURCES_ENABLED` is on. Put it first in a handler's
/// argument list so a disabled resource answers 404 before authentication.
pub struct SourcesEnabled;

impl FromRequestParts<AppState> for SourcesEnabled {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.sources_enabled {
            Ok(SourcesEnabled)
        } else {
            Err(AppError::FeatureDisabled("sources"))
        }
    }
}

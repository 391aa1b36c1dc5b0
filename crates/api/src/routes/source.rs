//! Route definitions for the `/sources` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::source;
use crate::state::AppState;

/// Routes mounted at `/sources`.
///
/// ```text
/// GET    /                    -> list_sources
/// POST   /                    -> create_source
/// GET    /updated_since       -> updated_since
/// POST   /import              -> import_source
/// GET    /{id}                -> get_source
/// PUT    /{id}                -> update_source
/// DELETE /{id}                -> delete_source
/// GET    /{id}/data           -> get_source_data
/// GET    /{id}/export         -> export_source
/// PUT    /{id}/metadata       -> save_metadata
/// GET    /{id}/thumbnail      -> get_thumbnail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(source::list_sources).post(source::create_source))
        .route("/updated_since", get(source::updated_since))
        .route("/import", post(source::import_source))
        .route(
            "/{id}",
            get(source::get_source)
                .put(source::update_source)
                .delete(source::delete_source),
        )
        .route("/{id}/data", get(source::get_source_data))
        .route("/{id}/export", get(source::export_source))
        .route("/{id}/metadata", put(source::save_metadata))
        .route("/{id}/thumbnail", get(source::get_thumbnail))
}

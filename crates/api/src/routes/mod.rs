pub mod health;
pub mod source;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /sources                                 list, create
/// /sources/updated_since                   changed-since sync feed
/// /sources/import                          create from export payload
/// /sources/{id}                            get, update, delete
/// /sources/{id}/data                       derived data view
/// /sources/{id}/export                     export fields
/// /sources/{id}/metadata                   merge column metadata
/// /sources/{id}/thumbnail                  cached preview or 202
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sources", source::router())
}

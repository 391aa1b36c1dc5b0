//! Handlers for the `/sources` resource.
//!
//! Every endpoint is gated by [`SourcesEnabled`] and requires a bearer
//! token. Mutations pass the caller's context to the repository, which
//! checks ownership under the row lock; admins bypass the check.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use sources_core::error::CoreError;
use sources_core::export::SourceImport;
use sources_core::thumbnail::ThumbnailTask;
use sources_core::time::watermark_from_millis;
use sources_core::types::DbId;
use sources_db::models::source::{CreateSource, ListSourcesParams, Source, UpdateSource};
use sources_db::repositories::{
    DatasetRepo, SourceRepo, SourceThumbnailRepo, ThumbnailJobRepo, UserRepo,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::feature::SourcesEnabled;
use crate::middleware::rbac::RequireEditor;
use crate::query::UpdatedSinceParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_source(pool: &sqlx::PgPool, id: DbId) -> AppResult<Source> {
    SourceRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::source_not_found(id)))
}

/// Reject owner lists naming users that do not exist.
async fn ensure_users_exist(pool: &sqlx::PgPool, owners: &[DbId]) -> AppResult<()> {
    let missing = UserRepo::missing_ids(pool, owners).await?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Unknown owner ids: {missing:?}"
        ))))
    }
}

// ---------------------------------------------------------------------------
// List / read
// ---------------------------------------------------------------------------

/// GET /api/v1/sources
pub async fn list_sources(
    _: SourcesEnabled,
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListSourcesParams>,
) -> AppResult<impl IntoResponse> {
    let sources = SourceRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: sources }))
}

/// GET /api/v1/sources/{id}
pub async fn get_source(
    _: SourcesEnabled,
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let source = find_source(&state.pool, id).await?;
    Ok(Json(DataResponse { data: source }))
}

/// GET /api/v1/sources/updated_since?last_updated_ms=
///
/// Sources owned by the caller with `changed_on` at or after the watermark.
pub async fn updated_since(
    _: SourcesEnabled,
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UpdatedSinceParams>,
) -> AppResult<impl IntoResponse> {
    let since = watermark_from_millis(params.last_updated_ms)?;
    let sources = SourceRepo::changed_since(&state.pool, auth.user_id, since).await?;

    tracing::debug!(
        user_id = auth.user_id,
        last_updated_ms = params.last_updated_ms,
        count = sources.len(),
        "Changed sources fetched",
    );

    Ok(Json(DataResponse { data: sources }))
}

/// GET /api/v1/sources/{id}/data
///
/// Derived view for the explore front-end.
pub async fn get_source_data(
    _: SourcesEnabled,
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let source = find_source(&state.pool, id).await?;
    let owners = SourceRepo::owner_ids(&state.pool, id).await?;

    let cache_timeout = match (source.cache_timeout, source.datasource_id, source.datasource_type.as_deref()) {
        (Some(timeout), _, _) => Some(timeout),
        (None, Some(ds_id), Some(kind)) => DatasetRepo::find_by_ref(&state.pool, kind, ds_id)
            .await?
            .and_then(|ds| ds.cache_timeout),
        _ => None,
    };

    let view = source.data_view(owners, cache_timeout, &state.config.explore_base_url);
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/sources/{id}/export
pub async fn export_source(
    _: SourcesEnabled,
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let source = find_source(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: source.to_export(),
    }))
}

// ---------------------------------------------------------------------------
// Create / import
// ---------------------------------------------------------------------------

/// POST /api/v1/sources
///
/// The caller becomes an owner. Returns 201 with the created source.
pub async fn create_source(
    _: SourcesEnabled,
    RequireEditor(auth): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<CreateSource>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    ensure_users_exist(&state.pool, &input.owners).await?;

    let source = SourceRepo::create(&state.pool, &state.hooks, &auth.ctx(), &input).await?;

    tracing::info!(source_id = source.id, user_id = auth.user_id, "Source created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: source })))
}

/// POST /api/v1/sources/import
///
/// Create a source from an export payload. Returns 201.
pub async fn import_source(
    _: SourcesEnabled,
    RequireEditor(auth): RequireEditor,
    State(state): State<AppState>,
    Json(payload): Json<SourceImport>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    let input = CreateSource::from(payload);
    input.validate()?;

    let source = SourceRepo::create(&state.pool, &state.hooks, &auth.ctx(), &input).await?;

    tracing::info!(
        source_id = source.id,
        user_id = auth.user_id,
        managed_externally = source.is_managed_externally,
        "Source imported",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: source })))
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

/// PUT /api/v1/sources/{id}
pub async fn update_source(
    _: SourcesEnabled,
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSource>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(owners) = &input.owners {
        ensure_users_exist(&state.pool, owners).await?;
    }

    let source = SourceRepo::update(&state.pool, &state.hooks, &auth.ctx(), id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::source_not_found(id)))?;

    tracing::info!(source_id = id, user_id = auth.user_id, "Source updated");

    Ok(Json(DataResponse { data: source }))
}

/// DELETE /api/v1/sources/{id}
///
/// Returns 204. Owner associations cascade.
pub async fn delete_source(
    _: SourcesEnabled,
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !SourceRepo::delete(&state.pool, &auth.ctx(), id).await? {
        return Err(AppError::Core(CoreError::source_not_found(id)));
    }

    tracing::info!(source_id = id, user_id = auth.user_id, "Source deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sources/{id}/metadata
///
/// Merge `payload.columns` into the source's `extra_json`.
pub async fn save_metadata(
    _: SourcesEnabled,
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<impl IntoResponse> {
    if !payload.is_object() {
        return Err(AppError::BadRequest(
            "Metadata payload must be a JSON object".into(),
        ));
    }
    let source = SourceRepo::save_metadata(&state.pool, &state.hooks, &auth.ctx(), id, &payload)
        .await?
        .ok_or(AppError::Core(CoreError::source_not_found(id)))?;

    tracing::info!(source_id = id, user_id = auth.user_id, "Source metadata saved");

    Ok(Json(DataResponse {
        data: source.extra().as_map().clone(),
    }))
}

// ---------------------------------------------------------------------------
// Thumbnail
// ---------------------------------------------------------------------------

/// GET /api/v1/sources/{id}/thumbnail
///
/// Serves the cached preview when it was rendered from the current state.
/// Otherwise queues a render (unless one is already open) and returns 202.
pub async fn get_thumbnail(
    _: SourcesEnabled,
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let source = find_source(&state.pool, id).await?;
    let digest = source.digest();

    if let Some(cached) = SourceThumbnailRepo::find_by_source(&state.pool, id).await? {
        if cached.digest == digest {
            return Ok(([(CONTENT_TYPE, cached.content_type)], cached.image).into_response());
        }
    }

    if !state.config.thumbnails_enabled {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Thumbnail",
            id,
        }));
    }

    let lease = state.config.thumbnail_claim_timeout();
    if !ThumbnailJobRepo::has_open_job(&state.pool, id, lease).await? {
        let task = ThumbnailTask {
            user_id: Some(auth.user_id),
            source_id: id,
            force: false,
        };
        let job = ThumbnailJobRepo::enqueue(&state.pool, &task).await?;
        tracing::debug!(source_id = id, job_id = job.id, "Thumbnail render queued");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: json!({ "source_id": id, "digest": digest, "status": "queued" }),
        }),
    )
        .into_response())
}

//! Source entity model, derived views and DTOs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use sources_core::audit::Auditable;
use sources_core::datasource::validate_datasource_type;
use sources_core::digest::{source_digest, DigestInput};
use sources_core::explore::{build_explore_url, edit_url, source_url, EXPLORE_JSON_BASE};
use sources_core::export::{SourceExport, SourceImport};
use sources_core::extra_json::ExtraMetadata;
use sources_core::form_data::{build_form_data, validate_params, FormDataInput};
use sources_core::markdown::render_markdown;
use sources_core::permissions::PermissionStrings;
use sources_core::types::{DbId, Timestamp};

/// A row from the `sources` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Source {
    pub id: DbId,
    pub source_name: Option<String>,
    pub source_type: Option<String>,
    pub description: Option<String>,
    pub cache_timeout: Option<i32>,
    pub params: Option<String>,
    pub query_context: Option<String>,
    pub extra_json: String,
    pub datasource_id: Option<DbId>,
    pub datasource_type: Option<String>,
    pub perm: Option<String>,
    pub schema_perm: Option<String>,
    pub catalog_perm: Option<String>,
    pub last_saved_at: Option<Timestamp>,
    pub last_saved_by: Option<DbId>,
    pub is_managed_externally: bool,
    pub external_url: Option<String>,
    pub created_by: Option<DbId>,
    pub changed_by: Option<DbId>,
    pub created_on: Timestamp,
    pub changed_on: Timestamp,
}

impl Auditable for Source {
    fn created_on(&self) -> Timestamp {
        self.created_on
    }

    fn changed_on(&self) -> Timestamp {
        self.changed_on
    }

    fn created_by(&self) -> Option<DbId> {
        self.created_by
    }

    fn changed_by(&self) -> Option<DbId> {
        self.changed_by
    }
}

impl Source {
    /// Stored params merged with the fields derived from the row.
    pub fn form_data(&self) -> Map<String, Value> {
        build_form_data(FormDataInput {
            source_id: self.id,
            params: self.params.as_deref(),
            datasource_id: self.datasource_id,
            datasource_type: self.datasource_type.as_deref(),
            cache_timeout: self.cache_timeout,
        })
    }

    /// Content digest; changes whenever a rendering-relevant field changes.
    pub fn digest(&self) -> String {
        source_digest(&DigestInput {
            id: self.id,
            source_name: self.source_name.as_deref(),
            source_type: self.source_type.as_deref(),
            description: self.description.as_deref(),
            params: self.params.as_deref(),
            query_context: self.query_context.as_deref(),
            datasource_id: self.datasource_id,
            datasource_type: self.datasource_type.as_deref(),
            cache_timeout: self.cache_timeout,
        })
    }

    pub fn explore_url(&self, base_url: &str) -> String {
        build_explore_url(self.id, base_url, None)
    }

    pub fn explore_json_url(&self) -> String {
        build_explore_url(self.id, EXPLORE_JSON_BASE, None)
    }

    pub fn url(&self) -> String {
        source_url(self.id)
    }

    pub fn description_markeddown(&self) -> String {
        render_markdown(self.description.as_deref())
    }

    pub fn extra(&self) -> ExtraMetadata {
        ExtraMetadata::parse(Some(&self.extra_json))
    }

    pub fn permissions(&self) -> PermissionStrings {
        PermissionStrings {
            perm: self.perm.clone(),
            schema_perm: self.schema_perm.clone(),
        }
    }

    pub fn to_export(&self) -> SourceExport {
        SourceExport {
            source_name: self.source_name.clone(),
            description: self.description.clone(),
            params: self.params.clone(),
            query_context: self.query_context.clone(),
            cache_timeout: self.cache_timeout,
        }
    }

    /// Build the JSON data view served to the explore front-end.
    ///
    /// `effective_cache_timeout` is the source's own timeout, or the upstream
    /// dataset's when the source has none.
    pub fn data_view(
        &self,
        owners: Vec<DbId>,
        effective_cache_timeout: Option<i32>,
        explore_base: &str,
    ) -> SourceData {
        SourceData {
            cache_timeout: effective_cache_timeout,
            changed_on: self.changed_on.to_rfc3339(),
            changed_on_humanized: self.changed_on_humanized(),
            description: self.description.clone(),
            description_markeddown: self.description_markeddown(),
            edit_url: edit_url(self.id),
            form_data: self.form_data(),
            query_context: self.query_context.clone(),
            modified: self.changed_on.timestamp_millis(),
            owners,
            source_id: self.id,
            source_name: self.source_name.clone(),
            is_managed_externally: self.is_managed_externally,
            explore_url: self.explore_url(explore_base),
            explore_json_url: self.explore_json_url(),
            url: self.url(),
        }
    }
}

/// Derived, read-only view of a source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceData {
    pub cache_timeout: Option<i32>,
    /// ISO 8601.
    pub changed_on: String,
    pub changed_on_humanized: String,
    pub description: Option<String>,
    pub description_markeddown: String,
    pub edit_url: String,
    pub form_data: Map<String, Value>,
    pub query_context: Option<String>,
    /// `changed_on` as epoch milliseconds.
    pub modified: i64,
    pub owners: Vec<DbId>,
    pub source_id: DbId,
    pub source_name: Option<String>,
    pub is_managed_externally: bool,
    pub explore_url: String,
    pub explore_json_url: String,
    pub url: String,
}

/// DTO for creating a source via `POST /api/v1/sources`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSource {
    #[validate(length(max = 250))]
    pub source_name: Option<String>,
    #[validate(length(max = 200))]
    pub source_type: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub cache_timeout: Option<i32>,
    #[validate(custom(function = "validate_json_text"))]
    pub params: Option<String>,
    #[validate(custom(function = "validate_json_text"))]
    pub query_context: Option<String>,
    pub datasource_id: Option<DbId>,
    #[validate(custom(function = "validate_kind"))]
    pub datasource_type: Option<String>,
    /// Additional owners; the creator is always added.
    #[serde(default)]
    pub owners: Vec<DbId>,
    #[serde(default)]
    pub is_managed_externally: bool,
    #[validate(url)]
    pub external_url: Option<String>,
}

impl From<SourceImport> for CreateSource {
    fn from(import: SourceImport) -> Self {
        let SourceImport {
            fields,
            source_type,
            datasource_id,
            datasource_type,
            is_managed_externally,
            external_url,
        } = import;
        Self {
            source_name: fields.source_name,
            source_type,
            description: fields.description,
            cache_timeout: fields.cache_timeout,
            params: fields.params,
            query_context: fields.query_context,
            datasource_id,
            datasource_type,
            owners: Vec::new(),
            is_managed_externally,
            external_url,
        }
    }
}

/// DTO for updating a source. All fields are optional; `owners`, when
/// present, replaces the owner set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSource {
    #[validate(length(max = 250))]
    pub source_name: Option<String>,
    #[validate(length(max = 200))]
    pub source_type: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub cache_timeout: Option<i32>,
    #[validate(custom(function = "validate_json_text"))]
    pub params: Option<String>,
    #[validate(custom(function = "validate_json_text"))]
    pub query_context: Option<String>,
    pub datasource_id: Option<DbId>,
    #[validate(custom(function = "validate_kind"))]
    pub datasource_type: Option<String>,
    pub owners: Option<Vec<DbId>>,
    pub is_managed_externally: Option<bool>,
    #[validate(url)]
    pub external_url: Option<String>,
}

/// Query parameters for `GET /api/v1/sources`.
#[derive(Debug, Default, Deserialize)]
pub struct ListSourcesParams {
    /// Case-insensitive substring match on `source_name`.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_json_text(value: &str) -> Result<(), ValidationError> {
    validate_params(value).map_err(|e| invalid("json", e.to_string()))
}

fn validate_kind(value: &str) -> Result<(), ValidationError> {
    validate_datasource_type(value).map_err(|e| invalid("datasource_type", e.to_string()))
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

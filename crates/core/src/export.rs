//! Export / import field lists.
//!
//! Export carries only the portable configuration of a source. Import accepts
//! the same fields plus the "managed externally" markers and an optional
//! upstream dataset reference to bind the new row to.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::form_data::validate_params;
use crate::types::DbId;

/// Portable fields of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceExport {
    pub source_name: Option<String>,
    pub description: Option<String>,
    pub params: Option<String>,
    pub query_context: Option<String>,
    pub cache_timeout: Option<i32>,
}

/// Payload accepted by the import endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceImport {
    #[serde(flatten)]
    pub fields: SourceExport,
    pub source_type: Option<String>,
    pub datasource_id: Option<DbId>,
    pub datasource_type: Option<String>,
    #[serde(default)]
    pub is_managed_externally: bool,
    pub external_url: Option<String>,
}

impl SourceImport {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(params) = &self.fields.params {
            validate_params(params)?;
        }
        if self.external_url.is_some() && !self.is_managed_externally {
            return Err(CoreError::Validation(
                "external_url requires is_managed_externally".to_string(),
            ));
        }
        Ok(())
    }
}

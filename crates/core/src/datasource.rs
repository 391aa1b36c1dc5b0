//! Upstream dataset references.

use crate::error::CoreError;

pub const DATASOURCE_TABLE: &str = "table";
pub const DATASOURCE_QUERY: &str = "query";

/// Discriminators a source may use in `datasource_type`.
pub const DATASOURCE_TYPES: &[&str] = &[DATASOURCE_TABLE, DATASOURCE_QUERY];

pub fn validate_datasource_type(kind: &str) -> Result<(), CoreError> {
    if DATASOURCE_TYPES.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown datasource_type '{kind}'. Must be one of: {}",
            DATASOURCE_TYPES.join(", ")
        )))
    }
}

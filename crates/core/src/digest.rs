//! Content digest of a source, used as the thumbnail cache key.
//!
//! The digest covers exactly the fields that change what a rendered preview
//! looks like. It is a pure function: the same persisted state always yields
//! the same digest, and nothing here can fail.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::types::DbId;

/// Render-affecting fields of a source.
#[derive(Debug, Clone, Copy)]
pub struct DigestInput<'a> {
    pub id: DbId,
    pub source_name: Option<&'a str>,
    pub source_type: Option<&'a str>,
    pub description: Option<&'a str>,
    pub params: Option<&'a str>,
    pub query_context: Option<&'a str>,
    pub datasource_id: Option<DbId>,
    pub datasource_type: Option<&'a str>,
    pub cache_timeout: Option<i32>,
}

/// SHA-256 hex digest over a canonical JSON encoding of `input`.
pub fn source_digest(input: &DigestInput<'_>) -> String {
    let canonical = json!({
        "id": input.id,
        "source_name": input.source_name,
        "source_type": input.source_type,
        "description": input.description,
        "params": input.params,
        "query_context": input.query_context,
        "datasource_id": input.datasource_id,
        "datasource_type": input.datasource_type,
        "cache_timeout": input.cache_timeout,
    });
    let hash = Sha256::digest(canonical.to_string().as_bytes());
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DigestInput<'static> {
        DigestInput {
            id: 1,
            source_name: Some("Orders"),
            source_type: Some("shopify"),
            description: None,
            params: Some(r#"{"metric":"count"}"#),
            query_context: None,
            datasource_id: Some(4),
            datasource_type: Some("table"),
            cache_timeout: None,
        }
    }

    #[test]
    fn stable_for_same_state() {
        let digest = source_digest(&base());
        assert_eq!(digest, source_digest(&base()));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn changes_with_render_affecting_fields() {
        let original = source_digest(&base());

        let mut renamed = base();
        renamed.source_name = Some("Orders v2");
        assert_ne!(source_digest(&renamed), original);

        let mut reparam = base();
        reparam.params = Some(r#"{"metric":"sum"}"#);
        assert_ne!(source_digest(&reparam), original);
    }

    #[test]
    fn none_and_empty_string_differ() {
        let mut a = base();
        a.description = None;
        let mut b = base();
        b.description = Some("");
        assert_ne!(source_digest(&a), source_digest(&b));
    }
}

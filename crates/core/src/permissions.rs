//! Permission inheritance from the upstream dataset.
//!
//! A source never owns its permission strings: `perm` and `schema_perm` are
//! copied from the dataset it references every time the source is written.
//! `catalog_perm` is carried on the row but is not part of the inheritance.

use serde::{Deserialize, Serialize};

/// The permission strings a dataset exposes to its dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStrings {
    pub perm: Option<String>,
    pub schema_perm: Option<String>,
}

/// Copy `upstream` onto `target`.
///
/// A missing upstream leaves `target` untouched. Returns whether anything
/// changed, so applying the same upstream twice reports `false` the second
/// time.
pub fn inherit_permissions(
    target: &mut PermissionStrings,
    upstream: Option<&PermissionStrings>,
) -> bool {
    let Some(upstream) = upstream else {
        return false;
    };
    if target == upstream {
        return false;
    }
    target.perm.clone_from(&upstream.perm);
    target.schema_perm.clone_from(&upstream.schema_perm);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(perm: &str, schema: &str) -> PermissionStrings {
        PermissionStrings {
            perm: Some(perm.to_string()),
            schema_perm: Some(schema.to_string()),
        }
    }

    #[test]
    fn copies_upstream_values() {
        let mut target = PermissionStrings::default();
        let upstream = perms("[main].[orders](id:3)", "[main].[public]");
        assert!(inherit_permissions(&mut target, Some(&upstream)));
        assert_eq!(target, upstream);
    }

    #[test]
    fn missing_upstream_is_a_no_op() {
        let mut target = perms("[old]", "[old_schema]");
        assert!(!inherit_permissions(&mut target, None));
        assert_eq!(target, perms("[old]", "[old_schema]"));
    }

    #[test]
    fn second_application_changes_nothing() {
        let mut target = perms("[old]", "[old_schema]");
        let upstream = perms("[new]", "[new_schema]");
        assert!(inherit_permissions(&mut target, Some(&upstream)));
        let snapshot = target.clone();
        assert!(!inherit_permissions(&mut target, Some(&upstream)));
        assert_eq!(target, snapshot);
    }

    #[test]
    fn upstream_nulls_are_copied_too() {
        let mut target = perms("[old]", "[old_schema]");
        let upstream = PermissionStrings {
            perm: Some("[new]".into()),
            schema_perm: None,
        };
        assert!(inherit_permissions(&mut target, Some(&upstream)));
        assert_eq!(target.schema_perm, None);
    }
}

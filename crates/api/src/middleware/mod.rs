//! Request extractors enforcing identity, roles and feature flags.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires `editor` or `admin` role.
//! - [`feature::SourcesEnabled`] -- Rejects with 404 while the sources flag is off.

pub mod auth;
pub mod feature;
pub mod rbac;

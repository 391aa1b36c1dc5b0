//! Well-known role name constants.
//!
//! These must match the `role` values stored in the `users` table.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

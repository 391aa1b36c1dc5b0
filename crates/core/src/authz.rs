//! Explicit authorization context.
//!
//! Ownership checks receive an [`AuthContext`] argument instead of reaching
//! into process-wide state. The HTTP layer builds one from the bearer token;
//! system-triggered writes (worker, migrations, imports run by scripts) use
//! [`AuthContext::system`].

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Acting user, or `None` for system-triggered work.
    pub user_id: Option<DbId>,
    /// Role name of the acting user (empty for system contexts).
    pub role: String,
}

impl AuthContext {
    pub fn user(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            role: role.into(),
        }
    }

    /// A context with no acting user.
    pub fn system() -> Self {
        Self {
            user_id: None,
            role: String::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Reject the action unless the caller is one of `owners` or an admin.
    ///
    /// `action` only feeds the error message ("update", "delete", ...).
    /// System contexts never pass: ownership-gated actions need a person.
    pub fn raise_for_ownership(&self, owners: &[DbId], action: &str) -> Result<(), CoreError> {
        if self.is_admin() {
            return Ok(());
        }
        match self.user_id {
            Some(uid) if owners.contains(&uid) => Ok(()),
            Some(_) => Err(CoreError::Forbidden(format!(
                "Only an owner can {action} this source"
            ))),
            None => Err(CoreError::Unauthorized(format!(
                "An authenticated user is required to {action} this source"
            ))),
        }
    }
}

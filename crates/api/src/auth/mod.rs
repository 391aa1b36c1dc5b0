//! Identity resolution.
//!
//! - [`jwt`] -- HS256 access-token validation (and issuing, for tooling and tests).
//!
//! Tokens are issued by the platform's identity service; this server only
//! consumes them.

pub mod jwt;

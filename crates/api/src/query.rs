//! Query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /sources/updated_since`.
#[derive(Debug, Deserialize)]
pub struct UpdatedSinceParams {
    /// Watermark as milliseconds since the Unix epoch.
    pub last_updated_ms: i64,
}

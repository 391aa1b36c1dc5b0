use std::time::Duration;

use sources_core::explore::DEFAULT_EXPLORE_BASE;
use sources_db::models::thumbnail::DEFAULT_CLAIM_TIMEOUT_SECS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Feature flag for the whole `/sources` resource (default: `true`).
    pub sources_enabled: bool,
    /// Whether thumbnail jobs are queued (default: `true`).
    pub thumbnails_enabled: bool,
    /// Base path used when building explore URLs (default: `/explore`).
    pub explore_base_url: String,
    /// Age after which a `running` thumbnail job no longer counts as open
    /// (default: `300`).
    pub thumbnail_claim_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `SOURCES_ENABLED`      | `true`                     |
    /// | `THUMBNAILS_ENABLED`   | `true`                     |
    /// | `EXPLORE_BASE_URL`     | `/explore`                 |
    /// | `THUMBNAIL_CLAIM_TIMEOUT_SECS` | `300`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let explore_base_url = std::env::var("EXPLORE_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_EXPLORE_BASE.into());

        let thumbnail_claim_timeout_secs: u64 = std::env::var("THUMBNAIL_CLAIM_TIMEOUT_SECS")
            .map(|v| {
                v.parse()
                    .expect("THUMBNAIL_CLAIM_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(DEFAULT_CLAIM_TIMEOUT_SECS);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            sources_enabled: env_flag("SOURCES_ENABLED", true),
            thumbnails_enabled: env_flag("THUMBNAILS_ENABLED", true),
            explore_base_url,
            thumbnail_claim_timeout_secs,
        }
    }

    pub fn thumbnail_claim_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_claim_timeout_secs)
    }
}

/// Read a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value).unwrap_or_else(|| panic!("{name} must be a boolean, got '{value}'")),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}

use civitrack_core::points::DEFAULT_COMPLETION_REWARD;

use crate::advisor::ClassifierConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
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
    /// Points credited to the citizen when a report completes (default: `50`).
    pub completion_reward_points: i64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Routing classifier configuration (URL, timeout, threshold).
    pub classifier: ClassifierConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `COMPLETION_REWARD_POINTS`| `50`                    |
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

        let completion_reward_points: i64 = std::env::var("COMPLETION_REWARD_POINTS")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_REWARD.to_string())
            .parse()
            .expect("COMPLETION_REWARD_POINTS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            completion_reward_points,
            jwt: JwtConfig::from_env(),
            classifier: ClassifierConfig::from_env(),
        }
    }
}

use stxry_core::global_story::DEFAULT_ROUND_DURATION_HOURS;

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
    /// Open-voting lifetime of a Global Story chapter, in hours (default: `24`).
    pub round_duration_hours: i64,
    /// How often the background resolver checks for due rounds, in seconds
    /// (default: `60`).
    pub resolution_poll_secs: u64,
    /// Base URL of the narrative generation service
    /// (default: `http://localhost:9090`).
    pub narrative_api_url: String,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `ROUND_DURATION_HOURS`  | `24`                       |
    /// | `RESOLUTION_POLL_SECS`  | `60`                       |
    /// | `NARRATIVE_API_URL`     | `http://localhost:9090`    |
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

        let round_duration_hours: i64 = std::env::var("ROUND_DURATION_HOURS")
            .unwrap_or_else(|_| DEFAULT_ROUND_DURATION_HOURS.to_string())
            .parse()
            .expect("ROUND_DURATION_HOURS must be a valid i64");
        assert!(round_duration_hours > 0, "ROUND_DURATION_HOURS must be positive");

        let resolution_poll_secs: u64 = std::env::var("RESOLUTION_POLL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RESOLUTION_POLL_SECS must be a valid u64");

        let narrative_api_url = std::env::var("NARRATIVE_API_URL")
            .unwrap_or_else(|_| "http://localhost:9090".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            round_duration_hours,
            resolution_poll_secs,
            narrative_api_url,
            jwt,
        }
    }

    /// The configured round duration as a chrono duration.
    pub fn round_duration(&self) -> chrono::Duration {
        chrono::Duration::hours(self.round_duration_hours)
    }
}

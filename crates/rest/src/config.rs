//! Server configuration for the movie catalog API.
//!
//! Every option can be given on the command line or through the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PORT` | 5000 | Server port |
//! | `HOST` | 0.0.0.0 | Host to bind |
//! | `LOG_LEVEL` | info | Log level |
//! | `REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `ENABLE_CORS` | true | Enable CORS |
//! | `CORS_ORIGINS` | * | Allowed origins |
//! | `CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `CORS_HEADERS` | Content-Type,Accept | Allowed headers |
//! | `DEFAULT_PAGE_SIZE` | 20 | Page size when `limit` is missing |
//! | `MAX_PAGE_SIZE` | 100 | Largest accepted `limit` |
//! | `DATABASE_URL` | | PostgreSQL connection string |
//! | `MONGODB_URI` | | MongoDB connection string |
//! | `MONGODB_DB_NAME` | movie_db | MongoDB database name |
//! | `USE_POSTGRES` | false | Use the PostgreSQL primary |
//! | `USE_MONGODB` | false | Use the MongoDB replica |
//! | `HEALTH_CHECK_ATTEMPTS` | 5 | Probe attempts per health check |
//! | `HEALTH_RETRY_DELAY` | 500ms | Pause between probe attempts |
//! | `HEALTH_RECHECK_INTERVAL` | 2s | Pause before re-checking a degraded setup |
//!
//! # Example
//!
//! ```rust
//! use marquee_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     use_postgres: true,
//!     database_url: Some("postgres://app:secret@db:5432/movies".to_string()),
//!     ..Default::default()
//! };
//! assert!(config.storage_settings().postgres_configured());
//! ```

use std::time::Duration;

use clap::Parser;
use marquee_persistence::composite::{HealthConfig, StorageSettings};
use marquee_persistence::composite::selection::DEFAULT_MONGODB_DB_NAME;

/// Server configuration for the movie catalog API.
#[derive(Debug, Clone, Parser)]
#[command(name = "marquee")]
#[command(about = "Movie catalog server with PostgreSQL/MongoDB failover")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "CORS_METHODS", default_value = "GET,POST,PUT,DELETE,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(long, env = "CORS_HEADERS", default_value = "Content-Type,Accept")]
    pub cors_headers: String,

    /// Page size used when a listing omits `limit`.
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: u32,

    /// Largest page size a listing may request.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "100")]
    pub max_page_size: u32,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name.
    #[arg(long, env = "MONGODB_DB_NAME", default_value = DEFAULT_MONGODB_DB_NAME)]
    pub mongodb_db_name: String,

    /// Use the PostgreSQL primary.
    #[arg(long, env = "USE_POSTGRES")]
    pub use_postgres: bool,

    /// Use the MongoDB replica.
    #[arg(long, env = "USE_MONGODB")]
    pub use_mongodb: bool,

    /// Probe attempts per health check.
    #[arg(long, env = "HEALTH_CHECK_ATTEMPTS", default_value = "5")]
    pub health_check_attempts: u32,

    /// Pause between probe attempts (e.g. `500ms`).
    #[arg(long, env = "HEALTH_RETRY_DELAY", default_value = "500ms", value_parser = humantime::parse_duration)]
    pub health_retry_delay: Duration,

    /// Pause before re-checking a degraded failover setup (e.g. `2s`).
    #[arg(long, env = "HEALTH_RECHECK_INTERVAL", default_value = "2s", value_parser = humantime::parse_duration)]
    pub health_recheck_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let health = HealthConfig::default();
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept".to_string(),
            default_page_size: 20,
            max_page_size: 100,
            database_url: None,
            mongodb_uri: None,
            mongodb_db_name: DEFAULT_MONGODB_DB_NAME.to_string(),
            use_postgres: false,
            use_mongodb: false,
            health_check_attempts: health.attempts,
            health_retry_delay: health.retry_delay,
            health_recheck_interval: health.recheck_interval,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables, ignoring the
    /// command line.
    pub fn from_env() -> Self {
        Self::try_parse_from(["marquee"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Inputs for the storage selection policy.
    pub fn storage_settings(&self) -> StorageSettings {
        StorageSettings {
            use_postgres: self.use_postgres,
            use_mongodb: self.use_mongodb,
            database_url: self.database_url.clone(),
            mongodb_uri: self.mongodb_uri.clone(),
            mongodb_db_name: self.mongodb_db_name.clone(),
        }
    }

    /// Settings for the startup health monitor.
    pub fn health_config(&self) -> HealthConfig {
        HealthConfig::default()
            .with_attempts(self.health_check_attempts)
            .with_retry_delay(self.health_retry_delay)
            .with_recheck_interval(self.health_recheck_interval)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if self.health_check_attempts == 0 {
            errors.push("Health check attempts cannot be 0".to_string());
        }

        if self.mongodb_db_name.trim().is_empty() {
            errors.push("MongoDB database name cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Binds an ephemeral port, disables CORS and selects in-memory storage.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            health_retry_delay: Duration::from_millis(10),
            health_recheck_interval: Duration::from_millis(50),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.mongodb_db_name, "movie_db");
        assert!(!config.use_postgres);
        assert!(!config.use_mongodb);
    }

    #[test]
    fn test_parse_matches_default() {
        let parsed = ServerConfig::try_parse_from(["marquee"]).unwrap();
        let default = ServerConfig::default();
        assert_eq!(parsed.health_retry_delay, default.health_retry_delay);
        assert_eq!(parsed.health_recheck_interval, default.health_recheck_interval);
    }

    #[test]
    fn test_parse_flags() {
        let config = ServerConfig::try_parse_from([
            "marquee",
            "--use-postgres",
            "--database-url",
            "postgres://localhost/movies",
            "--health-retry-delay",
            "250ms",
        ])
        .unwrap();
        assert!(config.use_postgres);
        assert_eq!(config.health_retry_delay, Duration::from_millis(250));
        assert!(config.storage_settings().postgres_configured());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "127.0.0.1".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_health_config() {
        let config = ServerConfig {
            health_check_attempts: 2,
            health_recheck_interval: Duration::from_secs(10),
            ..Default::default()
        };
        let health = config.health_config();
        assert_eq!(health.attempts, 2);
        assert_eq!(health.retry_delay, Duration::from_millis(500));
        assert_eq!(health.recheck_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_validate_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ServerConfig {
            request_timeout: 0,
            default_page_size: 200,
            health_check_attempts: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("exceed")));
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
        assert_eq!(config.storage_settings(), StorageSettings::default());
    }
}

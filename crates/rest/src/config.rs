//! Server configuration for the Outpost bulk-read gateway.
//!
//! This module provides configuration types for the gateway, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OUTPOST_SERVER_PORT` | 5988 | Server port |
//! | `OUTPOST_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `OUTPOST_LOG_LEVEL` | info | Log level |
//! | `OUTPOST_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `OUTPOST_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `OUTPOST_ENABLE_CORS` | true | Enable CORS |
//! | `OUTPOST_CORS_ORIGINS` | * | Allowed origins |
//! | `OUTPOST_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `OUTPOST_CORS_HEADERS` | Content-Type,Accept,X-User-ID,X-User-Roles | Allowed headers |
//! | `OUTPOST_ENABLE_REQUEST_ID` | true | Generate and propagate `x-request-id` |
//! | `OUTPOST_STORAGE_BACKEND` | memory | `memory` or `sqlite` |
//! | `OUTPOST_DATABASE_URL` | (none) | SQLite file path or `:memory:` |
//! | `OUTPOST_SEED_FILE` | (none) | JSON documents to load at startup |
//! | `OUTPOST_GRANTS_FILE` | (none) | JSON authorization grants |
//! | `OUTPOST_ONLINE_ROLES` | national_admin,_admin | Roles that bypass filtering |
//! | `OUTPOST_CACHE_AUTHORIZATION` | true | Cache authorization contexts per caller |
//!
//! # Example
//!
//! ```rust
//! use outpost_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use std::fmt;
use std::str::FromStr;

use clap::Parser;

/// Which document store the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendMode {
    /// Process-local in-memory store.
    Memory,
    /// SQLite, file-based or `:memory:`.
    Sqlite,
}

impl FromStr for StorageBackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackendMode::Memory),
            "sqlite" => Ok(StorageBackendMode::Sqlite),
            other => Err(format!(
                "unknown storage backend '{}' (expected 'memory' or 'sqlite')",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendMode::Memory => write!(f, "memory"),
            StorageBackendMode::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Server configuration for the bulk-read gateway.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "outpost")]
#[command(about = "Authorization-filtered bulk document read gateway")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "OUTPOST_SERVER_PORT", default_value = "5988")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "OUTPOST_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "OUTPOST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "OUTPOST_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "OUTPOST_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "OUTPOST_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "OUTPOST_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "OUTPOST_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "OUTPOST_CORS_HEADERS",
        default_value = "Content-Type,Accept,X-User-ID,X-User-Roles"
    )]
    pub cors_headers: String,

    /// Enable request ID tracking.
    #[arg(long, env = "OUTPOST_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Document store backend (memory, sqlite).
    #[arg(long, env = "OUTPOST_STORAGE_BACKEND", default_value = "memory")]
    pub storage_backend: String,

    /// Database location for the SQLite backend.
    #[arg(long, env = "OUTPOST_DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON file of documents to load at startup, keyed by database.
    #[arg(long, env = "OUTPOST_SEED_FILE")]
    pub seed_file: Option<String>,

    /// JSON file of authorization grants.
    #[arg(long, env = "OUTPOST_GRANTS_FILE")]
    pub grants_file: Option<String>,

    /// Roles whose holders read the store unfiltered (comma-separated).
    #[arg(long, env = "OUTPOST_ONLINE_ROLES", default_value = "national_admin,_admin")]
    pub online_roles: String,

    /// Cache authorization contexts per caller.
    #[arg(long, env = "OUTPOST_CACHE_AUTHORIZATION", default_value = "true")]
    pub cache_authorization: bool,

    /// Maximum number of users whose authorization contexts are cached.
    #[arg(long, env = "OUTPOST_AUTH_CACHE_CAPACITY", default_value = "10000")]
    pub auth_cache_capacity: u64,

    /// Seconds a cached authorization context is served before it is resolved again.
    #[arg(long, env = "OUTPOST_AUTH_CACHE_TTL", default_value = "60")]
    pub auth_cache_ttl: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5988,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,X-User-ID,X-User-Roles".to_string(),
            enable_request_id: true,
            storage_backend: "memory".to_string(),
            database_url: None,
            seed_file: None,
            grants_file: None,
            online_roles: "national_admin,_admin".to_string(),
            cache_authorization: true,
            auth_cache_capacity: 10_000,
            auth_cache_ttl: 60,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured storage backend.
    pub fn storage_backend_mode(&self) -> Result<StorageBackendMode, String> {
        self.storage_backend.parse()
    }

    /// Returns the online roles as a list.
    pub fn online_roles(&self) -> Vec<String> {
        split_list(&self.online_roles)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if let Err(e) = self.storage_backend_mode() {
            errors.push(format!("Storage backend: {}", e));
        }

        if self.cache_authorization && self.auth_cache_capacity == 0 {
            errors.push("Authorization cache capacity cannot be 0".to_string());
        }

        if self.cache_authorization && self.auth_cache_ttl == 0 {
            errors.push("Authorization cache TTL cannot be 0".to_string());
        }

        if self.online_roles().is_empty() {
            errors.push("At least one online role is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 10 * 1024 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            enable_request_id: false,
            storage_backend: "memory".to_string(),
            database_url: None,
            seed_file: None,
            grants_file: None,
            online_roles: "national_admin".to_string(),
            cache_authorization: false,
            auth_cache_capacity: 100,
            auth_cache_ttl: 5,
        }
    }
}

/// Splits a comma-separated list, dropping blanks.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base used for upload URLs. Derived from the request Host header when unset.
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub remember_me_ttl_secs: i64,
    pub cors_origins: Vec<String>,
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("SERVER_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("SERVER_PORT", &v)?;
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            self.server.public_base_url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_TTL_SECS") {
            self.security.token_ttl_secs = parse_var("SECURITY_TOKEN_TTL_SECS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_REMEMBER_ME_TTL_SECS") {
            self.security.remember_me_ttl_secs = parse_var("SECURITY_REMEMBER_ME_TTL_SECS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = parse_var("SECURITY_MIN_PASSWORD_LENGTH", &v)?;
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_upload_bytes = parse_var("UPLOAD_MAX_BYTES", &v)?;
        }

        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_SIZE") {
            self.pagination.default_page_size = parse_var("PAGINATION_DEFAULT_SIZE", &v)?;
        }
        if let Ok(v) = env::var("PAGINATION_MAX_SIZE") {
            self.pagination.max_page_size = parse_var("PAGINATION_MAX_SIZE", &v)?;
        }

        Ok(self)
    }

    /// Checks invariants that env overrides could have broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.security.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "SECURITY_TOKEN_TTL_SECS",
                value: self.security.token_ttl_secs.to_string(),
            });
        }
        if self.security.remember_me_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "SECURITY_REMEMBER_ME_TTL_SECS",
                value: self.security.remember_me_ttl_secs.to_string(),
            });
        }
        if self.pagination.default_page_size < 1 || self.pagination.max_page_size < self.pagination.default_page_size {
            return Err(ConfigError::Invalid {
                name: "PAGINATION_DEFAULT_SIZE",
                value: format!(
                    "default {} / max {}",
                    self.pagination.default_page_size, self.pagination.max_page_size
                ),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                public_base_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_secs: 60 * 60,
                remember_me_ttl_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["http://localhost:5173".to_string(), "http://localhost:8080".to_string()],
                min_password_length: 6,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_upload_bytes: 20 * 1024 * 1024, // 20MB
            },
            pagination: PaginationConfig {
                default_page_size: 10,
                max_page_size: 1000,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                public_base_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_secs: 60 * 60,
                remember_me_ttl_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["https://staging.example.com".to_string()],
                min_password_length: 6,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            pagination: PaginationConfig {
                default_page_size: 10,
                max_page_size: 500,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                public_base_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_secs: 60 * 60,
                remember_me_ttl_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["http://journey.crabdance.com".to_string()],
                min_password_length: 6,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            pagination: PaginationConfig {
                default_page_size: 10,
                max_page_size: 100,
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

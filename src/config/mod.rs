use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub admin: AdminConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub chat: ChatConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// The single administrative principal. Never persisted by the HTTP layer.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl AdminConfig {
    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_days", &self.jwt_expiry_days)
            .field("secure_cookies", &self.secure_cookies)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` selects the in-memory project store.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Connection strings carry credentials; only the host is shown
        let host = self
            .url
            .as_deref()
            .and_then(|u| url::Url::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_string));
        f.debug_struct("DatabaseConfig")
            .field("host", &host)
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_prefix: String,
    pub max_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub probe_interval_secs: u64,
    pub profile_path: Option<PathBuf>,
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("probe_interval_secs", &self.probe_interval_secs)
            .field("profile_path", &self.profile_path)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

const DEFAULT_JWT_SECRET: &str = "folio-development-secret-change-me";
const JWT_EXPIRY_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self) -> Self {
        // Admin identity
        if let Ok(v) = env::var("ADMIN_NAME") {
            self.admin.name = v;
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.admin.email = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.admin.password = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_DAYS") {
            self.security.jwt_expiry_days = v.parse().unwrap_or(self.security.jwt_expiry_days);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.upload.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.upload.max_bytes = v.parse().unwrap_or(self.upload.max_bytes);
        }

        // Chat overrides
        if let Ok(v) = env::var("GEMINI_API_KEY") {
            self.chat.api_key = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("CHAT_MODEL") {
            self.chat.model = v;
        }
        if let Ok(v) = env::var("CHAT_API_BASE_URL") {
            self.chat.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("CHAT_TIMEOUT_SECS") {
            self.chat.timeout_secs = v.parse().unwrap_or(self.chat.timeout_secs);
        }
        if let Ok(v) = env::var("CHAT_PROBE_INTERVAL_SECS") {
            self.chat.probe_interval_secs = v.parse().unwrap_or(self.chat.probe_interval_secs);
        }
        if let Ok(v) = env::var("CHAT_PROFILE_PATH") {
            self.chat.profile_path = Some(PathBuf::from(v));
        }

        // API overrides
        if let Some(port) = env::var("FOLIO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        self
    }

    /// Reports misconfiguration that should stop the server from starting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.is_production() {
            if self.security.jwt_secret == DEFAULT_JWT_SECRET {
                return Err(ConfigError::Invalid {
                    field: "JWT_SECRET",
                    reason: "the development default cannot be used in production".to_string(),
                });
            }
            if self.database.url.is_none() {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
        }
        if self.api.max_request_size_bytes < self.upload.max_bytes {
            return Err(ConfigError::Invalid {
                field: "API_MAX_REQUEST_SIZE_BYTES",
                reason: format!(
                    "must be at least UPLOAD_MAX_BYTES ({})",
                    self.upload.max_bytes
                ),
            });
        }
        if !JWT_EXPIRY_DAYS_RANGE.contains(&self.security.jwt_expiry_days) {
            return Err(ConfigError::Invalid {
                field: "JWT_EXPIRY_DAYS",
                reason: format!(
                    "must be between {} and {}",
                    JWT_EXPIRY_DAYS_RANGE.start(),
                    JWT_EXPIRY_DAYS_RANGE.end()
                ),
            });
        }
        if self.chat.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "CHAT_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.chat.probe_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "CHAT_PROBE_INTERVAL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(url) = &self.database.url {
            url::Url::parse(url).map_err(|e| ConfigError::Invalid {
                field: "DATABASE_URL",
                reason: e.to_string(),
            })?;
        }
        url::Url::parse(&self.chat.base_url).map_err(|e| ConfigError::Invalid {
            field: "CHAT_API_BASE_URL",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            admin: AdminConfig {
                name: "Admin".to_string(),
                email: String::new(),
                password: String::new(),
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_days: 30,
                secure_cookies: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            upload: UploadConfig {
                dir: PathBuf::from("public/uploads"),
                public_prefix: "/uploads".to_string(),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
            chat: ChatConfig {
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
                base_url: GEMINI_BASE_URL.to_string(),
                timeout_secs: 30,
                probe_interval_secs: 10,
                profile_path: None,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.security.secure_cookies = true;
        config.security.cors_origins = vec![];
        config.database.max_connections = 10;
        config.database.connection_timeout = 10;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.security.jwt_secret = String::new();
        config.security.secure_cookies = true;
        config.security.cors_origins = vec![];
        config.database.max_connections = 20;
        config.database.connection_timeout = 5;
        config.chat.timeout_secs = 20;
        config.api.enable_request_logging = false;
        config
    }
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::str::FromStr;

/// Runtime settings for the API server, grouped by concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub listing: ListingConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub search_limit: u32,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent the service keeps towers in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub admin_username: String,
    /// Lowercase hex SHA-256 of the admin password. Login is disabled while unset.
    #[serde(skip_serializing)]
    pub admin_password_sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_env_overrides()
    }

    /// Profile defaults without any environment overrides applied.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Store the digest of a plaintext admin password.
    pub fn with_admin_password(mut self, password: &str) -> Self {
        self.security.admin_password_sha256 = Some(sha256_hex(password));
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var("TOWER_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        override_parsed("LISTING_DEFAULT_LIMIT", &mut self.listing.default_limit);
        override_parsed("LISTING_MAX_LIMIT", &mut self.listing.max_limit);
        override_parsed("LISTING_SEARCH_LIMIT", &mut self.listing.search_limit);
        override_parsed("LISTING_DEBUG_LOGGING", &mut self.listing.debug_logging);

        if let Some(url) = non_empty_var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        override_parsed("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_parsed("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);

        if let Some(origins) = non_empty_var("CORS_ORIGINS") {
            self.security.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(secret) = non_empty_var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        override_parsed("JWT_EXPIRY_HOURS", &mut self.security.jwt_expiry_hours);
        if let Some(username) = non_empty_var("ADMIN_USERNAME") {
            self.security.admin_username = username;
        }
        // A ready-made digest wins over a plaintext password.
        if let Some(digest) = non_empty_var("ADMIN_PASSWORD_SHA256") {
            self.security.admin_password_sha256 = Some(digest.trim().to_ascii_lowercase());
        } else if let Some(password) = non_empty_var("ADMIN_PASSWORD") {
            self.security.admin_password_sha256 = Some(sha256_hex(&password));
        }

        override_parsed("ACTIVITY_CAPACITY", &mut self.activity.capacity);
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            listing: ListingConfig {
                default_limit: 20,
                max_limit: 1000,
                search_limit: 50,
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
                admin_username: "admin".to_string(),
                admin_password_sha256: None,
            },
            activity: ActivityConfig { capacity: 50 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            listing: ListingConfig {
                default_limit: 20,
                max_limit: 500,
                search_limit: 50,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://towers.staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                admin_username: "admin".to_string(),
                admin_password_sha256: None,
            },
            activity: ActivityConfig { capacity: 100 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            listing: ListingConfig {
                default_limit: 20,
                max_limit: 100,
                search_limit: 25,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://towers.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                admin_username: "admin".to_string(),
                admin_password_sha256: None,
            },
            activity: ActivityConfig { capacity: 100 },
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Replace `slot` with the parsed variable; unparsable values keep the profile default.
fn override_parsed<T: FromStr>(name: &str, slot: &mut T) {
    match non_empty_var(name).map(|v| v.trim().parse::<T>()) {
        Some(Ok(value)) => *slot = value,
        Some(Err(_)) => tracing::warn!("Ignoring unparsable {}", name),
        None => {}
    }
}

pub fn sha256_hex(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Process-wide configuration, read from the environment on first use.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.listing.default_limit, 20);
        assert!(config.database.url.is_none());
        assert!(config.security.admin_password_sha256.is_none());
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.listing.max_limit, 100);
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }

    #[test]
    fn admin_password_is_stored_as_digest() {
        let config = AppConfig::development().with_admin_password("s3cret");
        let digest = config.security.admin_password_sha256.unwrap();
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, "s3cret");
        assert_eq!(digest, sha256_hex("s3cret"));
    }
}

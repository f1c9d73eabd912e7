/// Configuration management for the API server
///
/// Everything comes from environment variables (a `.env` file is loaded in
/// development). There is no config file layer: a single-service deployment
/// does not need one.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins; `*` means permissive
///   development CORS (default: `*`)
/// - `PRODUCTION`: Enables HSTS on responses (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 20)
/// - `JWT_SECRET`: Secret for signing session tokens (required, >= 32 bytes)
/// - `ADMIN_USERNAME`: Admin login name (default: admin)
/// - `ADMIN_PASSWORD_HASH`: Argon2 PHC hash of the admin password (required;
///   generate with the `generate-admin-hash` binary)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Admin account configuration
    pub admin: AdminConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` enables permissive development CORS
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// The single admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Login name
    pub username: String,

    /// Argon2 PHC hash of the password; the plaintext is never configured
    pub password_hash: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric
    /// variable fails to parse, the JWT secret is too short, or the admin
    /// hash is not an Argon2 PHC string. Misconfiguration fails startup
    /// rather than surfacing as 500s at login time.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = matches!(
            env::var("PRODUCTION").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

        let admin_password_hash = env::var("ADMIN_PASSWORD_HASH").map_err(|_| {
            anyhow::anyhow!(
                "ADMIN_PASSWORD_HASH environment variable is required \
                 (generate one with the generate-admin-hash binary)"
            )
        })?;

        if !admin_password_hash.starts_with("$argon2") {
            anyhow::bail!("ADMIN_PASSWORD_HASH must be an Argon2 PHC string");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            admin: AdminConfig {
                username: admin_username,
                password_hash: admin_password_hash,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 20,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = test_config();
        let cloned = config.clone();
        assert_eq!(config.admin.username, cloned.admin.username);
        assert_eq!(config.api.cors_origins, cloned.api.cors_origins);
    }
}

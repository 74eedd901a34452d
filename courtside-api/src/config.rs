/// Configuration management for the API server
///
/// Loads configuration from environment variables (a `.env` file is honored
/// in development) and validates it eagerly so misconfiguration fails at
/// startup, not on the first request.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS and strict CORS (default: false)
/// - `ADMIN_EMAIL`: Optional email promoted to admin on registration
/// - `MONGODB_URL`: MongoDB connection string (required)
/// - `MONGODB_DB`: Database name (default: courtside)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 bytes (required)
/// - `TRIPAY_BASE_URL`: Gateway API base (default: Tripay sandbox)
/// - `TRIPAY_API_KEY`: Gateway API key (required)
/// - `TRIPAY_PRIVATE_KEY`: Gateway signing key (required)
/// - `TRIPAY_MERCHANT_CODE`: Gateway merchant code (required)
/// - `RUST_LOG`: Log level (default: info)

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

    /// Payment gateway configuration
    pub tripay: TripayConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive (development)
    pub cors_origins: Vec<String>,

    /// Whether the server runs behind HTTPS in production
    pub production: bool,

    /// Email address promoted to admin on registration
    pub admin_email: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection URL
    pub url: String,

    /// Database name
    pub name: String,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Tripay payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripayConfig {
    /// API base URL (sandbox or production)
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Private key used for transaction and callback signatures
    pub private_key: String,

    /// Merchant code issued by the gateway
    pub merchant_code: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
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

        let production = env::var("PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let admin_email = env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty());

        let database_url = env::var("MONGODB_URL")
            .map_err(|_| anyhow::anyhow!("MONGODB_URL environment variable is required"))?;
        let database_name = env::var("MONGODB_DB").unwrap_or_else(|_| "courtside".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let tripay_base_url = env::var("TRIPAY_BASE_URL")
            .unwrap_or_else(|_| "https://tripay.co.id/api-sandbox".to_string());
        let tripay_api_key = env::var("TRIPAY_API_KEY")
            .map_err(|_| anyhow::anyhow!("TRIPAY_API_KEY environment variable is required"))?;
        let tripay_private_key = env::var("TRIPAY_PRIVATE_KEY")
            .map_err(|_| anyhow::anyhow!("TRIPAY_PRIVATE_KEY environment variable is required"))?;
        let tripay_merchant_code = env::var("TRIPAY_MERCHANT_CODE")
            .map_err(|_| anyhow::anyhow!("TRIPAY_MERCHANT_CODE environment variable is required"))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
                admin_email,
            },
            database: DatabaseConfig {
                url: database_url,
                name: database_name,
            },
            jwt: JwtConfig { secret: jwt_secret },
            tripay: TripayConfig {
                base_url: tripay_base_url,
                api_key: tripay_api_key,
                private_key: tripay_private_key,
                merchant_code: tripay_merchant_code,
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

    pub fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
                admin_email: None,
            },
            database: DatabaseConfig {
                url: "mongodb://localhost:27017".to_string(),
                name: "courtside_test".to_string(),
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            tripay: TripayConfig {
                base_url: "https://tripay.co.id/api-sandbox".to_string(),
                api_key: "test-api-key".to_string(),
                private_key: "test-private-key".to_string(),
                merchant_code: "T0001".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}

use once_cell::sync::Lazy;
use std::env;

/// Process configuration, loaded once from the environment at startup.
///
/// Signing secrets are validated separately in `main`; a missing secret is
/// fatal there, while everything else falls back to a default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub cloudinary: CloudinaryConfig,
    pub razorpay: RazorpayConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub bcrypt_cost: u32,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

/// Optional credentials for the admin account created on first start.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self {
            environment,
            server: ServerConfig {
                port: env_parsed("PORT", 5000),
            },
            database: DatabaseConfig {
                max_connections: env_parsed("DATABASE_MAX_CONNECTIONS", 10),
                connection_timeout: env_parsed("DATABASE_CONNECTION_TIMEOUT", 30),
            },
            security: SecurityConfig {
                jwt_secret: env_string("JWT_SECRET"),
                jwt_refresh_secret: env_string("JWT_REFRESH_SECRET"),
                bcrypt_cost: env_parsed("BCRYPT_COST", 10),
                access_token_ttl_minutes: env_parsed("ACCESS_TOKEN_TTL_MINUTES", 15),
                refresh_token_ttl_days: env_parsed("REFRESH_TOKEN_TTL_DAYS", 7),
            },
            admin: AdminConfig {
                email: env::var("ADMIN_EMAIL").ok(),
                password: env::var("ADMIN_PASSWORD").ok(),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: env_string("CLOUDINARY_CLOUD_NAME"),
                api_key: env_string("CLOUDINARY_API_KEY"),
                api_secret: env_string("CLOUDINARY_API_SECRET"),
            },
            razorpay: RazorpayConfig {
                key_id: env_string("RAZORPAY_KEY_ID"),
                secret_key: env_string("RAZORPAY_SECRET_KEY"),
            },
        }
    }
}

fn env_string(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

fn env_parsed<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_falls_back_on_missing_or_garbage() {
        assert_eq!(env_parsed("STOREFRONT_TEST_UNSET_VAR", 42u16), 42);

        env::set_var("STOREFRONT_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(env_parsed("STOREFRONT_TEST_GARBAGE_VAR", 7u32), 7);
        env::remove_var("STOREFRONT_TEST_GARBAGE_VAR");
    }

    #[test]
    fn unset_secrets_load_as_empty_strings() {
        env::remove_var("STOREFRONT_TEST_SECRET");
        assert_eq!(env_string("STOREFRONT_TEST_SECRET"), "");
    }
}

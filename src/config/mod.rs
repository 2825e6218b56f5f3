use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub resend_api_key: Option<String>,
    pub email_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/festra".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            token_secret: env::var("TOKEN_SECRET")
                .unwrap_or_else(|_| "festra-dev-secret".to_string()),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24 * 7),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "events@festra.dev".to_string()),
        }
    }

    /// Fixed settings for tests: no external services, a known secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            port: 0,
            token_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            resend_api_key: None,
            email_from: "test@festra.dev".to_string(),
        }
    }
}

use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub graphql_url: String,
    pub auth_url: String,
    pub site_url: String,
    pub image_bucket_url: String,
    pub interview_link_base: String,
    pub session_cookie: String,
    pub mixpanel_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Page instances untouched for this long are dropped.
    pub page_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            graphql_url: require_env("GRAPHQL_URL")?,
            auth_url: trim_base(require_env("AUTH_URL")?),
            site_url: trim_base(optional_env("SITE_URL", "http://localhost:3000")),
            image_bucket_url: trim_base(optional_env(
                "IMAGE_BUCKET_URL",
                "https://storage.googleapis.com/eden_companies_images",
            )),
            interview_link_base: trim_base(optional_env(
                "INTERVIEW_LINK_BASE",
                "https://developer-dao.joineden.ai",
            )),
            session_cookie: optional_env("SESSION_COOKIE", "edenAuthToken"),
            mixpanel_token: std::env::var("MIXPANEL_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            page_idle_ttl: Duration::from_secs(
                std::env::var("PAGE_IDLE_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .context("PAGE_IDLE_TTL_SECS must be a whole number of seconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Base URLs are joined with `format!("{base}/path")`, so drop trailing slashes.
fn trim_base(value: String) -> String {
    value.trim_end_matches('/').to_string()
}

#[cfg(test)]
impl Config {
    /// Deterministic configuration for handler tests. No network is touched
    /// because every outbound client is replaced by a stub.
    pub fn for_tests() -> Self {
        Config {
            graphql_url: "http://graphql.test/graphql".to_string(),
            auth_url: "http://auth.test".to_string(),
            site_url: "http://site.test".to_string(),
            image_bucket_url: "https://storage.googleapis.com/eden_companies_images".to_string(),
            interview_link_base: "https://developer-dao.joineden.ai".to_string(),
            session_cookie: "edenAuthToken".to_string(),
            mixpanel_token: None,
            port: 0,
            rust_log: "debug".to_string(),
            page_idle_ttl: Duration::from_secs(1800),
        }
    }
}

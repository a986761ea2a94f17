use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub match_api_url: String,
    pub match_api_timeout_secs: u64,
    /// Model identifier forwarded with every analysis request unless the caller overrides it.
    pub match_model: String,
    /// Auth service base URL. Auth routes are disabled when unset.
    pub auth_api_url: Option<String>,
    pub payment_api_url: String,
    /// Checkout is disabled when unset.
    pub payment_secret_key: Option<String>,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            match_api_url: trim_slash(require("MATCH_API_URL")?),
            match_api_timeout_secs: get("MATCH_API_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".to_string())
                .parse::<u64>()
                .context("MATCH_API_TIMEOUT_SECS must be a whole number of seconds")?,
            match_model: get("MATCH_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            auth_api_url: get("AUTH_API_URL").map(trim_slash),
            payment_api_url: trim_slash(
                get("PAYMENT_API_URL").unwrap_or_else(|| "https://api.stripe.com".to_string()),
            ),
            payment_secret_key: get("PAYMENT_SECRET_KEY"),
            checkout_success_url: get("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|| "http://localhost:3000/success".to_string()),
            checkout_cancel_url: get("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|| "http://localhost:3000/cancel".to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

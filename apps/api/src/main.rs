mod analysis;
mod auth;
mod checkout;
mod config;
mod errors;
mod match_client;
mod resume;
mod routes;
mod state;
mod upstream;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{AuthClient, AuthSession};
use crate::checkout::CheckoutClient;
use crate::config::Config;
use crate::match_client::MatchApiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume match API v{}", env!("CARGO_PKG_VERSION"));

    let auth = match &config.auth_api_url {
        Some(url) => {
            let client = AuthClient::new(url.clone()).context("Failed to build auth client")?;
            info!("Auth service configured at {url}");
            Some(AuthSession::new(client))
        }
        None => {
            info!("AUTH_API_URL not set; auth routes disabled");
            None
        }
    };

    let matcher = MatchApiClient::new(
        config.match_api_url.clone(),
        config.match_api_timeout_secs,
        auth.clone(),
    )
    .context("Failed to build match API client")?;
    info!(
        "Match API client initialized ({}, timeout {}s, default model {})",
        config.match_api_url, config.match_api_timeout_secs, config.match_model
    );

    let checkout = match &config.payment_secret_key {
        Some(key) => Some(
            CheckoutClient::new(
                config.payment_api_url.clone(),
                key.clone(),
                config.checkout_success_url.clone(),
                config.checkout_cancel_url.clone(),
            )
            .context("Failed to build checkout client")?,
        ),
        None => {
            info!("PAYMENT_SECRET_KEY not set; checkout disabled");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        matcher: Arc::new(matcher),
        auth,
        checkout,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod test_support {
    use async_trait::async_trait;
    use axum::{
        body::to_bytes,
        http::StatusCode,
        response::Response,
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::match_client::{FilePayload, MatchAnalyzer, MatchApiError, MatchResult, UpstreamHealth};
    use crate::state::AppState;

    /// Serves `app` on an ephemeral local port and returns its base URL.
    pub async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// State with auth and checkout disabled.
    pub fn test_state(matcher: Arc<dyn MatchAnalyzer>) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "MATCH_API_URL" => Some("http://match.invalid".to_string()),
            _ => None,
        })
        .unwrap();
        AppState {
            config,
            matcher,
            auth: None,
            checkout: None,
        }
    }

    pub async fn body_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// For routes that must never reach the match API.
    pub struct UnreachableAnalyzer;

    #[async_trait]
    impl MatchAnalyzer for UnreachableAnalyzer {
        async fn analyze(
            &self,
            _resume: FilePayload,
            _job_description: FilePayload,
            _model: &str,
        ) -> Result<MatchResult, MatchApiError> {
            panic!("match API must not be called")
        }

        async fn health(&self) -> Result<UpstreamHealth, MatchApiError> {
            panic!("match API must not be called")
        }
    }
}

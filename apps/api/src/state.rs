use std::sync::Arc;

use crate::auth::AuthSession;
use crate::checkout::CheckoutClient;
use crate::config::Config;
use crate::match_client::MatchAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Match API backend. `MatchApiClient` in production, stubbed in tests.
    pub matcher: Arc<dyn MatchAnalyzer>,
    /// `None` when AUTH_API_URL is unset.
    pub auth: Option<AuthSession>,
    /// `None` when PAYMENT_SECRET_KEY is unset.
    pub checkout: Option<CheckoutClient>,
}

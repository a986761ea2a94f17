pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::checkout::handlers as checkout;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume rendering
        .route(
            "/api/v1/resume/templates",
            get(resume::handle_list_templates),
        )
        .route("/api/v1/resume/render", post(resume::handle_render))
        // Match analysis
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route(
            "/api/v1/analyze/health",
            get(analysis::handle_analyze_health),
        )
        // Auth session
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Payments
        .route(
            "/create-checkout-session",
            post(checkout::handle_create_checkout_session),
        )
        .with_state(state)
}

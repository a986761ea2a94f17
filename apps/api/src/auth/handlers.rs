use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::{AuthSession, Credentials, RegisterRequest, UserProfile};
use crate::errors::AppError;
use crate::state::AppState;

fn session(state: &AppState) -> Result<&AuthSession, AppError> {
    state.auth.as_ref().ok_or(AppError::AuthDisabled)
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    session(&state)?.login(&req).await?;
    Ok(Json(json!({ "authenticated": true })))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    session(&state)?.register(&req).await?;
    Ok(Json(json!({ "authenticated": true })))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    session(&state)?.logout().await;
    Ok(Json(json!({ "authenticated": false })))
}

/// GET /api/v1/auth/me
pub async fn handle_me(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    let profile = session(&state)?.me().await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use crate::auth::{AuthClient, AuthSession};
    use crate::routes::build_router;
    use crate::test_support::{body_json, spawn_upstream, test_state, UnreachableAnalyzer};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_auth_routes_disabled_without_service() {
        let app = build_router(test_state(Arc::new(UnreachableAnalyzer)));
        let response = app.oneshot(get_uri("/api/v1/auth/me")).await.unwrap();
        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "AUTH_DISABLED");
    }

    #[tokio::test]
    async fn test_login_then_me_then_logout() {
        let upstream = Router::new()
            .route(
                "/auth/login",
                post(|| async { Json(json!({ "access_token": "a1", "refresh_token": "r1" })) }),
            )
            .route(
                "/auth/me",
                get(|| async { Json(json!({ "id": "u-1", "email": "jane@example.org", "name": "Jane" })) }),
            );
        let base = spawn_upstream(upstream).await;

        let mut state = test_state(Arc::new(UnreachableAnalyzer));
        state.auth = Some(AuthSession::new(AuthClient::new(base).unwrap()));
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({ "email": "jane@example.org", "password": "pw" }),
            ))
            .await
            .unwrap();
        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);

        let (status, body) = body_json(app.clone().oneshot(get_uri("/api/v1/auth/me")).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.org");
        assert_eq!(body["id"], "u-1");

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/auth/logout", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = body_json(app.oneshot(get_uri("/api/v1/auth/me")).await.unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

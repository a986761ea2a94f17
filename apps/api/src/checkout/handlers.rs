use axum::{extract::State, Json};

use crate::checkout::{CheckoutRequest, CheckoutSession};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /create-checkout-session
pub async fn handle_create_checkout_session(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>, AppError> {
    let checkout = state.checkout.as_ref().ok_or(AppError::PaymentDisabled)?;
    req.validate().map_err(AppError::Validation)?;
    let session = checkout.create_session(&req).await?;
    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use crate::routes::build_router;
    use crate::test_support::{body_json, test_state, UnreachableAnalyzer};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn checkout_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create-checkout-session")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_disabled_without_secret_key() {
        let app = build_router(test_state(Arc::new(UnreachableAnalyzer)));
        let response = app
            .oneshot(checkout_request(r#"{"price_id": "price_1"}"#))
            .await
            .unwrap();
        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "PAYMENT_DISABLED");
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_before_forwarding() {
        let mut state = test_state(Arc::new(UnreachableAnalyzer));
        // Nothing listens on this port; validation must fail first.
        state.checkout = Some(
            crate::checkout::CheckoutClient::new(
                "http://127.0.0.1:9".into(),
                "sk_test".into(),
                "http://s".into(),
                "http://c".into(),
            )
            .unwrap(),
        );
        let response = build_router(state)
            .oneshot(checkout_request(r#"{"price_id": "price_1", "quantity": 0}"#))
            .await
            .unwrap();
        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

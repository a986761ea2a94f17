//! Checkout Forwarder: creates hosted payment sessions with the payment provider.
//!
//! The request is form-encoded the way the provider expects nested fields
//! (`line_items[0][price]`), authorised with the secret key, and carries a fresh
//! `Idempotency-Key` per call.

pub mod handlers;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::upstream;

const CHECKOUT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Could not parse payment provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.price_id.trim().is_empty() {
            return Err("price_id must not be empty".to_string());
        }
        if self.quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutClient {
    client: Client,
    base_url: String,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

impl CheckoutClient {
    pub fn new(
        base_url: String,
        secret_key: String,
        success_url: String,
        cancel_url: String,
    ) -> Result<Self, CheckoutError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CHECKOUT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url,
            secret_key,
            success_url,
            cancel_url,
        })
    }

    fn form_fields(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price]", request.price_id.trim().to_string()),
            ("line_items[0][quantity]", request.quantity.to_string()),
            (
                "success_url",
                request
                    .success_url
                    .clone()
                    .unwrap_or_else(|| self.success_url.clone()),
            ),
            (
                "cancel_url",
                request
                    .cancel_url
                    .clone()
                    .unwrap_or_else(|| self.cancel_url.clone()),
            ),
        ];
        if let Some(email) = request.customer_email.as_deref().filter(|e| !e.trim().is_empty()) {
            fields.push(("customer_email", email.trim().to_string()));
        }
        fields
    }

    pub async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let idempotency_key = Uuid::new_v4().to_string();
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", &idempotency_key)
            .form(&self.form_fields(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = upstream::failure(response).await;
            return Err(CheckoutError::Provider { status, message });
        }

        let body = response.text().await?;
        let session: CheckoutSession = serde_json::from_str(&body)?;
        info!(
            "Checkout session {} created (price={}, quantity={})",
            session.id, request.price_id, request.quantity
        );
        Ok(session)
    }
}

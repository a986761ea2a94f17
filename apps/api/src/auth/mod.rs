//! Auth Session: client for the external auth service plus the token pair the
//! service holds for authenticated upstream calls.
//!
//! Calls made through [`AuthSession::send`] carry `Authorization: Bearer`. A 401
//! triggers exactly one refresh and one retry; if the refresh fails the stored
//! tokens are cleared and the caller gets `AuthError::SessionExpired`. Concurrent
//! 401s share a single refresh, and only the pair that failed is ever cleared.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::upstream;

const AUTH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session expired; log in again")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// The `me` payload. Fields beyond id/email/name are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Thin client over the auth service endpoints.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: String) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AUTH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(credentials)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        read_json(response).await
    }

    fn me_request(&self, access_token: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/auth/me", self.base_url))
            .bearer_auth(access_token)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    if !response.status().is_success() {
        let (status, message) = upstream::failure(response).await;
        return Err(AuthError::Api { status, message });
    }
    Ok(response.json().await?)
}

/// Shared, in-memory token pair.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<TokenPair>>>,
}

impl TokenStore {
    pub async fn get(&self) -> Option<TokenPair> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, tokens: TokenPair) {
        *self.inner.write().await = Some(tokens);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    /// Clears the store only while it still holds `expected`.
    pub async fn clear_if(&self, expected: &TokenPair) {
        let mut guard = self.inner.write().await;
        if guard.as_ref() == Some(expected) {
            *guard = None;
        }
    }
}

#[derive(Clone)]
pub struct AuthSession {
    client: AuthClient,
    store: TokenStore,
    refresh_lock: Arc<Mutex<()>>,
}

impl AuthSession {
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            store: TokenStore::default(),
            refresh_lock: Arc::default(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.get().await.is_some()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let tokens = self.client.login(credentials).await?;
        self.store.set(tokens).await;
        info!("Auth session established");
        Ok(())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        let tokens = self.client.register(request).await?;
        self.store.set(tokens).await;
        info!("Auth session established for new account");
        Ok(())
    }

    pub async fn logout(&self) {
        self.store.clear().await;
        info!("Auth session cleared");
    }

    pub async fn me(&self) -> Result<UserProfile, AuthError> {
        let response = self.send(|token| self.client.me_request(token)).await?;
        read_json(response).await
    }

    /// Sends a request built with the current access token.
    ///
    /// On 401: one refresh, then one retry with the new token. A failed refresh,
    /// or a retry that is still rejected, clears the session.
    pub async fn send<F>(&self, build: F) -> Result<Response, AuthError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let tokens = self.store.get().await.ok_or(AuthError::NotAuthenticated)?;

        let response = build(&tokens.access_token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let renewed = self.renew(&tokens).await?;
        let retry = build(&renewed.access_token).send().await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!("Request still unauthorized after refresh, clearing session");
            self.store.clear_if(&renewed).await;
            return Err(AuthError::SessionExpired);
        }
        Ok(retry)
    }

    /// Replaces the `rejected` pair. Refreshes are serialized: a caller that waited
    /// on another request's refresh reuses its result instead of spending the
    /// refresh token again.
    async fn renew(&self, rejected: &TokenPair) -> Result<TokenPair, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        match self.store.get().await {
            None => return Err(AuthError::SessionExpired),
            Some(current) if current != *rejected => {
                debug!("Session already renewed by a concurrent request");
                return Ok(current);
            }
            Some(_) => {}
        }

        debug!("Access token rejected, refreshing session");
        match self.client.refresh(&rejected.refresh_token).await {
            Ok(pair) => {
                self.store.set(pair.clone()).await;
                Ok(pair)
            }
            Err(e) => {
                warn!("Token refresh failed, clearing session: {e}");
                self.store.clear_if(rejected).await;
                Err(AuthError::SessionExpired)
            }
        }
    }
}

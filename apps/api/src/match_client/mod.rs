//! Match API Client: the only module that talks to the résumé/job matching service.
//!
//! `POST {base}/match` takes the two documents as multipart files plus the model
//! name; `GET {base}/health` reports liveness. Calls are not retried. When an auth
//! session is configured and logged in, requests go through it and pick up the
//! bearer token and the single refresh-and-retry on 401.
//!
//! `AppState` holds the client as `Arc<dyn MatchAnalyzer>` so handlers can be
//! tested against a stub.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{AuthError, AuthSession};
use crate::upstream;

pub use types::{MatchResult, UpstreamHealth};

#[derive(Debug, Error)]
pub enum MatchApiError {
    #[error("Match API request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Match API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not parse match API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<reqwest::Error> for MatchApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MatchApiError::Timeout
        } else {
            MatchApiError::Http(err)
        }
    }
}

impl MatchApiError {
    /// HTTP status reported by the upstream, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            MatchApiError::Api { status, .. } => Some(*status),
            MatchApiError::Http(e) => e.status().map(|s| s.as_u16()),
            MatchApiError::Auth(AuthError::Api { status, .. }) => Some(*status),
            MatchApiError::Auth(AuthError::SessionExpired | AuthError::NotAuthenticated) => {
                Some(401)
            }
            _ => None,
        }
    }
}

/// An uploaded document on its way to the match API.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FilePayload {
    /// Multipart parts are single-use, so one is built per attempt.
    fn part(&self) -> Part {
        let bare = || Part::bytes(self.data.to_vec()).file_name(self.file_name.clone());
        match self.content_type.as_deref() {
            Some(mime) => bare().mime_str(mime).unwrap_or_else(|_| bare()),
            None => bare(),
        }
    }
}

#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume: FilePayload,
        job_description: FilePayload,
        model: &str,
    ) -> Result<MatchResult, MatchApiError>;

    async fn health(&self) -> Result<UpstreamHealth, MatchApiError>;
}

#[derive(Clone)]
pub struct MatchApiClient {
    client: Client,
    base_url: String,
    session: Option<AuthSession>,
}

impl MatchApiClient {
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        session: Option<AuthSession>,
    ) -> Result<Self, MatchApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    async fn dispatch<F>(&self, build: F) -> Result<Response, MatchApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        if let Some(session) = &self.session {
            if session.is_authenticated().await {
                return Ok(session.send(|token| build().bearer_auth(token)).await?);
            }
        }
        Ok(build().send().await?)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, MatchApiError> {
    if !response.status().is_success() {
        let (status, message) = upstream::failure(response).await;
        return Err(MatchApiError::Api { status, message });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl MatchAnalyzer for MatchApiClient {
    async fn analyze(
        &self,
        resume: FilePayload,
        job_description: FilePayload,
        model: &str,
    ) -> Result<MatchResult, MatchApiError> {
        info!(
            "Requesting match analysis: resume={} ({} bytes), job_description={} ({} bytes), model={}",
            resume.file_name,
            resume.data.len(),
            job_description.file_name,
            job_description.data.len(),
            model
        );

        let url = format!("{}/match", self.base_url);
        let response = self
            .dispatch(|| {
                let form = Form::new()
                    .part("resume", resume.part())
                    .part("job_description", job_description.part())
                    .text("model", model.to_string());
                self.client.post(&url).multipart(form)
            })
            .await?;

        let result: MatchResult = read_json(response).await?;
        debug!("Match analysis succeeded: score={}", result.score);
        Ok(result)
    }

    async fn health(&self) -> Result<UpstreamHealth, MatchApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self.dispatch(|| self.client.get(&url)).await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthClient, TokenPair};
    use crate::test_support::spawn_upstream;
    use axum::{
        extract::Multipart,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn file(name: &str, content_type: &str, text: &str) -> FilePayload {
        FilePayload {
            file_name: name.to_string(),
            content_type: Some(content_type.to_string()),
            data: Bytes::from(text.to_string()),
        }
    }

    /// Echoes back what it received as the `rationale`, one `name=filename:len` per part.
    async fn echo_match(mut multipart: Multipart) -> Json<Value> {
        let mut seen = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.unwrap();
            match file_name {
                Some(f) => seen.push(format!("{name}={f}:{}", data.len())),
                None => seen.push(format!("{name}={}", String::from_utf8_lossy(&data))),
            }
        }
        Json(json!({
            "score": 81,
            "rationale": seen.join(";"),
            "structured_resume": { "name": "Jane Doe" }
        }))
    }

    #[tokio::test]
    async fn test_analyze_sends_multipart_parts() {
        let base = spawn_upstream(Router::new().route("/match", post(echo_match))).await;
        let client = MatchApiClient::new(base, 10, None).unwrap();

        let result = client
            .analyze(
                file("cv.pdf", "application/pdf", "%PDF-1.4"),
                file("jd.txt", "text/plain", "Senior Go engineer"),
                "gpt-4o-mini",
            )
            .await
            .unwrap();

        assert_eq!(result.score, 81.0);
        assert_eq!(
            result.rationale,
            "resume=cv.pdf:8;job_description=jd.txt:18;model=gpt-4o-mini"
        );
        assert_eq!(result.structured_resume.direct.name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_message() {
        let app = Router::new().route(
            "/match",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": "Unsupported file type" })),
                )
            }),
        );
        let client = MatchApiClient::new(spawn_upstream(app).await, 10, None).unwrap();

        let err = client
            .analyze(file("cv.exe", "application/octet-stream", "MZ"), file("jd.txt", "text/plain", "x"), "m")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_parse_error() {
        let app = Router::new().route("/match", post(|| async { "<html>gateway</html>" }));
        let client = MatchApiClient::new(spawn_upstream(app).await, 10, None).unwrap();

        let err = client
            .analyze(file("a.txt", "text/plain", "a"), file("b.txt", "text/plain", "b"), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, MatchApiError::Parse(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let app = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "status": "ok" }))
            }),
        );
        let client = MatchApiClient::new(spawn_upstream(app).await, 1, None).unwrap();
        assert!(matches!(client.health().await, Err(MatchApiError::Timeout)));
    }

    #[tokio::test]
    async fn test_health_parses_status() {
        let app = Router::new().route(
            "/health",
            get(|| async { Json(json!({ "status": "ok", "timestamp": "2026-01-01T00:00:00Z" })) }),
        );
        let client = MatchApiClient::new(spawn_upstream(app).await, 10, None).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.timestamp, "2026-01-01T00:00:00Z");
    }

    /// One fake upstream serving both the auth endpoints and a token-guarded `/match`.
    fn guarded_upstream(match_calls: Arc<AtomicUsize>, refresh_ok: bool) -> Router {
        Router::new()
            .route(
                "/auth/refresh",
                post(move || async move {
                    if refresh_ok {
                        (StatusCode::OK, Json(json!({ "access_token": "new", "refresh_token": "r2" })))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "refresh expired" })))
                    }
                }),
            )
            .route(
                "/match",
                post(move |headers: HeaderMap| {
                    let match_calls = match_calls.clone();
                    async move {
                        match_calls.fetch_add(1, Ordering::SeqCst);
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        if auth == "Bearer new" {
                            (StatusCode::OK, Json(json!({ "score": 90 })))
                        } else {
                            (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "token expired" })))
                        }
                    }
                }),
            )
    }

    async fn authed_client(base: String) -> (MatchApiClient, AuthSession) {
        let session = AuthSession::new(AuthClient::new(base.clone()).unwrap());
        session
            .store()
            .set(TokenPair {
                access_token: "old".into(),
                refresh_token: "r1".into(),
            })
            .await;
        (MatchApiClient::new(base, 10, Some(session.clone())).unwrap(), session)
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(guarded_upstream(calls.clone(), true)).await;
        let (client, session) = authed_client(base).await;

        let result = client
            .analyze(file("a.txt", "text/plain", "a"), file("b.txt", "text/plain", "b"), "m")
            .await
            .unwrap();

        assert_eq!(result.score, 90.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.store().get().await.unwrap().access_token, "new");
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_tokens_and_reports_expiry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(guarded_upstream(calls.clone(), false)).await;
        let (client, session) = authed_client(base).await;

        let err = client
            .analyze(file("a.txt", "text/plain", "a"), file("b.txt", "text/plain", "b"), "m")
            .await
            .unwrap_err();

        assert!(matches!(err, MatchApiError::Auth(AuthError::SessionExpired)));
        assert_eq!(err.status(), Some(401));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated().await);
    }
}

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::analysis::fallback::fallback_result;
use crate::errors::AppError;
use crate::match_client::{FilePayload, MatchResult, UpstreamHealth};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub result: MatchResult,
    /// True when `result` is the static demo result.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FallbackReason>,
}

#[derive(Debug, Serialize)]
pub struct FallbackReason {
    pub message: String,
    pub status: Option<u16>,
}

struct AnalysisUpload {
    resume: FilePayload,
    job_description: FilePayload,
    model: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<AnalysisUpload, AppError> {
    let mut resume = None;
    let mut job_description = None;
    let mut model = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" | "job_description" => {
                let payload = FilePayload {
                    file_name: field.file_name().unwrap_or(name.as_str()).to_string(),
                    content_type: field.content_type().map(str::to_string),
                    data: field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Could not read '{name}': {e}")))?,
                };
                if payload.data.is_empty() {
                    return Err(AppError::Validation(format!("'{name}' is empty")));
                }
                if name == "resume" {
                    resume = Some(payload);
                } else {
                    job_description = Some(payload);
                }
            }
            "model" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read 'model': {e}")))?;
                model = Some(text.trim().to_string()).filter(|m| !m.is_empty());
            }
            _ => {}
        }
    }

    Ok(AnalysisUpload {
        resume: resume.ok_or_else(|| AppError::Validation("Missing 'resume' file".into()))?,
        job_description: job_description
            .ok_or_else(|| AppError::Validation("Missing 'job_description' file".into()))?,
        model,
    })
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let model = upload
        .model
        .unwrap_or_else(|| state.config.match_model.clone());

    let response = match state
        .matcher
        .analyze(upload.resume, upload.job_description, &model)
        .await
    {
        Ok(result) => AnalysisResponse {
            result,
            fallback: false,
            error: None,
        },
        Err(e) => {
            warn!("Match analysis failed, serving fallback result: {e}");
            AnalysisResponse {
                result: fallback_result(),
                fallback: true,
                error: Some(FallbackReason {
                    status: e.status(),
                    message: e.to_string(),
                }),
            }
        }
    };

    Ok(Json(response))
}

/// GET /api/v1/analyze/health
pub async fn handle_analyze_health(
    State(state): State<AppState>,
) -> Result<Json<UpstreamHealth>, AppError> {
    let health = state
        .matcher
        .health()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    Ok(Json(health))
}

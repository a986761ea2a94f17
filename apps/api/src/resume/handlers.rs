use axum::{
    extract::Query,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::resume::contact::{resolve_contact, ContactField};
use crate::resume::model::{lenient_resume, StructuredResume};
use crate::resume::template::{compose, template_ids, DEFAULT_TEMPLATE_ID};

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<&'static str>,
}

#[derive(Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_resume")]
    pub structured_resume: StructuredResume,
}

#[derive(Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub download: bool,
}

/// GET /api/v1/resume/templates
pub async fn handle_list_templates() -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: template_ids(),
    })
}

/// POST /api/v1/resume/render
pub async fn handle_render(
    Query(query): Query<RenderQuery>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let template_id = req
        .template_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE_ID);

    let document = compose(template_id, &req.structured_resume);
    if document.is_empty() {
        return Err(AppError::UnknownTemplate(template_id.to_string()));
    }
    info!("Rendered CV with template '{template_id}' ({} bytes)", document.len());

    if !query.download {
        return Ok(Html(document).into_response());
    }

    let name = resolve_contact(&req.structured_resume, ContactField::Name);
    let disposition = format!(
        "attachment; filename=\"{}-resume.html\"",
        file_slug(&name, "cv")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

/// Lowercase ASCII slug for download file names; `fallback` when nothing usable remains.
fn file_slug(name: &str, fallback: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '_' | '.') {
            if !last_dash && !slug.is_empty() {
                slug.push('-');
                last_dash = true;
            }
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug.to_string()
    }
}

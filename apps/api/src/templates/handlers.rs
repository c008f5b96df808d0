use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::models::{Field, StoredTemplate, Template};
use crate::state::AppState;
use crate::templates::require_template;
use crate::templates::share::share_url;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub template_id: Uuid,
    pub url: String,
}

/// Read-only view of a shared survey. An unknown id is a presentation of
/// its own, not an error envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublicSurveyView {
    Found { template_id: Uuid, fields: Vec<Field> },
    NotFound { message: String },
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let templates = state.store.list().await?;
    Ok(Json(TemplateListResponse { templates }))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Template>, AppError> {
    Ok(Json(require_template(state.store.as_ref(), id).await?))
}

/// GET /api/v1/templates/:id/export
///
/// The template in the legacy `{uuid, data}` shape used by fixture files.
pub async fn handle_export_template(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<StoredTemplate>, AppError> {
    let template = require_template(state.store.as_ref(), id).await?;
    Ok(Json(StoredTemplate::from(&template)))
}

/// GET /api/v1/templates/:id/share
pub async fn handle_share_template(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ShareResponse>, AppError> {
    let template = require_template(state.store.as_ref(), id).await?;
    Ok(Json(ShareResponse {
        template_id: template.id,
        url: share_url(&state.config.public_base_url, template.id),
    }))
}

/// GET /api/v1/surveys/:id
pub async fn handle_public_survey(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let response = match state.store.get(id).await? {
        Some(template) => Json(PublicSurveyView::Found {
            template_id: template.id,
            fields: template.fields,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(PublicSurveyView::NotFound {
                message: "Survey Not Found".to_string(),
            }),
        )
            .into_response(),
    };
    Ok(response)
}

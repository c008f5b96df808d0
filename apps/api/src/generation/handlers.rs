//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::generation::generator::validate_prompt;
use crate::models::Field;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub fields: Vec<Field>,
}

/// POST /api/v1/generate
///
/// Stateless generation: returns fields with fresh ids, touches no session.
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = validate_prompt(&request.prompt)?;
    let fields = state.generator.generate(prompt).await?;
    Ok(Json(GenerateResponse { fields }))
}

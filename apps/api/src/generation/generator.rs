//! Survey Generation: turns a free-text prompt into a list of fields.
//!
//! Pluggable, trait-based: `AppState` holds an `Arc<dyn FieldGenerator>`.
//! Default: `LlmFieldGenerator` (one Gemini call per prompt, no retries).
//!
//! The generator either returns a fully-typed list with fresh ids or fails
//! with `GenerationFailed`; it never hands back a partial list.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompts::{survey_prompt, survey_response_schema, survey_system};
use crate::llm_client::LlmClient;
use crate::models::{Field, FieldType, WireField};

pub const MIN_FIELDS: usize = 3;
pub const MAX_FIELDS: usize = 5;

/// Implement this to swap generation backends without touching handlers
/// or the editor.
#[async_trait]
pub trait FieldGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<Field>, AppError>;
}

/// Generates fields through the LLM client.
pub struct LlmFieldGenerator {
    llm: LlmClient,
    schema: Value,
}

impl LlmFieldGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            schema: survey_response_schema(),
        }
    }
}

#[async_trait]
impl FieldGenerator for LlmFieldGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<Field>, AppError> {
        let prompt = validate_prompt(prompt)?;

        let wire: Vec<WireField> = self
            .llm
            .call_json(&survey_prompt(prompt), &survey_system(), Some(&self.schema))
            .await
            .map_err(|e| AppError::GenerationFailed(format!("Survey generation failed: {e}")))?;

        let fields = assign_ids(wire);
        check_generated(&fields)?;

        info!("Generated {} survey fields", fields.len());
        Ok(fields)
    }
}

/// Rejects empty or whitespace-only prompts and returns the trimmed text.
pub fn validate_prompt(prompt: &str) -> Result<&str, AppError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Converts the service's reply into fields, each with a fresh id.
/// Ids supplied by the service are never trusted.
pub fn assign_ids(wire: Vec<WireField>) -> Vec<Field> {
    wire.into_iter()
        .map(|w| w.into_field(Uuid::new_v4()))
        .collect()
}

/// 3–5 fields, at least one Rating, ids unique.
pub fn check_generated(fields: &[Field]) -> Result<(), AppError> {
    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
        return Err(AppError::GenerationFailed(format!(
            "expected {MIN_FIELDS} to {MAX_FIELDS} fields, got {}",
            fields.len()
        )));
    }
    if !fields.iter().any(|f| f.field_type() == FieldType::Rating) {
        return Err(AppError::GenerationFailed(
            "reply did not include a rating field".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if !fields.iter().all(|f| seen.insert(f.id)) {
        return Err(AppError::GenerationFailed(
            "duplicate field ids in reply".to_string(),
        ));
    }
    Ok(())
}

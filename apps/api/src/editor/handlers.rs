//! Axum route handlers for editor sessions.
//!
//! Every mutating endpoint answers with the session's snapshot so a client
//! can re-render from a single response.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editor::{run_generation, EditorSnapshot, SaveOutcome};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::generation::handlers::GenerateRequest;
use crate::models::{Field, FieldKind};
use crate::state::AppState;
use crate::templates::require_template;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub editor: EditorSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct LoadTemplateRequest {
    pub template_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub source: Uuid,
    pub destination: Uuid,
}

/// `{"field_type": "number"}`; attributes in the body are ignored.
#[derive(Debug, Deserialize)]
pub struct RetypeRequest {
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Serialize)]
pub struct AddFieldResponse {
    pub field_id: Uuid,
    pub editor: EditorSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub field_id: Uuid,
    pub expanded: bool,
    pub editor: EditorSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub template_id: Uuid,
    pub outcome: SaveOutcome,
    pub editor: EditorSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/editor/sessions
pub async fn handle_open_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, editor) = state.sessions.open().await;
    let editor = editor.lock().await.snapshot();
    (
        StatusCode::CREATED,
        Json(SessionResponse { session_id, editor }),
    )
}

/// GET /api/v1/editor/sessions/:sid
pub async fn handle_get_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let editor = editor.lock().await.snapshot();
    Ok(Json(SessionResponse { session_id, editor }))
}

/// DELETE /api/v1/editor/sessions/:sid
pub async fn handle_close_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/editor/sessions/:sid/generate
///
/// 409 while a generation for this session is still running.
pub async fn handle_session_generate(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<GenerateRequest>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let snapshot = run_generation(editor, state.generator.clone(), &request.prompt).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/editor/sessions/:sid/load
pub async fn handle_load_template(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<LoadTemplateRequest>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let template = require_template(state.store.as_ref(), request.template_id).await?;
    let mut editor = editor.lock().await;
    editor.load_from_template(&template);
    Ok(Json(editor.snapshot()))
}

/// POST /api/v1/editor/sessions/:sid/fields
pub async fn handle_add_field(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<(StatusCode, Json<AddFieldResponse>), AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    let field_id = editor.add_field();
    Ok((
        StatusCode::CREATED,
        Json(AddFieldResponse {
            field_id,
            editor: editor.snapshot(),
        }),
    ))
}

/// PUT /api/v1/editor/sessions/:sid/fields/:fid
///
/// The body is a complete field; unknown field ids leave the editor as is.
pub async fn handle_edit_field(
    State(state): State<AppState>,
    AppPath((session_id, field_id)): AppPath<(Uuid, Uuid)>,
    AppJson(field): AppJson<Field>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    editor.edit_field(field_id, field);
    Ok(Json(editor.snapshot()))
}

/// POST /api/v1/editor/sessions/:sid/fields/:fid/type
pub async fn handle_retype_field(
    State(state): State<AppState>,
    AppPath((session_id, field_id)): AppPath<(Uuid, Uuid)>,
    AppJson(request): AppJson<RetypeRequest>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    editor.retype_field(field_id, request.kind.field_type());
    Ok(Json(editor.snapshot()))
}

/// DELETE /api/v1/editor/sessions/:sid/fields/:fid
pub async fn handle_delete_field(
    State(state): State<AppState>,
    AppPath((session_id, field_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    editor.delete_field(field_id);
    Ok(Json(editor.snapshot()))
}

/// POST /api/v1/editor/sessions/:sid/fields/:fid/toggle
pub async fn handle_toggle_field(
    State(state): State<AppState>,
    AppPath((session_id, field_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    let expanded = editor.toggle_expansion(field_id);
    Ok(Json(ToggleResponse {
        field_id,
        expanded,
        editor: editor.snapshot(),
    }))
}

/// POST /api/v1/editor/sessions/:sid/reorder
pub async fn handle_reorder(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<ReorderRequest>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    editor.reorder(request.source, request.destination);
    Ok(Json(editor.snapshot()))
}

/// POST /api/v1/editor/sessions/:sid/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<Json<EditorSnapshot>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    editor.reset();
    Ok(Json(editor.snapshot()))
}

/// POST /api/v1/editor/sessions/:sid/save
pub async fn handle_save(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<Json<SaveResponse>, AppError> {
    let editor = state.sessions.get(session_id).await?;
    let mut editor = editor.lock().await;
    let receipt = editor.save(state.store.as_ref()).await?;
    Ok(Json(SaveResponse {
        template_id: receipt.template_id,
        outcome: receipt.outcome,
        editor: editor.snapshot(),
    }))
}

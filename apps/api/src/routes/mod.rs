pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::editor::handlers as editor;
use crate::generation::handlers as generation;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/v1/generate", post(generation::handle_generate))
        // Template API
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        .route(
            "/api/v1/templates/:id/export",
            get(templates::handle_export_template),
        )
        .route(
            "/api/v1/templates/:id/share",
            get(templates::handle_share_template),
        )
        .route("/api/v1/surveys/:id", get(templates::handle_public_survey))
        // Editor API
        .route("/api/v1/editor/sessions", post(editor::handle_open_session))
        .route(
            "/api/v1/editor/sessions/:sid",
            get(editor::handle_get_session).delete(editor::handle_close_session),
        )
        .route(
            "/api/v1/editor/sessions/:sid/generate",
            post(editor::handle_session_generate),
        )
        .route(
            "/api/v1/editor/sessions/:sid/load",
            post(editor::handle_load_template),
        )
        .route(
            "/api/v1/editor/sessions/:sid/fields",
            post(editor::handle_add_field),
        )
        .route(
            "/api/v1/editor/sessions/:sid/fields/:fid",
            put(editor::handle_edit_field).delete(editor::handle_delete_field),
        )
        .route(
            "/api/v1/editor/sessions/:sid/fields/:fid/type",
            post(editor::handle_retype_field),
        )
        .route(
            "/api/v1/editor/sessions/:sid/fields/:fid/toggle",
            post(editor::handle_toggle_field),
        )
        .route(
            "/api/v1/editor/sessions/:sid/reorder",
            post(editor::handle_reorder),
        )
        .route("/api/v1/editor/sessions/:sid/reset", post(editor::handle_reset))
        .route("/api/v1/editor/sessions/:sid/save", post(editor::handle_save))
        .with_state(state)
}

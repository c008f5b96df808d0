use std::sync::Arc;

use crate::config::Config;
use crate::editor::sessions::EditorSessions;
use crate::generation::generator::FieldGenerator;
use crate::templates::TemplateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable template backend. Default: InMemoryTemplateStore.
    pub store: Arc<dyn TemplateStore>,
    /// Pluggable generation backend. Default: LlmFieldGenerator.
    pub generator: Arc<dyn FieldGenerator>,
    pub sessions: EditorSessions,
    pub config: Config,
}

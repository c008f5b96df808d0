use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::editor::{SharedEditor, SurveyEditor};
use crate::errors::AppError;

/// Live editor sessions keyed by session id. Each editor has its own mutex,
/// so sessions never block one another.
#[derive(Clone, Default)]
pub struct EditorSessions {
    sessions: Arc<RwLock<HashMap<Uuid, SharedEditor>>>,
}

impl EditorSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self) -> (Uuid, SharedEditor) {
        let id = Uuid::new_v4();
        let editor = Arc::new(Mutex::new(SurveyEditor::new()));
        self.sessions.write().await.insert(id, editor.clone());
        info!("Opened editor session {id}");
        (id, editor)
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedEditor, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))
    }

    pub async fn close(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Closed editor session {id}"))
            .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))
    }
}

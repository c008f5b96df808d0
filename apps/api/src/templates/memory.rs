use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Field, Template};
use crate::templates::TemplateStore;

/// Process-local store backed by a vector, so iteration is insertion order.
#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<Vec<Template>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<Template>) -> Self {
        Self {
            templates: RwLock::new(templates),
        }
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get(&self, id: Uuid) -> Result<Option<Template>, AppError> {
        let templates = self.templates.read().await;
        Ok(templates.iter().find(|t| t.id == id).cloned())
    }

    async fn append(&self, template: Template) -> Result<Uuid, AppError> {
        let mut templates = self.templates.write().await;
        if templates.iter().any(|t| t.id == template.id) {
            return Err(AppError::Validation(format!(
                "Template {} already exists",
                template.id
            )));
        }
        let id = template.id;
        info!("Stored template {id} with {} fields", template.fields.len());
        templates.push(template);
        Ok(id)
    }

    async fn update(&self, id: Uuid, fields: Vec<Field>) -> Result<(), AppError> {
        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::template_not_found(id))?;
        info!("Updated template {id} with {} fields", fields.len());
        template.fields = fields;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Template>, AppError> {
        Ok(self.templates.read().await.clone())
    }
}

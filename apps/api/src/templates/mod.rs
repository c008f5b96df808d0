//! Template Store: named, ordered field lists addressable by id.
//!
//! `AppState` holds an `Arc<dyn TemplateStore>`. The in-memory backend is the
//! only one today; a persistent backend implements the same trait. Nothing
//! here is durable across restarts.
//!
//! Writes carry no version stamps: concurrent saves of the same template are
//! last-writer-wins. Multi-client deployments need optimistic concurrency
//! before this is safe.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Field, Template};

pub mod fixtures;
pub mod handlers;
pub mod memory;
pub mod share;

pub use memory::InMemoryTemplateStore;

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Template>, AppError>;

    /// Inserts a template under the id it carries. Rejects an id that is
    /// already stored.
    async fn append(&self, template: Template) -> Result<Uuid, AppError>;

    /// Replaces the field list of an existing template in place.
    /// Returns `NotFound` when no template has this id.
    async fn update(&self, id: Uuid, fields: Vec<Field>) -> Result<(), AppError>;

    /// All templates in insertion order.
    async fn list(&self) -> Result<Vec<Template>, AppError>;
}

/// `get`, with a missing template turned into `NotFound`.
pub async fn require_template(store: &dyn TemplateStore, id: Uuid) -> Result<Template, AppError> {
    store
        .get(id)
        .await?
        .ok_or_else(|| AppError::template_not_found(id))
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::field::{Field, WireField};

/// A saved, ordered list of fields. Field order is display and fill-out order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub fields: Vec<Field>,
}

impl Template {
    pub fn new(id: Uuid, fields: Vec<Field>) -> Self {
        Self { id, fields }
    }
}

/// Stored template shape that predates the strict field model:
/// `{ "uuid": ..., "data": [WireField, ...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub uuid: Uuid,
    pub data: Vec<WireField>,
}

impl From<StoredTemplate> for Template {
    fn from(stored: StoredTemplate) -> Self {
        let fields = stored
            .data
            .into_iter()
            .map(|wire| {
                let id = wire.id.unwrap_or_else(Uuid::new_v4);
                wire.into_field(id)
            })
            .collect();
        Template::new(stored.uuid, fields)
    }
}

impl From<&Template> for StoredTemplate {
    fn from(template: &Template) -> Self {
        StoredTemplate {
            uuid: template.id,
            data: template.fields.iter().map(WireField::from).collect(),
        }
    }
}

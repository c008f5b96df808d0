use anyhow::{Context, Result};

use crate::models::{StoredTemplate, Template};

/// Demo templates, stored in the legacy wire shape.
const DEMO_TEMPLATES_JSON: &str = include_str!("../../fixtures/templates.json");

pub fn demo_templates() -> Result<Vec<Template>> {
    parse_stored_templates(DEMO_TEMPLATES_JSON).context("Failed to parse bundled demo templates")
}

pub fn parse_stored_templates(json: &str) -> Result<Vec<Template>> {
    let stored: Vec<StoredTemplate> = serde_json::from_str(json)?;
    Ok(stored.into_iter().map(Template::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldKind, FieldType};

    #[test]
    fn test_demo_templates_load() {
        let templates = demo_templates().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(
            templates[0].id.to_string(),
            "49b4fe37-d501-424b-9618-f24ffeb0fd39"
        );
        assert_eq!(templates[0].fields.len(), 4);
        assert_eq!(templates[1].fields.len(), 5);
    }

    #[test]
    fn test_dropdown_fixture_ignores_multi_select_flag() {
        let templates = demo_templates().unwrap();
        let dropdown = &templates[0].fields[0];
        assert_eq!(dropdown.field_type(), FieldType::Dropdown);
        match &dropdown.kind {
            FieldKind::Dropdown { options: Some(options) } => {
                assert_eq!(options.as_slice().len(), 4)
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}

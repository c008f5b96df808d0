//! Survey Editor: the state machine behind one editing session.
//!
//! Owns the in-progress field list, the set of expanded field ids, the id of
//! the template the session is bound to (which decides whether Save creates
//! or updates), and the status of the generation request.
//!
//! Transitions are sequential per session (callers hold the session mutex).
//! Generation is the only suspending operation: the lock is released while
//! the upstream call is outstanding, so field edits keep working, and the
//! `InFlight` status rejects a second generation until the first finishes.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{validate_prompt, FieldGenerator};
use crate::models::{Field, FieldType, Template};
use crate::templates::TemplateStore;

pub mod handlers;
pub mod sessions;

pub type SharedEditor = Arc<Mutex<SurveyEditor>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GenerationStatus {
    Idle,
    InFlight {
        prompt: String,
        started_at: DateTime<Utc>,
    },
}

impl GenerationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GenerationStatus::InFlight { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveReceipt {
    pub template_id: Uuid,
    pub outcome: SaveOutcome,
}

/// Serializable view of the editor.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub fields: Vec<Field>,
    pub expanded: BTreeSet<Uuid>,
    pub bound_template_id: Option<Uuid>,
    pub generation: GenerationStatus,
}

#[derive(Debug, Clone)]
pub struct SurveyEditor {
    fields: Vec<Field>,
    /// May hold ids of deleted fields; renderers ignore them.
    expanded: BTreeSet<Uuid>,
    bound_template_id: Option<Uuid>,
    generation: GenerationStatus,
}

impl Default for SurveyEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyEditor {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            expanded: BTreeSet::new(),
            bound_template_id: None,
            generation: GenerationStatus::Idle,
        }
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            fields: self.fields.clone(),
            expanded: self.expanded.clone(),
            bound_template_id: self.bound_template_id,
            generation: self.generation.clone(),
        }
    }

    /// Replaces the field list with generated fields, all expanded.
    /// The bound template is kept, so a later Save updates it.
    pub fn load_from_generation(&mut self, fields: Vec<Field>) {
        self.expanded = fields.iter().map(|f| f.id).collect();
        self.fields = fields;
    }

    /// Copies a template's fields into the editor and binds to it.
    pub fn load_from_template(&mut self, template: &Template) {
        self.fields = template.fields.clone();
        self.expanded = self.fields.iter().map(|f| f.id).collect();
        self.bound_template_id = Some(template.id);
    }

    /// Appends a blank ShortText field, expanded, and returns its id.
    pub fn add_field(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.fields.push(Field::new(id));
        self.expanded.insert(id);
        id
    }

    /// Replaces the field with this id. The replacement's own id is
    /// overwritten so ids stay stable. Returns false if absent.
    pub fn edit_field(&mut self, id: Uuid, mut replacement: Field) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(slot) => {
                replacement.id = id;
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    /// Changes a field's type, keeping attributes that remain legal.
    pub fn retype_field(&mut self, id: Uuid, field_type: FieldType) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                field.set_field_type(field_type);
                true
            }
            None => false,
        }
    }

    /// Removes the field with this id. Absent ids are a no-op.
    pub fn delete_field(&mut self, id: Uuid) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        self.fields.len() != before
    }

    /// Moves `source` to the current index of `destination`, shifting the
    /// entries in between by one. No-op when either id is absent or both
    /// are the same.
    pub fn reorder(&mut self, source: Uuid, destination: Uuid) -> bool {
        if source == destination {
            return false;
        }
        let from = self.fields.iter().position(|f| f.id == source);
        let to = self.fields.iter().position(|f| f.id == destination);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        true
    }

    /// Flips membership of `id` in the expanded set and returns the new state.
    pub fn toggle_expansion(&mut self, id: Uuid) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    /// Starts over with an empty, unbound editor.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.expanded.clear();
        self.bound_template_id = None;
    }

    /// Updates the bound template, or creates a new one and binds to it.
    pub async fn save(&mut self, store: &dyn TemplateStore) -> Result<SaveReceipt, AppError> {
        match self.bound_template_id {
            Some(id) => {
                store.update(id, self.fields.clone()).await?;
                Ok(SaveReceipt {
                    template_id: id,
                    outcome: SaveOutcome::Updated,
                })
            }
            None => {
                let id = store
                    .append(Template::new(Uuid::new_v4(), self.fields.clone()))
                    .await?;
                self.bound_template_id = Some(id);
                Ok(SaveReceipt {
                    template_id: id,
                    outcome: SaveOutcome::Created,
                })
            }
        }
    }

    /// Marks a generation as in flight. Fails on an empty prompt or while
    /// another generation is outstanding; returns the trimmed prompt.
    pub fn begin_generation(&mut self, prompt: &str) -> Result<String, AppError> {
        let prompt = validate_prompt(prompt)?.to_string();
        if self.generation.is_in_flight() {
            return Err(AppError::GenerationInFlight);
        }
        self.generation = GenerationStatus::InFlight {
            prompt: prompt.clone(),
            started_at: Utc::now(),
        };
        Ok(prompt)
    }

    /// Returns to `Idle` and installs the generated fields. On failure the
    /// field list is left exactly as it was.
    pub fn finish_generation(&mut self, outcome: Result<Vec<Field>, AppError>) -> Result<(), AppError> {
        self.generation = GenerationStatus::Idle;
        let fields = outcome?;
        self.load_from_generation(fields);
        Ok(())
    }
}

#[cfg(test)]
impl SurveyEditor {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    pub fn bound_template_id(&self) -> Option<Uuid> {
        self.bound_template_id
    }

    pub fn generation(&self) -> &GenerationStatus {
        &self.generation
    }
}

/// Runs one generation for a session. The upstream call happens in its own
/// task: dropping the caller does not cancel it, and the session returns to
/// `Idle` from inside that task, even when the generator panics.
pub async fn run_generation(
    editor: SharedEditor,
    generator: Arc<dyn FieldGenerator>,
    prompt: &str,
) -> Result<EditorSnapshot, AppError> {
    let prompt = editor.lock().await.begin_generation(prompt)?;
    info!("Generating survey fields for prompt ({} chars)", prompt.len());

    let task_editor = editor.clone();
    let task = tokio::spawn(async move {
        let call = tokio::spawn(async move { generator.generate(&prompt).await });
        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Generator task ended abnormally: {e}");
                Err(AppError::Internal(anyhow::anyhow!("generator task failed: {e}")))
            }
        };
        let mut editor = task_editor.lock().await;
        editor.finish_generation(outcome)?;
        Ok::<_, AppError>(editor.snapshot())
    });

    match task.await {
        Ok(result) => result,
        Err(e) => {
            warn!("Generation task ended abnormally: {e}");
            editor.lock().await.generation = GenerationStatus::Idle;
            Err(AppError::Internal(anyhow::anyhow!("generation task failed: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tokio::sync::Notify;

    use super::*;
    use crate::generation::generator::scripted::{feedback_reply, ScriptedGenerator};
    use crate::models::field::NumberRange;
    use crate::models::FieldKind;
    use crate::templates::InMemoryTemplateStore;

    fn labelled(labels: &[&str]) -> Vec<Field> {
        labels
            .iter()
            .map(|label| {
                let mut field = Field::new(Uuid::new_v4());
                field.label = label.to_string();
                field
            })
            .collect()
    }

    fn labels(editor: &SurveyEditor) -> Vec<&str> {
        editor.fields().iter().map(|f| f.label.as_str()).collect()
    }

    fn editor_with(labels: &[&str]) -> SurveyEditor {
        let mut editor = SurveyEditor::new();
        editor.load_from_generation(labelled(labels));
        editor
    }

    #[test]
    fn test_add_field_appends_default_and_expands() {
        let mut editor = SurveyEditor::new();
        let first = editor.add_field();
        let second = editor.add_field();
        assert_ne!(first, second);
        assert_eq!(editor.fields().len(), 2);
        assert_eq!(editor.fields()[1], Field::new(second));
        assert!(editor.is_expanded(first) && editor.is_expanded(second));
    }

    #[test]
    fn test_load_from_generation_expands_all_and_keeps_binding() {
        let mut editor = SurveyEditor::new();
        let template = Template::new(Uuid::new_v4(), labelled(&["t"]));
        editor.load_from_template(&template);

        let generated = labelled(&["a", "b", "c"]);
        editor.load_from_generation(generated.clone());
        assert_eq!(editor.fields(), generated.as_slice());
        assert!(generated.iter().all(|f| editor.is_expanded(f.id)));
        assert_eq!(editor.bound_template_id(), Some(template.id));
    }

    #[test]
    fn test_reorder_moves_forward_and_backward() {
        let mut editor = editor_with(&["a", "b", "c", "d"]);
        let ids: Vec<Uuid> = editor.fields().iter().map(|f| f.id).collect();

        assert!(editor.reorder(ids[0], ids[2]));
        assert_eq!(labels(&editor), ["b", "c", "a", "d"]);

        assert!(editor.reorder(ids[3], ids[1]));
        assert_eq!(labels(&editor), ["d", "b", "c", "a"]);
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let mut editor = editor_with(&["a", "b", "c", "d", "e"]);
        let ids: Vec<Uuid> = editor.fields().iter().map(|f| f.id).collect();
        let before: HashSet<Uuid> = ids.iter().copied().collect();

        for (source, destination) in [(0, 4), (3, 1), (2, 2), (4, 0), (1, 3)] {
            editor.reorder(ids[source], ids[destination]);
            let after: HashSet<Uuid> = editor.fields().iter().map(|f| f.id).collect();
            assert_eq!(after, before);
            assert_eq!(editor.fields().len(), ids.len());
        }
    }

    #[test]
    fn test_reorder_noops() {
        let mut editor = editor_with(&["a", "b"]);
        let a = editor.fields()[0].id;
        assert!(!editor.reorder(a, a));
        assert!(!editor.reorder(a, Uuid::new_v4()));
        assert!(!editor.reorder(Uuid::new_v4(), a));
        assert_eq!(labels(&editor), ["a", "b"]);
    }

    #[test]
    fn test_edit_touches_only_target() {
        let mut editor = editor_with(&["a", "b", "c"]);
        let before = editor.fields().to_vec();
        let target = before[1].id;

        let mut replacement = Field::new(Uuid::new_v4());
        replacement.label = "edited".to_string();
        replacement.required = true;
        assert!(editor.edit_field(target, replacement));

        assert_eq!(editor.fields()[0], before[0]);
        assert_eq!(editor.fields()[2], before[2]);
        assert_eq!(editor.fields()[1].id, target);
        assert_eq!(editor.fields()[1].label, "edited");
        assert!(editor.fields()[1].required);
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let mut editor = editor_with(&["a"]);
        let before = editor.fields().to_vec();
        assert!(!editor.edit_field(Uuid::new_v4(), Field::new(Uuid::new_v4())));
        assert_eq!(editor.fields(), before.as_slice());
    }

    #[test]
    fn test_retype_field() {
        let mut editor = SurveyEditor::new();
        let id = editor.add_field();
        assert!(editor.retype_field(id, FieldType::Rating));
        assert_eq!(editor.fields()[0].kind, FieldKind::Rating);
        assert!(!editor.retype_field(Uuid::new_v4(), FieldType::Rating));
    }

    #[test]
    fn test_delete_is_idempotent_and_leaves_expanded() {
        let mut editor = editor_with(&["a", "b"]);
        let a = editor.fields()[0].id;
        assert!(editor.delete_field(a));
        assert!(!editor.delete_field(a));
        assert_eq!(labels(&editor), ["b"]);
        assert!(editor.is_expanded(a));
    }

    #[test]
    fn test_toggle_expansion_flips_membership() {
        let mut editor = editor_with(&["a"]);
        let a = editor.fields()[0].id;
        assert!(!editor.toggle_expansion(a));
        assert!(!editor.is_expanded(a));
        assert!(editor.toggle_expansion(a));
        assert!(editor.is_expanded(a));

        let stranger = Uuid::new_v4();
        assert!(editor.toggle_expansion(stranger));
        assert!(editor.is_expanded(stranger));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut editor = SurveyEditor::new();
        editor.load_from_template(&Template::new(Uuid::new_v4(), labelled(&["a"])));
        editor.reset();
        let snapshot = editor.snapshot();
        assert!(snapshot.fields.is_empty());
        assert!(snapshot.expanded.is_empty());
        assert_eq!(snapshot.bound_template_id, None);
    }

    #[test]
    fn test_load_from_template_copies_by_value() {
        let template = Template::new(Uuid::new_v4(), labelled(&["a", "b"]));
        let mut editor = SurveyEditor::new();
        editor.load_from_template(&template);
        let first = editor.fields()[0].id;
        editor.delete_field(first);
        assert_eq!(template.fields.len(), 2);
    }

    #[tokio::test]
    async fn test_example_scenario_add_edit_reorder_save() {
        let store = InMemoryTemplateStore::new();
        let mut editor = SurveyEditor::new();
        let first = editor.add_field();
        let second = editor.add_field();

        let mut number = Field::new(first);
        number.kind = FieldKind::Number {
            range: Some(NumberRange::new(1.0, 10.0)),
        };
        assert!(editor.edit_field(first, number.clone()));
        assert!(editor.reorder(first, second));

        let receipt = editor.save(&store).await.unwrap();
        assert_eq!(receipt.outcome, SaveOutcome::Created);
        assert_eq!(editor.bound_template_id(), Some(receipt.template_id));

        let stored = store.get(receipt.template_id).await.unwrap().unwrap();
        assert_eq!(stored.fields, vec![Field::new(second), number]);
        assert_eq!(stored.fields, editor.fields());
    }

    #[tokio::test]
    async fn test_save_bound_template_updates_and_is_idempotent() {
        let template = Template::new(Uuid::new_v4(), labelled(&["a", "b"]));
        let store = InMemoryTemplateStore::with_templates(vec![template.clone()]);
        let mut editor = SurveyEditor::new();
        editor.load_from_template(&template);

        let target = editor.fields()[0].id;
        let mut replacement = editor.fields()[0].clone();
        replacement.label = "changed".to_string();
        editor.edit_field(target, replacement);

        let receipt = editor.save(&store).await.unwrap();
        assert_eq!(receipt.outcome, SaveOutcome::Updated);
        assert_eq!(receipt.template_id, template.id);
        let after_first = store.list().await.unwrap();
        assert_eq!(after_first.len(), 1);
        assert_eq!(after_first[0].fields[0].label, "changed");

        editor.save(&store).await.unwrap();
        assert_eq!(store.list().await.unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_save_reports_missing_bound_template() {
        let store = InMemoryTemplateStore::new();
        let mut editor = SurveyEditor::new();
        editor.load_from_template(&Template::new(Uuid::new_v4(), Vec::new()));
        let result = editor.save(&store).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_begin_generation_rejects_empty_prompt_and_duplicates() {
        let mut editor = SurveyEditor::new();
        assert!(matches!(
            editor.begin_generation("  "),
            Err(AppError::Validation(_))
        ));
        assert!(!editor.generation().is_in_flight());

        assert_eq!(editor.begin_generation(" survey ").unwrap(), "survey");
        assert!(matches!(
            editor.begin_generation("again"),
            Err(AppError::GenerationInFlight)
        ));
    }

    #[test]
    fn test_failed_generation_leaves_fields_unchanged() {
        let mut editor = editor_with(&["keep"]);
        let before = editor.fields().to_vec();
        editor.begin_generation("survey").unwrap();
        let result =
            editor.finish_generation(Err(AppError::GenerationFailed("upstream".to_string())));
        assert!(result.is_err());
        assert_eq!(editor.fields(), before.as_slice());
        assert_eq!(editor.generation(), &GenerationStatus::Idle);
    }

    #[tokio::test]
    async fn test_run_generation_installs_fields() {
        let editor: SharedEditor = Arc::new(Mutex::new(SurveyEditor::new()));
        let generator = Arc::new(ScriptedGenerator::replying(feedback_reply()));

        let snapshot = run_generation(editor.clone(), generator.clone(), "feedback")
            .await
            .unwrap();
        assert_eq!(snapshot.fields.len(), 4);
        assert_eq!(snapshot.expanded.len(), 4);
        assert_eq!(snapshot.generation, GenerationStatus::Idle);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_edits_continue_while_generation_in_flight() {
        let editor: SharedEditor = Arc::new(Mutex::new(SurveyEditor::new()));
        let gate = Arc::new(Notify::new());
        let generator: Arc<dyn FieldGenerator> =
            Arc::new(ScriptedGenerator::replying(feedback_reply()).gated(gate.clone()));

        let pending = tokio::spawn(run_generation(
            editor.clone(),
            generator.clone(),
            "feedback",
        ));
        while !editor.lock().await.generation().is_in_flight() {
            tokio::task::yield_now().await;
        }

        let second = run_generation(editor.clone(), generator.clone(), "again").await;
        assert!(matches!(second, Err(AppError::GenerationInFlight)));

        let added = editor.lock().await.add_field();
        assert_eq!(editor.lock().await.fields().len(), 1);

        gate.notify_one();
        let snapshot = pending.await.unwrap().unwrap();
        assert_eq!(snapshot.fields.len(), 4);
        assert!(snapshot.fields.iter().all(|f| f.id != added));
        assert!(!editor.lock().await.generation().is_in_flight());
    }

    #[tokio::test]
    async fn test_generator_panic_after_caller_dropped_returns_to_idle() {
        let editor: SharedEditor = Arc::new(Mutex::new(editor_with(&["keep"])));
        let gate = Arc::new(Notify::new());
        let generator: Arc<dyn FieldGenerator> =
            Arc::new(ScriptedGenerator::panicking().gated(gate.clone()));

        let caller = tokio::spawn(run_generation(
            editor.clone(),
            generator.clone(),
            "feedback",
        ));
        while !editor.lock().await.generation().is_in_flight() {
            tokio::task::yield_now().await;
        }
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        gate.notify_one();
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while editor.lock().await.generation().is_in_flight() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(labels(&*editor.lock().await), ["keep"]);
        let retry = ScriptedGenerator::replying(feedback_reply());
        let snapshot = run_generation(editor.clone(), Arc::new(retry), "again")
            .await
            .unwrap();
        assert_eq!(snapshot.fields.len(), 4);
    }

    #[tokio::test]
    async fn test_generator_panic_is_reported_to_caller() {
        let editor: SharedEditor = Arc::new(Mutex::new(SurveyEditor::new()));
        let generator = Arc::new(ScriptedGenerator::panicking());

        let result = run_generation(editor.clone(), generator, "feedback").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!editor.lock().await.generation().is_in_flight());
    }

    #[tokio::test]
    async fn test_run_generation_failure_keeps_state() {
        let editor: SharedEditor = Arc::new(Mutex::new(editor_with(&["keep"])));
        let generator = Arc::new(ScriptedGenerator::failing("boom"));

        let result = run_generation(editor.clone(), generator, "feedback").await;
        assert!(matches!(result, Err(AppError::GenerationFailed(_))));
        let editor = editor.lock().await;
        assert_eq!(labels(&editor), ["keep"]);
        assert!(!editor.generation().is_in_flight());
    }
}

//! Global task list with its category and tag registries.
//!
//! # Responsibility
//! - Own the global `TaskCollection` and the label registry.
//! - Resolve draft defaults (category selection, pending tags, color).
//! - Write `tasks`, `categories`, `categoryColors` and `tags` through on
//!   every mutation.
//!
//! # Invariants
//! - Category and tag names are unique (exact, case-sensitive match).
//! - Deleting a label never rewrites tasks; lookups fall back to a
//!   default color instead.

use crate::clock::Clock;
use crate::model::task::{Category, Tag, Task, TaskCollection, TaskDraft, TaskId};
use crate::model::validation::{required, ValidationError};
use crate::service::query::TaskQuery;
use crate::service::ServiceResult;
use crate::store::{keys, KvStore};
use log::info;
use std::collections::BTreeMap;

/// Color for categories that are not registered.
pub const FALLBACK_CATEGORY_COLOR: &str = "#ffffff";
/// Color for tags that are not registered.
pub const FALLBACK_TAG_COLOR: &str = "#9e9e9e";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Work", "#6200ea"),
    ("Personal", "#03dac6"),
    ("Study", "#ffc107"),
    ("Shopping", "#e91e63"),
];

const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("Urgente", "#f44336"),
    ("Casi terminado", "#ffeb3b"),
    ("Proyecto A", "#2196f3"),
    ("Compras", "#e91e63"),
];

/// Categories, tags and the selection state of the task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    categories: Vec<String>,
    category_colors: BTreeMap<String, String>,
    tags: Vec<Tag>,
    selected_category: Option<String>,
    draft_tags: Vec<String>,
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::with_labels(
            DEFAULT_CATEGORIES
                .iter()
                .map(|(name, color)| ((*name).to_string(), (*color).to_string()))
                .collect(),
            DEFAULT_TAGS
                .iter()
                .map(|(name, color)| Tag::new(*name, *color))
                .collect(),
        )
    }
}

impl LabelRegistry {
    fn with_labels(categories: Vec<(String, String)>, tags: Vec<Tag>) -> Self {
        let names: Vec<String> = categories.iter().map(|(name, _)| name.clone()).collect();
        Self {
            selected_category: names.first().cloned(),
            categories: names,
            category_colors: categories.into_iter().collect(),
            tags,
            draft_tags: Vec::new(),
        }
    }

    /// Loads stored labels. Categories are taken only when both the name
    /// list and the color map parse; otherwise the defaults apply.
    pub fn load<S: KvStore>(store: &S) -> Self {
        let defaults = Self::default();
        let stored_categories = store.load::<Vec<String>>(keys::CATEGORIES);
        let stored_colors = store.load::<BTreeMap<String, String>>(keys::CATEGORY_COLORS);
        let (categories, category_colors) = match (stored_categories, stored_colors) {
            (Some(names), Some(colors)) => (names, colors),
            _ => (defaults.categories, defaults.category_colors),
        };
        let tags = store.load::<Vec<Tag>>(keys::TAGS).unwrap_or(defaults.tags);

        Self {
            selected_category: categories.first().cloned(),
            categories,
            category_colors,
            tags,
            draft_tags: Vec::new(),
        }
    }

    pub fn save<S: KvStore>(&self, store: &S) -> ServiceResult<()> {
        store.save(keys::CATEGORIES, &self.categories)?;
        store.save(keys::CATEGORY_COLORS, &self.category_colors)?;
        store.save(keys::TAGS, &self.tags)?;
        Ok(())
    }

    pub fn category_names(&self) -> &[String] {
        &self.categories
    }

    /// Categories in display order, paired with their resolved colors.
    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|name| Category {
                name: name.clone(),
                color: self.category_color(name).to_string(),
            })
            .collect()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|category| category == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Inserts a category and makes it the default selection.
    ///
    /// Returns `false` without changes when the name already exists.
    pub fn add_category(&mut self, name: &str, color: &str) -> Result<bool, ValidationError> {
        let name = required("category name", name)?;
        if self.has_category(&name) {
            return Ok(false);
        }
        self.category_colors
            .insert(name.clone(), color.trim().to_string());
        self.categories.push(name.clone());
        self.selected_category = Some(name);
        Ok(true)
    }

    /// Removes a category; the selection moves to the first remaining one
    /// when it pointed at the removed name.
    pub fn delete_category(&mut self, name: &str) -> bool {
        if !self.has_category(name) {
            return false;
        }
        self.categories.retain(|category| category != name);
        self.category_colors.remove(name);
        if self.selected_category.as_deref() == Some(name) {
            self.selected_category = self.categories.first().cloned();
        }
        true
    }

    /// Inserts a tag. Returns `false` without changes when the name exists.
    pub fn add_tag(&mut self, name: &str, color: &str) -> Result<bool, ValidationError> {
        let name = required("tag name", name)?;
        if self.has_tag(&name) {
            return Ok(false);
        }
        self.tags.push(Tag::new(name, color.trim()));
        Ok(true)
    }

    /// Removes a tag from the registry and from the pending draft.
    pub fn delete_tag(&mut self, name: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.name != name);
        self.draft_tags.retain(|tag| tag != name);
        self.tags.len() != before
    }

    pub fn category_color(&self, name: &str) -> &str {
        self.category_colors
            .get(name)
            .map(String::as_str)
            .filter(|color| !color.is_empty())
            .unwrap_or(FALLBACK_CATEGORY_COLOR)
    }

    pub fn tag_color(&self, name: &str) -> &str {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.color.as_str())
            .filter(|color| !color.is_empty())
            .unwrap_or(FALLBACK_TAG_COLOR)
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Changes the default category. Unknown names are ignored.
    pub fn select_category(&mut self, name: &str) -> bool {
        if !self.has_category(name) {
            return false;
        }
        self.selected_category = Some(name.to_string());
        true
    }

    pub fn draft_tags(&self) -> &[String] {
        &self.draft_tags
    }

    /// Adds a registered tag to the pending draft, once.
    pub fn select_draft_tag(&mut self, name: &str) -> bool {
        if !self.has_tag(name) || self.draft_tags.iter().any(|tag| tag == name) {
            return false;
        }
        self.draft_tags.push(name.to_string());
        true
    }

    pub fn remove_draft_tag(&mut self, name: &str) -> bool {
        let before = self.draft_tags.len();
        self.draft_tags.retain(|tag| tag != name);
        self.draft_tags.len() != before
    }

    /// Clears the draft after a task was added.
    fn reset_selection(&mut self) {
        self.draft_tags.clear();
        self.selected_category = self.categories.first().cloned();
    }

    /// Draft tags plus the pending selection, registered names only.
    fn resolve_tags(&self, requested: &[String]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        for name in requested.iter().chain(self.draft_tags.iter()) {
            if self.has_tag(name) && !resolved.contains(name) {
                resolved.push(name.clone());
            }
        }
        resolved
    }
}

/// Global task list manager.
pub struct TaskListManager<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    tasks: TaskCollection,
    labels: LabelRegistry,
}

impl<S: KvStore, C: Clock> TaskListManager<S, C> {
    pub fn open(store: S, clock: C) -> Self {
        let tasks: TaskCollection = store.load_or(keys::TASKS, TaskCollection::new());
        let labels = LabelRegistry::load(&store);
        info!(
            "event=task_load module=task status=ok count={} categories={} tags={}",
            tasks.len(),
            labels.category_names().len(),
            labels.tags().len()
        );
        Self {
            store,
            clock,
            tasks,
            labels,
        }
    }

    pub fn list(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn search(&self, query: &TaskQuery) -> Vec<&Task> {
        self.tasks.iter().filter(|task| query.matches(task)).collect()
    }

    pub fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    /// Creates a task from form input.
    ///
    /// The category falls back to the current selection; tags are the
    /// draft's plus the pending selection, limited to registered tags; the
    /// task color is the category color at creation time. The selection is
    /// reset afterwards.
    ///
    /// # Errors
    /// - `Validation` when the text is blank or no category can be resolved.
    pub fn add(&mut self, draft: TaskDraft) -> ServiceResult<Task> {
        let text = required("task text", &draft.text)?;
        let category = draft
            .category
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.labels.selected_category().map(str::to_string))
            .ok_or(ValidationError::MissingCategory)?;

        let task = Task {
            id: self.tasks.next_id(self.clock.now()),
            text,
            date: non_blank(draft.date),
            start_time: non_blank(draft.start_time),
            end_time: non_blank(draft.end_time),
            tags: self.labels.resolve_tags(&draft.tags),
            completed: false,
            color: self.labels.category_color(&category).to_string(),
            category: Some(category),
        };

        self.tasks.push(task.clone());
        self.labels.reset_selection();
        self.persist()?;
        info!(
            "event=task_create module=task status=ok id={} tags={}",
            task.id,
            task.tags.len()
        );
        Ok(task)
    }

    /// Replaces a task by id. Returns `Ok(false)` when it is gone.
    ///
    /// # Errors
    /// - `Validation` when the text is blank.
    pub fn update(&mut self, mut task: Task) -> ServiceResult<bool> {
        task.text = required("task text", &task.text)?;
        let id = task.id;
        if !self.tasks.update(task) {
            return Ok(false);
        }
        self.persist()?;
        info!("event=task_update module=task status=ok id={}", id);
        Ok(true)
    }

    pub fn delete(&mut self, id: TaskId) -> ServiceResult<bool> {
        if !self.tasks.delete(id) {
            return Ok(false);
        }
        self.persist()?;
        info!("event=task_delete module=task status=ok id={}", id);
        Ok(true)
    }

    /// Flips completion; returns the new value or `None` when absent.
    pub fn toggle_completed(&mut self, id: TaskId) -> ServiceResult<Option<bool>> {
        let Some(completed) = self.tasks.toggle_completed(id) else {
            return Ok(None);
        };
        self.persist()?;
        info!(
            "event=task_toggle module=task status=ok id={} completed={}",
            id, completed
        );
        Ok(Some(completed))
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> ServiceResult<bool> {
        let added = self.labels.add_category(name, color)?;
        if added {
            self.persist()?;
            info!("event=category_create module=task status=ok");
        }
        Ok(added)
    }

    pub fn delete_category(&mut self, name: &str) -> ServiceResult<bool> {
        let removed = self.labels.delete_category(name);
        if removed {
            self.persist()?;
            info!("event=category_delete module=task status=ok");
        }
        Ok(removed)
    }

    pub fn add_tag(&mut self, name: &str, color: &str) -> ServiceResult<bool> {
        let added = self.labels.add_tag(name, color)?;
        if added {
            self.persist()?;
            info!("event=tag_create module=task status=ok");
        }
        Ok(added)
    }

    pub fn delete_tag(&mut self, name: &str) -> ServiceResult<bool> {
        let removed = self.labels.delete_tag(name);
        if removed {
            self.persist()?;
            info!("event=tag_delete module=task status=ok");
        }
        Ok(removed)
    }

    pub fn select_category(&mut self, name: &str) -> bool {
        self.labels.select_category(name)
    }

    pub fn select_draft_tag(&mut self, name: &str) -> bool {
        self.labels.select_draft_tag(name)
    }

    pub fn remove_draft_tag(&mut self, name: &str) -> bool {
        self.labels.remove_draft_tag(name)
    }

    pub fn category_color(&self, name: &str) -> &str {
        self.labels.category_color(name)
    }

    pub fn tag_color(&self, name: &str) -> &str {
        self.labels.tag_color(name)
    }

    fn persist(&self) -> ServiceResult<()> {
        self.store.save(keys::TASKS, &self.tasks)?;
        self.labels.save(&self.store)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{LabelRegistry, TaskListManager, FALLBACK_CATEGORY_COLOR, FALLBACK_TAG_COLOR};
    use crate::clock::FixedClock;
    use crate::model::task::TaskDraft;
    use crate::model::validation::ValidationError;
    use crate::service::ServiceError;
    use crate::store::{keys, KvStore, MemoryKvStore};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn defaults_apply_when_nothing_is_stored() {
        let labels = LabelRegistry::load(&MemoryKvStore::new());
        assert_eq!(labels.category_names(), ["Work", "Personal", "Study", "Shopping"]);
        assert_eq!(labels.selected_category(), Some("Work"));
        assert_eq!(labels.tags().len(), 4);
        assert_eq!(labels.tag_color("Urgente"), "#f44336");
        assert_eq!(labels.tag_color("Casi terminado"), "#ffeb3b");
        assert_eq!(labels.tag_color("Compras"), "#e91e63");
    }

    #[test]
    fn categories_need_both_documents() {
        let store = MemoryKvStore::new();
        store.save(keys::CATEGORIES, &["Errands"]).unwrap();
        let labels = LabelRegistry::load(&store);
        assert_eq!(labels.category_names()[0], "Work");

        store
            .set_raw(keys::CATEGORY_COLORS, r##"{"Errands":"#010101"}"##)
            .unwrap();
        let labels = LabelRegistry::load(&store);
        assert_eq!(labels.category_names(), ["Errands"]);
        assert_eq!(labels.category_color("Errands"), "#010101");
    }

    #[test]
    fn duplicate_labels_are_ignored_and_blank_ones_rejected() {
        let mut labels = LabelRegistry::default();
        assert!(!labels.add_category("Work", "#000000").unwrap());
        assert_eq!(labels.category_color("Work"), "#6200ea");
        assert!(labels.add_category("work", "#000000").unwrap());
        assert_eq!(labels.selected_category(), Some("work"));
        assert_eq!(
            labels.add_tag("  ", "#000000").unwrap_err(),
            ValidationError::Blank("tag name")
        );
    }

    #[test]
    fn deleting_selected_category_moves_selection() {
        let mut labels = LabelRegistry::default();
        labels.add_category("Errands", "#010101").unwrap();
        assert!(labels.delete_category("Errands"));
        assert_eq!(labels.selected_category(), Some("Work"));
        assert_eq!(labels.category_color("Errands"), FALLBACK_CATEGORY_COLOR);
        assert!(!labels.delete_category("Errands"));
    }

    #[test]
    fn deleting_unregistered_category_keeps_stray_colors() {
        let store = MemoryKvStore::new();
        store.save(keys::CATEGORIES, &["Work"]).unwrap();
        store
            .set_raw(keys::CATEGORY_COLORS, r##"{"Work":"#6200ea","Ghost":"#000000"}"##)
            .unwrap();
        let mut manager = TaskListManager::open(&store, clock());

        assert!(!manager.delete_category("Ghost").unwrap());
        assert_eq!(manager.category_color("Ghost"), "#000000");
        let stored: std::collections::BTreeMap<String, String> =
            store.load(keys::CATEGORY_COLORS).unwrap();
        assert_eq!(stored.get("Ghost").map(String::as_str), Some("#000000"));
    }

    #[test]
    fn deleting_tag_prunes_the_draft() {
        let mut labels = LabelRegistry::default();
        assert!(labels.select_draft_tag("Urgente"));
        assert!(!labels.select_draft_tag("Urgente"));
        assert!(!labels.select_draft_tag("Unknown"));
        assert!(labels.delete_tag("Urgente"));
        assert!(labels.draft_tags().is_empty());
        assert_eq!(labels.tag_color("Urgente"), FALLBACK_TAG_COLOR);
    }

    #[test]
    fn add_resolves_category_tags_and_color() {
        let store = MemoryKvStore::new();
        let mut manager = TaskListManager::open(&store, clock());
        manager.select_category("Study");
        manager.select_draft_tag("Urgente");

        let task = manager
            .add(TaskDraft::new("  Revise  ").with_tag("Proyecto A").with_tag("Nope"))
            .unwrap();
        assert_eq!(task.text, "Revise");
        assert_eq!(task.category.as_deref(), Some("Study"));
        assert_eq!(task.color, "#ffc107");
        assert_eq!(task.tags, vec!["Proyecto A", "Urgente"]);
        assert!(manager.labels().draft_tags().is_empty());
        assert_eq!(manager.labels().selected_category(), Some("Work"));
    }

    #[test]
    fn add_without_any_category_is_rejected() {
        let store = MemoryKvStore::new();
        store.save(keys::CATEGORIES, &Vec::<String>::new()).unwrap();
        store.set_raw(keys::CATEGORY_COLORS, "{}").unwrap();
        let mut manager = TaskListManager::open(&store, clock());

        let err = manager.add(TaskDraft::new("orphan")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingCategory)
        ));
        assert!(manager.list().is_empty());
    }

    #[test]
    fn update_rejects_blank_text_and_ignores_unknown_ids() {
        let store = MemoryKvStore::new();
        let mut manager = TaskListManager::open(&store, clock());
        let mut task = manager.add(TaskDraft::new("Draft")).unwrap();

        task.text = " ".to_string();
        assert!(manager.update(task.clone()).is_err());
        assert_eq!(manager.get(task.id).unwrap().text, "Draft");

        task.id += 1000;
        task.text = "ghost".to_string();
        assert!(!manager.update(task).unwrap());
    }
}

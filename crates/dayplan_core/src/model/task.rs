//! Task records, labels and the owned task collection.
//!
//! # Invariants
//! - Task ids are unique inside one `TaskCollection`.
//! - `Task::tags` holds tag names without duplicates, in selection order.
//! - Category and tag references are plain names; they are not
//!   cascade-validated against the label registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = i64;

/// Category label with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

/// Tag label with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tag_names")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub color: String,
}

impl Task {
    /// Bare, uncategorized task as created from a project page.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            date: None,
            start_time: None,
            end_time: None,
            category: None,
            tags: Vec::new(),
            completed: false,
            color: String::new(),
        }
    }

    /// Parses `date` as `YYYY-MM-DD`; unparseable dates are unscheduled.
    pub fn scheduled_on(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag == name)
    }
}

/// Stored tags are either bare names or legacy `{name, color}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTag {
    Name(String),
    Object { name: String },
}

fn deserialize_tag_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<Vec<StoredTag>>::deserialize(deserializer)?.unwrap_or_default();
    let mut names: Vec<String> = Vec::with_capacity(stored.len());
    for tag in stored {
        let name = match tag {
            StoredTag::Name(name) | StoredTag::Object { name } => name,
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Form input for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// `None` picks the registry's current default category.
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn scheduled(
        mut self,
        date: impl Into<String>,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> Self {
        self.date = Some(date.into());
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }
}

/// Ordered task list owned by one scope (the global list or one project).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Id for the next task created at `now`.
    pub fn next_id(&self, now: DateTime<Utc>) -> TaskId {
        crate::clock::next_id(now, self.tasks.iter().map(|task| task.id))
    }

    /// Appends a task whose id was taken from `next_id`.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Replaces the task with the same id. Returns `false` when absent.
    pub fn update(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|current| current.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with `id`. Returns `false` when absent.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Flips `completed`; returns the new value, `None` when absent.
    pub fn toggle_completed(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }
}

impl From<Vec<Task>> for TaskCollection {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

//! Task filtering for the search and calendar views.

use crate::model::project::ProjectId;
use crate::model::task::Task;
use chrono::NaiveDate;
use serde::Serialize;

/// Which task list a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "project_id", rename_all = "snake_case")]
pub enum TaskScope {
    Global,
    Project(ProjectId),
}

/// Conjunctive task filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring of the task text.
    pub text: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub date: Option<NaiveDate>,
    pub completed: Option<bool>,
}

impl TaskQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(needle) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !task.text.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if task.category.as_deref() != Some(category) {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref() {
            if !task.has_tag(tag) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if task.scheduled_on() != Some(date) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        true
    }
}

/// Task paired with the list that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedTask {
    pub scope: TaskScope,
    pub task: Task,
}

#[cfg(test)]
mod tests {
    use super::TaskQuery;
    use crate::model::task::Task;
    use chrono::NaiveDate;

    fn sample() -> Task {
        let mut task = Task::new(1, "Buy Groceries");
        task.category = Some("Shopping".to_string());
        task.tags = vec!["Urgent".to_string()];
        task.date = Some("2025-05-04".to_string());
        task
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(TaskQuery::default().matches(&sample()));
        assert!(TaskQuery::text("   ").matches(&sample()));
    }

    #[test]
    fn fields_are_combined_with_and() {
        let task = sample();
        assert!(TaskQuery::text("groceries").matches(&task));
        assert!(!TaskQuery::text("rent").matches(&task));

        let query = TaskQuery {
            category: Some("Shopping".to_string()),
            tag: Some("Urgent".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 5, 4),
            completed: Some(false),
            ..TaskQuery::default()
        };
        assert!(query.matches(&task));

        let wrong_tag = TaskQuery {
            tag: Some("urgent".to_string()),
            ..query
        };
        assert!(!wrong_tag.matches(&task));
    }
}

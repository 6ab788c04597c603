//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose habit, task and project operations to Dart via FRB.
//! - Flatten core results into envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - One call at a time touches the store; every call opens the database,
//!   runs one operation and writes it through before returning.
//! - "Not found" is reported as `ok=true, changed=false`, never as a failure.

use chrono::NaiveDate;
use dayplan_core::db::open_db;
use dayplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DashboardSummary, DayStatus, Habit, HabitTracker, LabelRegistry, Planner, ProjectRegistry,
    ScopedTask, SqliteKvStore, SystemClock, Task, TaskDraft, TaskListManager, TaskQuery,
    TaskScope, ToggleOutcome,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const DB_FILE_NAME: &str = "dayplan.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database file used by every later call.
///
/// Must run before the first data call; afterwards only the same path is
/// accepted. Without it the path comes from `DAYPLAN_DB_PATH`, then the
/// temp directory.
///
/// # FFI contract
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation completed (a no-op on a missing id still counts).
    pub ok: bool,
    /// Whether anything was mutated and written.
    pub changed: bool,
    /// Id of the created or affected entity, when there is one.
    pub id: Option<i64>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn changed(message: impl Into<String>, id: i64) -> Self {
        Self {
            ok: true,
            changed: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: false,
            id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_flag(result: Result<bool, String>, op: &str, id: i64, done: &str) -> Self {
        match result {
            Ok(true) => Self::changed(done, id),
            Ok(false) => Self::unchanged("Nothing to change."),
            Err(err) => Self::failure(format!("{op} failed: {err}")),
        }
    }
}

/// Habit row with its derived day grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitView {
    pub id: i64,
    pub name: String,
    pub duration_days: u32,
    /// RFC 3339 creation timestamp.
    pub start_date: String,
    pub color: String,
    pub completed_days: u32,
    /// `pending|completed|missed`, one entry per day.
    pub day_statuses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelView {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelsView {
    pub categories: Vec<LabelView>,
    pub tags: Vec<LabelView>,
    pub selected_category: Option<String>,
}

/// Task row with colors resolved against the label registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: i64,
    pub text: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    pub category_color: String,
    pub tags: Vec<LabelView>,
    pub completed: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectView {
    pub id: i64,
    pub name: String,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    /// `None` for the global list.
    pub project_id: Option<i64>,
    pub task: TaskView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryView {
    pub habits: u32,
    pub habit_days_completed: u32,
    pub tasks_open: u32,
    pub tasks_completed: u32,
    pub projects: u32,
    pub project_tasks: u32,
}

/// Creates a habit starting today.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_create(name: String, duration_days: u32, color: String) -> ActionResponse {
    let result = with_store(|store| {
        HabitTracker::open(store, SystemClock)
            .create(&name, duration_days, &color)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(habit) => ActionResponse::changed("Habit created.", habit.id),
        Err(err) => ActionResponse::failure(format!("habit_create failed: {err}")),
    }
}

/// Renames/resizes a habit and resets its progress.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_update(id: i64, name: String, duration_days: u32) -> ActionResponse {
    let result = with_store(|store| {
        HabitTracker::open(store, SystemClock)
            .update(id, &name, duration_days)
            .map(|updated| updated.is_some())
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "habit_update", id, "Habit updated.")
}

/// Flips one day cell. Future days are locked.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_toggle_day(id: i64, day_index: u32) -> ActionResponse {
    let result = with_store(|store| {
        HabitTracker::open(store, SystemClock)
            .toggle_day(id, day_index as usize)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(ToggleOutcome::Toggled { completed: true }) => {
            ActionResponse::changed("Day marked done.", id)
        }
        Ok(ToggleOutcome::Toggled { completed: false }) => {
            ActionResponse::changed("Day marked not done.", id)
        }
        Ok(ToggleOutcome::Locked) => ActionResponse::unchanged("Day is still ahead."),
        Ok(ToggleOutcome::OutOfRange) => ActionResponse::unchanged("Day is outside the habit."),
        Ok(ToggleOutcome::NotFound) => ActionResponse::unchanged("Nothing to change."),
        Err(err) => ActionResponse::failure(format!("habit_toggle_day failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(id: i64) -> ActionResponse {
    let result = with_store(|store| {
        HabitTracker::open(store, SystemClock)
            .delete(id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "habit_delete", id, "Habit deleted.")
}

/// Lists habits with statuses relative to today. Empty on storage failure.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_list() -> Vec<HabitView> {
    list_or_empty("habit_list", |store| {
        let tracker = HabitTracker::open(store, SystemClock);
        let today = tracker.today();
        Ok(tracker
            .list()
            .iter()
            .map(|habit| to_habit_view(habit, today))
            .collect())
    })
}

/// Adds a task to the global list.
///
/// `category = None` uses the default category; unknown tags are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    text: String,
    category: Option<String>,
    tags: Vec<String>,
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
) -> ActionResponse {
    let draft = TaskDraft {
        text,
        date,
        start_time,
        end_time,
        category,
        tags,
    };
    let result = with_store(|store| {
        TaskListManager::open(store, SystemClock)
            .add(draft)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(task) => ActionResponse::changed("Task created.", task.id),
        Err(err) => ActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Replaces the text of a global task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update_text(id: i64, text: String) -> ActionResponse {
    let result = with_store(|store| {
        let mut manager = TaskListManager::open(store, SystemClock);
        let Some(mut task) = manager.get(id).cloned() else {
            return Ok(false);
        };
        task.text = text;
        manager.update(task).map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "task_update_text", id, "Task updated.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: i64) -> ActionResponse {
    let result = with_store(|store| {
        TaskListManager::open(store, SystemClock)
            .toggle_completed(id)
            .map(|completed| completed.is_some())
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "task_toggle", id, "Task toggled.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: i64) -> ActionResponse {
    let result = with_store(|store| {
        TaskListManager::open(store, SystemClock)
            .delete(id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "task_delete", id, "Task deleted.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> Vec<TaskView> {
    list_or_empty("task_list", |store| {
        let manager = TaskListManager::open(store, SystemClock);
        Ok(manager
            .list()
            .iter()
            .map(|task| to_task_view(task, manager.labels()))
            .collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn category_add(name: String, color: String) -> ActionResponse {
    label_change("category_add", "Category added.", |manager| {
        manager.add_category(&name, &color)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn category_delete(name: String) -> ActionResponse {
    label_change("category_delete", "Category deleted.", |manager| {
        manager.delete_category(&name)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tag_add(name: String, color: String) -> ActionResponse {
    label_change("tag_add", "Tag added.", |manager| manager.add_tag(&name, &color))
}

#[flutter_rust_bridge::frb(sync)]
pub fn tag_delete(name: String) -> ActionResponse {
    label_change("tag_delete", "Tag deleted.", |manager| manager.delete_tag(&name))
}

#[flutter_rust_bridge::frb(sync)]
pub fn label_list() -> LabelsView {
    let fallback = LabelsView {
        categories: Vec::new(),
        tags: Vec::new(),
        selected_category: None,
    };
    match with_store(|store| Ok(to_labels_view(TaskListManager::open(store, SystemClock).labels())))
    {
        Ok(view) => view,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=label_list error={err}");
            fallback
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_add(name: String) -> ActionResponse {
    let result = with_store(|store| {
        ProjectRegistry::open(store, SystemClock)
            .add(&name)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(project) => ActionResponse::changed("Project created.", project.id),
        Err(err) => ActionResponse::failure(format!("project_add failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_rename(id: i64, name: String) -> ActionResponse {
    let result = with_store(|store| {
        let mut registry = ProjectRegistry::open(store, SystemClock);
        let Some(mut project) = registry.get_by_id(id).cloned() else {
            return Ok(false);
        };
        project.name = name;
        registry.update(&project).map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "project_rename", id, "Project renamed.")
}

/// Deletes a project and every task it owns.
#[flutter_rust_bridge::frb(sync)]
pub fn project_delete(id: i64) -> ActionResponse {
    let result = with_store(|store| {
        ProjectRegistry::open(store, SystemClock)
            .delete(id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "project_delete", id, "Project deleted.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_list() -> Vec<ProjectView> {
    list_or_empty("project_list", |store| {
        let labels = LabelRegistry::load(store);
        let registry = ProjectRegistry::open(store, SystemClock);
        Ok(registry
            .list()
            .iter()
            .map(|project| ProjectView {
                id: project.id,
                name: project.name.clone(),
                tasks: project
                    .tasks
                    .iter()
                    .map(|task| to_task_view(task, &labels))
                    .collect(),
            })
            .collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_task_add(project_id: i64, text: String) -> ActionResponse {
    let result = with_store(|store| {
        ProjectRegistry::open(store, SystemClock)
            .add_task(project_id, &text)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(task)) => ActionResponse::changed("Task created.", task.id),
        Ok(None) => ActionResponse::unchanged("Nothing to change."),
        Err(err) => ActionResponse::failure(format!("project_task_add failed: {err}")),
    }
}

/// Replaces the text of a task owned by a project.
#[flutter_rust_bridge::frb(sync)]
pub fn project_task_update_text(project_id: i64, task_id: i64, text: String) -> ActionResponse {
    let result = with_store(|store| {
        let mut registry = ProjectRegistry::open(store, SystemClock);
        let Some(mut task) = registry
            .get_by_id(project_id)
            .and_then(|project| project.tasks.get(task_id))
            .cloned()
        else {
            return Ok(false);
        };
        task.text = text;
        registry
            .update_task(project_id, task)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "project_task_update_text", task_id, "Task updated.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_task_toggle(project_id: i64, task_id: i64) -> ActionResponse {
    let result = with_store(|store| {
        ProjectRegistry::open(store, SystemClock)
            .toggle_task(project_id, task_id)
            .map(|completed| completed.is_some())
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "project_task_toggle", task_id, "Task toggled.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn project_task_delete(project_id: i64, task_id: i64) -> ActionResponse {
    let result = with_store(|store| {
        ProjectRegistry::open(store, SystemClock)
            .delete_task(project_id, task_id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_flag(result, "project_task_delete", task_id, "Task deleted.")
}

/// Case-insensitive text search across the global list and all projects.
#[flutter_rust_bridge::frb(sync)]
pub fn search_tasks(text: String) -> Vec<SearchItem> {
    list_or_empty("search_tasks", |store| {
        let planner = Planner::open(store, SystemClock);
        let labels = planner.tasks().labels();
        Ok(planner
            .search_tasks(None, &TaskQuery::text(text.trim()))
            .iter()
            .map(|hit| to_search_item(hit, labels))
            .collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_summary() -> SummaryView {
    match with_store(|store| Ok(Planner::open(store, SystemClock).summary())) {
        Ok(summary) => to_summary_view(&summary),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=dashboard_summary error={err}");
            to_summary_view(&DashboardSummary::default())
        }
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DAYPLAN_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

/// Runs `f` against the store while holding the process-wide store lock,
/// so each whole-document read-modify-write has a single writer.
fn with_store<T>(f: impl FnOnce(&SqliteKvStore<'_>) -> Result<T, String>) -> Result<T, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("db open failed: {err}"))?;
    let store = SqliteKvStore::new(&conn);
    f(&store)
}

fn list_or_empty<T>(
    op: &str,
    f: impl FnOnce(&SqliteKvStore<'_>) -> Result<Vec<T>, String>,
) -> Vec<T> {
    match with_store(f) {
        Ok(items) => items,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op} error={err}");
            Vec::new()
        }
    }
}

fn label_change(
    op: &str,
    done: &str,
    f: impl FnOnce(
        &mut TaskListManager<&SqliteKvStore<'_>, SystemClock>,
    ) -> dayplan_core::ServiceResult<bool>,
) -> ActionResponse {
    let result = with_store(|store| {
        let mut manager = TaskListManager::open(store, SystemClock);
        f(&mut manager).map_err(|err| err.to_string())
    });
    match result {
        Ok(true) => ActionResponse {
            ok: true,
            changed: true,
            id: None,
            message: done.to_string(),
        },
        Ok(false) => ActionResponse::unchanged("Nothing to change."),
        Err(err) => ActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Pending => "pending",
        DayStatus::Completed => "completed",
        DayStatus::Missed => "missed",
    }
}

fn to_habit_view(habit: &Habit, today: NaiveDate) -> HabitView {
    HabitView {
        id: habit.id,
        name: habit.name.clone(),
        duration_days: habit.duration_days,
        start_date: habit.start_date.to_rfc3339(),
        color: habit.color.clone(),
        completed_days: saturating_u32(habit.completed_count()),
        day_statuses: habit
            .day_statuses(today)
            .into_iter()
            .map(|status| status_label(status).to_string())
            .collect(),
    }
}

fn to_labels_view(labels: &LabelRegistry) -> LabelsView {
    LabelsView {
        categories: labels
            .categories()
            .into_iter()
            .map(|category| LabelView {
                name: category.name,
                color: category.color,
            })
            .collect(),
        tags: labels
            .tags()
            .iter()
            .map(|tag| LabelView {
                name: tag.name.clone(),
                color: tag.color.clone(),
            })
            .collect(),
        selected_category: labels.selected_category().map(str::to_string),
    }
}

fn to_task_view(task: &Task, labels: &LabelRegistry) -> TaskView {
    TaskView {
        id: task.id,
        text: task.text.clone(),
        date: task.date.clone(),
        start_time: task.start_time.clone(),
        end_time: task.end_time.clone(),
        category: task.category.clone(),
        category_color: labels
            .category_color(task.category.as_deref().unwrap_or_default())
            .to_string(),
        tags: task
            .tags
            .iter()
            .map(|name| LabelView {
                name: name.clone(),
                color: labels.tag_color(name).to_string(),
            })
            .collect(),
        completed: task.completed,
        color: task.color.clone(),
    }
}

fn to_search_item(hit: &ScopedTask, labels: &LabelRegistry) -> SearchItem {
    SearchItem {
        project_id: match hit.scope {
            TaskScope::Global => None,
            TaskScope::Project(id) => Some(id),
        },
        task: to_task_view(&hit.task, labels),
    }
}

fn to_summary_view(summary: &DashboardSummary) -> SummaryView {
    SummaryView {
        habits: saturating_u32(summary.habits),
        habit_days_completed: saturating_u32(summary.habit_days_completed),
        tasks_open: saturating_u32(summary.tasks_open),
        tasks_completed: saturating_u32(summary.tasks_completed),
        projects: saturating_u32(summary.projects),
        project_tasks: saturating_u32(summary.project_tasks),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        category_add, category_delete, configure_db_path, core_version, dashboard_summary,
        habit_create, habit_list, habit_toggle_day, init_logging, label_list, ping,
        project_add, project_delete, project_list, project_task_add, project_task_update_text,
        search_tasks, task_add, task_list, task_toggle,
    };
    use std::sync::OnceLock;

    static TEST_DB: OnceLock<tempfile::TempDir> = OnceLock::new();

    fn use_test_db() {
        let dir = TEST_DB.get_or_init(|| tempfile::tempdir().unwrap());
        let path = dir.path().join("ffi.sqlite3");
        let error = configure_db_path(path.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn configure_db_path_rejects_blank_and_conflicting_paths() {
        use_test_db();
        assert!(!configure_db_path("  ".to_string()).is_empty());
        assert!(configure_db_path("/somewhere/else.sqlite3".to_string()).contains("refusing"));
    }

    #[test]
    fn habit_create_validates_and_lists_day_grid() {
        use_test_db();
        let rejected = habit_create("   ".to_string(), 21, String::new());
        assert!(!rejected.ok);
        assert!(rejected.message.contains("habit name"));

        let name = unique_token("habit");
        let created = habit_create(name.clone(), 3, "#123456".to_string());
        assert!(created.ok && created.changed, "{}", created.message);
        let id = created.id.unwrap();

        let locked = habit_toggle_day(id, 2);
        assert!(locked.ok && !locked.changed);
        let toggled = habit_toggle_day(id, 0);
        assert!(toggled.changed);

        let view = habit_list().into_iter().find(|h| h.id == id).unwrap();
        assert_eq!(view.name, name);
        assert_eq!(view.completed_days, 1);
        assert_eq!(view.day_statuses, vec!["completed", "pending", "pending"]);
    }

    #[test]
    fn task_add_resolves_category_and_tag_colors() {
        use_test_db();
        let category = unique_token("cat");
        assert!(category_add(category.clone(), "#101010".to_string()).changed);

        let text = unique_token("task");
        let created = task_add(
            text.clone(),
            Some(category.clone()),
            vec!["Urgente".to_string()],
            None,
            None,
            None,
        );
        assert!(created.ok, "{}", created.message);
        let id = created.id.unwrap();
        assert!(task_toggle(id).changed);

        let view = task_list().into_iter().find(|t| t.id == id).unwrap();
        assert!(view.completed);
        assert_eq!(view.category_color, "#101010");
        assert_eq!(view.tags[0].name, "Urgente");

        assert!(category_delete(category.clone()).changed);
        assert!(!label_list().categories.iter().any(|c| c.name == category));
        let view = task_list().into_iter().find(|t| t.id == id).unwrap();
        assert_eq!(view.category.as_deref(), Some(category.as_str()));
        assert_eq!(view.category_color, "#ffffff");
    }

    #[test]
    fn project_delete_cascades_to_its_tasks() {
        use_test_db();
        let project = project_add(unique_token("project"));
        let project_id = project.id.unwrap();
        let text = unique_token("project-task");
        assert!(project_task_add(project_id, text.clone()).changed);
        assert_eq!(search_tasks(text.clone()).len(), 1);
        assert!(dashboard_summary().project_tasks >= 1);

        assert!(project_delete(project_id).changed);
        assert!(!project_list().iter().any(|p| p.id == project_id));
        assert!(search_tasks(text).is_empty());
        assert!(!project_task_add(project_id, "late".to_string()).changed);
    }

    #[test]
    fn project_task_update_text_rewrites_only_the_owned_task() {
        use_test_db();
        let project_id = project_add(unique_token("project")).id.unwrap();
        let task_id = project_task_add(project_id, unique_token("draft"))
            .id
            .unwrap();

        let renamed = unique_token("renamed");
        let updated = project_task_update_text(project_id, task_id, renamed.clone());
        assert!(updated.ok && updated.changed, "{}", updated.message);
        let project = project_list()
            .into_iter()
            .find(|p| p.id == project_id)
            .unwrap();
        assert_eq!(project.tasks[0].text, renamed);

        let blank = project_task_update_text(project_id, task_id, "  ".to_string());
        assert!(!blank.ok);
        let missing = project_task_update_text(project_id, -1, "x".to_string());
        assert!(missing.ok && !missing.changed);
        let wrong_project = project_task_update_text(-1, task_id, "x".to_string());
        assert!(wrong_project.ok && !wrong_project.changed);
    }
}

//! Core domain logic for DayPlan: habits, tasks and projects persisted to
//! a local key/value store.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::habit::{DayStatus, Habit, HabitId};
pub use model::project::{Project, ProjectId};
pub use model::task::{Category, Tag, Task, TaskCollection, TaskDraft, TaskId};
pub use model::user::User;
pub use model::validation::ValidationError;
pub use service::auth::{AuthError, AuthSession, LocalAuth};
pub use service::habit_tracker::{HabitTracker, ToggleOutcome, DEFAULT_HABIT_DAYS};
pub use service::planner::{DashboardSummary, Planner};
pub use service::project_registry::ProjectRegistry;
pub use service::query::{ScopedTask, TaskQuery, TaskScope};
pub use service::task_list::{
    LabelRegistry, TaskListManager, FALLBACK_CATEGORY_COLOR, FALLBACK_TAG_COLOR,
};
pub use service::{ServiceError, ServiceResult};
pub use store::{KvStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

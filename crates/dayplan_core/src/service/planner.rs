//! Per-session facade over all managers.
//!
//! # Responsibility
//! - Construct the habit, task and project managers over one shared store
//!   and clock, once per session.
//! - Answer cross-scope questions (search, calendar day, dashboard counts).

use crate::clock::Clock;
use crate::model::project::ProjectId;
use crate::service::habit_tracker::HabitTracker;
use crate::service::project_registry::ProjectRegistry;
use crate::service::query::{ScopedTask, TaskQuery, TaskScope};
use crate::service::task_list::TaskListManager;
use crate::store::KvStore;
use chrono::NaiveDate;
use serde::Serialize;

/// Counts shown on the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub habits: usize,
    pub habit_days_completed: usize,
    pub tasks_open: usize,
    pub tasks_completed: usize,
    pub projects: usize,
    pub project_tasks: usize,
}

pub struct Planner<'s, S: KvStore, C: Clock + Clone> {
    habits: HabitTracker<&'s S, C>,
    tasks: TaskListManager<&'s S, C>,
    projects: ProjectRegistry<&'s S, C>,
}

impl<'s, S: KvStore, C: Clock + Clone> Planner<'s, S, C> {
    pub fn open(store: &'s S, clock: C) -> Self {
        Self {
            habits: HabitTracker::open(store, clock.clone()),
            tasks: TaskListManager::open(store, clock.clone()),
            projects: ProjectRegistry::open(store, clock),
        }
    }

    pub fn habits(&self) -> &HabitTracker<&'s S, C> {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut HabitTracker<&'s S, C> {
        &mut self.habits
    }

    pub fn tasks(&self) -> &TaskListManager<&'s S, C> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskListManager<&'s S, C> {
        &mut self.tasks
    }

    pub fn projects(&self) -> &ProjectRegistry<&'s S, C> {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut ProjectRegistry<&'s S, C> {
        &mut self.projects
    }

    /// Tasks matching `query`, limited to `scope` when given.
    ///
    /// Global tasks come first, then projects in list order. A scope naming
    /// a missing project yields nothing.
    pub fn search_tasks(&self, scope: Option<TaskScope>, query: &TaskQuery) -> Vec<ScopedTask> {
        let mut hits = Vec::new();
        if matches!(scope, None | Some(TaskScope::Global)) {
            hits.extend(self.tasks.search(query).into_iter().map(|task| ScopedTask {
                scope: TaskScope::Global,
                task: task.clone(),
            }));
        }
        for project in self.projects.list() {
            if !scope_includes(scope, project.id) {
                continue;
            }
            hits.extend(
                project
                    .tasks
                    .iter()
                    .filter(|task| query.matches(task))
                    .map(|task| ScopedTask {
                        scope: TaskScope::Project(project.id),
                        task: task.clone(),
                    }),
            );
        }
        hits
    }

    /// Every task scheduled on `date`, ordered by start time. Untimed tasks
    /// come last.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<ScopedTask> {
        let mut hits = self.search_tasks(None, &TaskQuery::on(date));
        hits.sort_by(|a, b| {
            let a_time = a.task.start_time.as_deref();
            let b_time = b.task.start_time.as_deref();
            a_time
                .is_none()
                .cmp(&b_time.is_none())
                .then_with(|| a_time.cmp(&b_time))
                .then_with(|| a.task.id.cmp(&b.task.id))
        });
        hits
    }

    pub fn summary(&self) -> DashboardSummary {
        let global = self.tasks.tasks();
        DashboardSummary {
            habits: self.habits.list().len(),
            habit_days_completed: self.habits.list().iter().map(|h| h.completed_count()).sum(),
            tasks_open: global.len() - global.completed_count(),
            tasks_completed: global.completed_count(),
            projects: self.projects.list().len(),
            project_tasks: self.projects.list().iter().map(|p| p.task_count()).sum(),
        }
    }
}

fn scope_includes(scope: Option<TaskScope>, project_id: ProjectId) -> bool {
    match scope {
        None => true,
        Some(TaskScope::Project(id)) => id == project_id,
        Some(TaskScope::Global) => false,
    }
}

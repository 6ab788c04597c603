//! Plain-text rendering for CLI output.

use chrono::NaiveDate;
use dayplan_core::{DashboardSummary, DayStatus, Habit, ScopedTask, Task, TaskScope};

/// `id  name  done/total  grid`, one grid cell per day:
/// `x` completed, `-` missed, `.` pending.
pub fn habit_line(habit: &Habit, today: NaiveDate) -> String {
    let grid: String = habit
        .day_statuses(today)
        .into_iter()
        .map(|status| match status {
            DayStatus::Completed => 'x',
            DayStatus::Missed => '-',
            DayStatus::Pending => '.',
        })
        .collect();
    format!(
        "{}  {}  {}/{}  {}",
        habit.id,
        habit.name,
        habit.completed_count(),
        habit.duration_days,
        grid
    )
}

pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{}  [{}] {}",
        task.id,
        if task.completed { "x" } else { " " },
        task.text
    );
    if let Some(category) = task.category.as_deref() {
        line.push_str(&format!("  ({category})"));
    }
    if let Some(date) = task.date.as_deref() {
        line.push_str(&format!("  {date}"));
        match (task.start_time.as_deref(), task.end_time.as_deref()) {
            (Some(start), Some(end)) => line.push_str(&format!(" {start}-{end}")),
            (Some(start), None) => line.push_str(&format!(" {start}")),
            _ => {}
        }
    }
    for tag in &task.tags {
        line.push_str(&format!("  #{tag}"));
    }
    line
}

pub fn scoped_task_line(hit: &ScopedTask) -> String {
    let scope = match hit.scope {
        TaskScope::Global => "global".to_string(),
        TaskScope::Project(id) => format!("project {id}"),
    };
    format!("[{scope}] {}", task_line(&hit.task))
}

pub fn summary(summary: &DashboardSummary) -> String {
    format!(
        "habits: {} ({} day(s) completed)\ntasks: {} open, {} completed\nprojects: {} ({} task(s))\n",
        summary.habits,
        summary.habit_days_completed,
        summary.tasks_open,
        summary.tasks_completed,
        summary.projects,
        summary.project_tasks
    )
}

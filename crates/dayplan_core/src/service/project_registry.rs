//! Project use-case service.
//!
//! # Responsibility
//! - Own the project collection and each project's embedded task list.
//! - Write the whole `projects` document through on every mutation.
//!
//! # Invariants
//! - Tasks exist only inside their owning project, so deleting a project
//!   deletes its tasks with no separate sweep.
//! - Unknown project or task ids are no-ops.

use crate::clock::{next_id, Clock};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::model::validation::required;
use crate::service::ServiceResult;
use crate::store::{keys, KvStore};
use log::info;

pub struct ProjectRegistry<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    projects: Vec<Project>,
}

impl<S: KvStore, C: Clock> ProjectRegistry<S, C> {
    pub fn open(store: S, clock: C) -> Self {
        let projects: Vec<Project> = store.load_or(keys::PROJECTS, Vec::new());
        info!(
            "event=project_load module=project status=ok count={}",
            projects.len()
        );
        Self {
            store,
            clock,
            projects,
        }
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn get_by_id(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn task_count(&self, id: ProjectId) -> Option<usize> {
        self.get_by_id(id).map(Project::task_count)
    }

    /// Creates an empty project.
    ///
    /// # Errors
    /// - `Validation` when the name is blank.
    pub fn add(&mut self, name: &str) -> ServiceResult<Project> {
        let name = required("project name", name)?;
        let id = next_id(
            self.clock.now(),
            self.projects.iter().map(|project| project.id),
        );
        let project = Project::new(id, name);

        self.projects.push(project.clone());
        self.persist()?;
        info!("event=project_create module=project status=ok id={}", id);
        Ok(project)
    }

    /// Renames the project with `project.id`; its tasks are not touched.
    ///
    /// # Errors
    /// - `Validation` when the new name is blank.
    pub fn update(&mut self, project: &Project) -> ServiceResult<bool> {
        let name = required("project name", &project.name)?;
        let Some(current) = self.find_mut(project.id) else {
            return Ok(false);
        };
        current.name = name;

        self.persist()?;
        info!(
            "event=project_update module=project status=ok id={}",
            project.id
        );
        Ok(true)
    }

    /// Removes a project together with every task it owns.
    pub fn delete(&mut self, id: ProjectId) -> ServiceResult<bool> {
        let Some(index) = self.projects.iter().position(|project| project.id == id) else {
            return Ok(false);
        };
        let removed = self.projects.remove(index);

        self.persist()?;
        info!(
            "event=project_delete module=project status=ok id={} tasks_removed={}",
            id,
            removed.task_count()
        );
        Ok(true)
    }

    /// Appends a bare task to a project.
    ///
    /// Returns `Ok(None)` when the project does not exist.
    ///
    /// # Errors
    /// - `Validation` when the text is blank.
    pub fn add_task(&mut self, project_id: ProjectId, text: &str) -> ServiceResult<Option<Task>> {
        let text = required("task text", text)?;
        let now = self.clock.now();
        let Some(project) = self.find_mut(project_id) else {
            return Ok(None);
        };
        let task = Task::new(project.tasks.next_id(now), text);
        project.tasks.push(task.clone());

        self.persist()?;
        info!(
            "event=project_task_create module=project status=ok project_id={} id={}",
            project_id, task.id
        );
        Ok(Some(task))
    }

    /// Replaces a project task by id.
    ///
    /// # Errors
    /// - `Validation` when the text is blank.
    pub fn update_task(&mut self, project_id: ProjectId, mut task: Task) -> ServiceResult<bool> {
        task.text = required("task text", &task.text)?;
        let task_id = task.id;
        let updated = self
            .find_mut(project_id)
            .is_some_and(|project| project.tasks.update(task));
        if !updated {
            return Ok(false);
        }

        self.persist()?;
        info!(
            "event=project_task_update module=project status=ok project_id={} id={}",
            project_id, task_id
        );
        Ok(true)
    }

    pub fn delete_task(&mut self, project_id: ProjectId, task_id: TaskId) -> ServiceResult<bool> {
        let deleted = self
            .find_mut(project_id)
            .is_some_and(|project| project.tasks.delete(task_id));
        if !deleted {
            return Ok(false);
        }

        self.persist()?;
        info!(
            "event=project_task_delete module=project status=ok project_id={} id={}",
            project_id, task_id
        );
        Ok(true)
    }

    /// Flips a project task; returns the new value or `None` when absent.
    pub fn toggle_task(
        &mut self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> ServiceResult<Option<bool>> {
        let Some(completed) = self
            .find_mut(project_id)
            .and_then(|project| project.tasks.toggle_completed(task_id))
        else {
            return Ok(None);
        };

        self.persist()?;
        info!(
            "event=project_task_toggle module=project status=ok project_id={} id={} completed={}",
            project_id, task_id, completed
        );
        Ok(Some(completed))
    }

    fn find_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id == id)
    }

    fn persist(&self) -> ServiceResult<()> {
        self.store.save(keys::PROJECTS, &self.projects)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectRegistry;
    use crate::clock::FixedClock;
    use crate::store::MemoryKvStore;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn projects_created_in_the_same_instant_get_distinct_ids() {
        let store = MemoryKvStore::new();
        let mut registry = ProjectRegistry::open(&store, clock());
        let first = registry.add("Launch").unwrap();
        let second = registry.add("Launch").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn rename_keeps_tasks() {
        let store = MemoryKvStore::new();
        let mut registry = ProjectRegistry::open(&store, clock());
        let mut project = registry.add("Launch").unwrap();
        registry.add_task(project.id, "Write spec").unwrap();

        project.name = "Relaunch".to_string();
        assert!(registry.update(&project).unwrap());
        let stored = registry.get_by_id(project.id).unwrap();
        assert_eq!(stored.name, "Relaunch");
        assert_eq!(stored.task_count(), 1);

        project.name = "  ".to_string();
        assert!(registry.update(&project).is_err());
    }

    #[test]
    fn task_operations_on_unknown_ids_are_no_ops() {
        let store = MemoryKvStore::new();
        let mut registry = ProjectRegistry::open(&store, clock());
        let project = registry.add("Launch").unwrap();

        assert_eq!(registry.add_task(project.id + 1, "x").unwrap(), None);
        assert_eq!(registry.toggle_task(project.id, 42).unwrap(), None);
        assert!(!registry.delete_task(project.id, 42).unwrap());
        assert!(!registry.delete(project.id + 1).unwrap());
        assert_eq!(registry.task_count(project.id), Some(0));
    }
}

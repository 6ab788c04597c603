use chrono::NaiveDate;
use dayplan_core::db::open_db_in_memory;
use dayplan_core::{
    FixedClock, KvStore, Planner, Project, ProjectRegistry, SqliteKvStore, TaskQuery, TaskScope,
};

fn clock() -> FixedClock {
    FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 4, 20).unwrap())
}

#[test]
fn deleting_a_project_leaves_no_reachable_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let mut planner = Planner::open(&store, clock());

    let project = planner.projects_mut().add("Launch").unwrap();
    let task = planner
        .projects_mut()
        .add_task(project.id, "Write spec")
        .unwrap()
        .unwrap();
    assert_eq!(planner.search_tasks(None, &TaskQuery::default()).len(), 1);

    assert!(planner.projects_mut().delete(project.id).unwrap());
    assert!(planner.projects().get_by_id(project.id).is_none());
    assert!(planner.projects().list().is_empty());
    assert!(planner
        .search_tasks(None, &TaskQuery::text("Write spec"))
        .is_empty());
    assert!(planner
        .search_tasks(Some(TaskScope::Project(project.id)), &TaskQuery::default())
        .is_empty());
    assert_eq!(planner.projects_mut().toggle_task(project.id, task.id).unwrap(), None);

    let stored: Vec<Project> = store.load("projects").unwrap();
    assert!(stored.is_empty());
    assert!(!store.get_raw("projects").unwrap().unwrap().contains("Write spec"));
}

#[test]
fn project_tasks_are_independent_per_project() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let mut registry = ProjectRegistry::open(&store, clock());

    let launch = registry.add("Launch").unwrap();
    let hiring = registry.add("Hiring").unwrap();
    let spec = registry.add_task(launch.id, "Write spec").unwrap().unwrap();
    registry.add_task(hiring.id, "Post job").unwrap();

    assert!(!registry.delete_task(hiring.id, spec.id).unwrap());
    assert_eq!(registry.toggle_task(launch.id, spec.id).unwrap(), Some(true));

    let mut renamed = registry
        .get_by_id(launch.id)
        .unwrap()
        .tasks
        .get(spec.id)
        .unwrap()
        .clone();
    renamed.text = "Write final spec".to_string();
    assert!(registry.update_task(launch.id, renamed).unwrap());

    let reopened = ProjectRegistry::open(&store, clock());
    let launch = reopened.get_by_id(launch.id).unwrap();
    let task = launch.tasks.get(spec.id).unwrap();
    assert_eq!(task.text, "Write final spec");
    assert!(task.completed);
    assert_eq!(reopened.task_count(hiring.id), Some(1));
}

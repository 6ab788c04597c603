use super::task::TaskCollection;
use serde::{Deserialize, Serialize};

pub type ProjectId = i64;

/// Named container that exclusively owns its tasks.
///
/// Tasks are stored inside the project document, so removing the project
/// removes every task it owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub tasks: TaskCollection,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tasks: TaskCollection::new(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

//! Ordered task store — insertion-ordered ids plus an id → task lookup table.
//!
//! The order list and the key set of the table always hold exactly the same
//! ids; every mutation goes through `insert`/`remove`, which update both.
//! Serializes as the ordered list of task records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::StoreError;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskStore {
    order: Vec<String>,
    tasks: HashMap<String, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Mutable access to a task. The id itself cannot be changed through it.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// Append a task at the end of the order.
    pub fn insert(&mut self, task: Task) -> Result<(), StoreError> {
        let id = task.id().to_string();
        if self.tasks.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.order.push(id.clone());
        self.tasks.insert(id, task);
        debug_assert!(self.is_consistent());
        Ok(())
    }

    /// Remove a task from both the order and the table.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.remove(id)?;
        self.order.retain(|existing| existing != id);
        debug_assert!(self.is_consistent());
        Some(task)
    }

    /// Next free sequential id: `task_<len+1>`, advanced past ids still in use.
    pub fn next_id(&self) -> String {
        let mut n = self.len() + 1;
        loop {
            let candidate = format!("task_{n}");
            if !self.tasks.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Tasks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// First task in declaration order matching the predicate.
    pub fn find(&self, mut pred: impl FnMut(&Task) -> bool) -> Option<&Task> {
        self.iter().find(|&task| pred(task))
    }

    /// Every task is completed (vacuously true when empty).
    pub fn all_completed(&self) -> bool {
        self.tasks.values().all(Task::is_completed)
    }

    pub fn any_pending(&self) -> bool {
        self.tasks.values().any(Task::is_pending)
    }

    /// Some pending task still has attempts left.
    pub fn any_eligible(&self) -> bool {
        self.tasks.values().any(Task::is_eligible)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.values().filter(|task| task.status == status).count()
    }

    /// Order and table describe the same id set, without duplicates.
    pub fn is_consistent(&self) -> bool {
        self.order.len() == self.tasks.len()
            && self.order.iter().all(|id| {
                self.tasks
                    .get(id)
                    .is_some_and(|task| task.id() == id.as_str())
            })
    }
}

impl TryFrom<Vec<Task>> for TaskStore {
    type Error = StoreError;

    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        let mut store = TaskStore::new();
        for task in tasks {
            store.insert(task)?;
        }
        Ok(store)
    }
}

impl From<TaskStore> for Vec<Task> {
    fn from(mut store: TaskStore) -> Self {
        store
            .order
            .iter()
            .filter_map(|id| store.tasks.remove(id))
            .collect()
    }
}

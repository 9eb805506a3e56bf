//! Run state — the single record threaded through every workflow node.
//!
//! Exactly one node owns the state at a time; it is handed from node to node
//! by mutable reference and never shared.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

use crate::store::TaskStore;
use crate::task::{Feedback, Task};

/// A control-flow target in the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Plan,
    Select,
    Dispatch,
    Execute,
    Reflect,
    Finalize,
    /// Terminal; the run is over.
    Done,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Node::Plan => "plan",
            Node::Select => "select",
            Node::Dispatch => "dispatch",
            Node::Execute => "execute",
            Node::Reflect => "reflect",
            Node::Finalize => "finalize",
            Node::Done => "done",
        })
    }
}

/// Everything a run knows. Returned to the caller at termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: Uuid,

    /// The original user request. Never changes during a run.
    user_query: String,

    /// Subtasks in declaration order.
    pub subtasks: TaskStore,

    /// Task picked by the last selector pass, if any.
    #[serde(default)]
    pub current_task_id: Option<String>,

    /// Planner passes so far.
    #[serde(default)]
    pub outer_iteration: u32,

    /// Selector passes that picked a task.
    #[serde(default)]
    pub inner_iteration: u32,

    /// Mutations waiting for the next planner pass (FIFO).
    #[serde(default)]
    pub feedback_queue: VecDeque<Feedback>,

    #[serde(default)]
    pub workflow_complete: bool,

    #[serde(default)]
    pub final_result: String,
}

impl RunState {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            user_query: user_query.into(),
            subtasks: TaskStore::new(),
            current_task_id: None,
            outer_iteration: 0,
            inner_iteration: 0,
            feedback_queue: VecDeque::new(),
            workflow_complete: false,
            final_result: String::new(),
        }
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    /// The currently selected task, if it still exists.
    pub fn current_task(&self) -> Option<&Task> {
        self.current_task_id
            .as_deref()
            .and_then(|id| self.subtasks.get(id))
    }

    pub fn current_task_mut(&mut self) -> Option<&mut Task> {
        let id = self.current_task_id.as_deref()?;
        self.subtasks.get_mut(id)
    }

    /// Every task completed (vacuously true with no tasks).
    pub fn all_completed(&self) -> bool {
        self.subtasks.all_completed()
    }

    /// Completion was forced by a bound while work remains unfinished.
    pub fn stopped_early(&self) -> bool {
        self.workflow_complete && !self.all_completed()
    }
}

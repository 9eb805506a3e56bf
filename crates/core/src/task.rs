//! Subtasks and the feedback items that mutate them.
//!
//! Both serialize to the record shapes exposed to any surrounding API layer:
//! a task as `{id, description, status, result, agent_type, tools, attempts,
//! max_attempts}` and a feedback item as `{task_id, feedback_type, message,
//! new_tasks}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attempt ceiling applied when a task is created without an explicit one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Lifecycle state of a subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    /// The lowercase tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work with its own status, result and retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a run (`task_<n>`). Immutable once created.
    id: String,

    /// What to do. Grows when a retry appends its reason.
    pub description: String,

    pub status: TaskStatus,

    /// Empty until the task has been executed.
    #[serde(default)]
    pub result: String,

    /// Tag selecting the capability set.
    pub agent_type: String,

    /// Tool identifiers attached by the dispatcher.
    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub attempts: u32,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Task {
    /// Create a pending task with the default attempt ceiling.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            result: String::new(),
            agent_type: agent_type.into(),
            tools: Vec::new(),
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt ceiling (fixed for the task's lifetime).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    /// Whether another execution fits within the attempt ceiling.
    pub fn has_attempts_left(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Pending and still within budget — the selector may pick it.
    pub fn is_eligible(&self) -> bool {
        self.is_pending() && self.has_attempts_left()
    }

    /// Failed but allowed to run again.
    pub fn is_retryable(&self) -> bool {
        self.is_failed() && self.has_attempts_left()
    }

    /// Re-open the task for another round: status back to pending, budget refilled.
    pub fn reopen(&mut self, reason: &str) {
        self.description.push_str(&format!(" (Updated: {reason})"));
        self.status = TaskStatus::Pending;
        self.attempts = 0;
    }
}

/// Kind of mutation requested by reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Modify,
    Delete,
    Add,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackKind::Modify => "modify",
            FeedbackKind::Delete => "delete",
            FeedbackKind::Add => "add",
        })
    }
}

/// A queued mutation against the task set, applied by the next planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub task_id: String,

    #[serde(rename = "feedback_type")]
    pub kind: FeedbackKind,

    pub message: String,

    /// Descriptions of the tasks to create; only used by `Add`.
    #[serde(default)]
    pub new_tasks: Vec<String>,
}

impl Feedback {
    pub fn modify(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            kind: FeedbackKind::Modify,
            message: message.into(),
            new_tasks: Vec::new(),
        }
    }

    pub fn delete(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            kind: FeedbackKind::Delete,
            message: message.into(),
            new_tasks: Vec::new(),
        }
    }

    pub fn add(
        task_id: impl Into<String>,
        message: impl Into<String>,
        new_tasks: Vec<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            kind: FeedbackKind::Add,
            message: message.into(),
            new_tasks,
        }
    }
}

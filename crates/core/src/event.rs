//! Workflow events — progress notifications decoupled from the engine.
//!
//! The engine publishes an event at every node transition and task-level
//! milestone. Subscribers (the CLI progress printer, tests) react without the
//! engine knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::state::Node;
use crate::task::{FeedbackKind, TaskStatus};

/// All workflow events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A run was accepted
    RunStarted {
        run_id: Uuid,
        request: String,
        timestamp: DateTime<Utc>,
    },

    /// The driver is about to execute a node
    NodeEntered {
        run_id: Uuid,
        node: Node,
        step: usize,
        timestamp: DateTime<Utc>,
    },

    /// The selector picked a task
    TaskSelected {
        run_id: Uuid,
        task_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The executor finished an attempt
    TaskExecuted {
        run_id: Uuid,
        task_id: String,
        status: TaskStatus,
        attempt: u32,
        timestamp: DateTime<Utc>,
    },

    /// Reflection queued a mutation
    FeedbackQueued {
        run_id: Uuid,
        task_id: String,
        kind: FeedbackKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The planner applied a queued mutation
    FeedbackApplied {
        run_id: Uuid,
        task_id: String,
        kind: FeedbackKind,
        timestamp: DateTime<Utc>,
    },

    /// The run reached the terminal node
    RunFinished {
        run_id: Uuid,
        completed: usize,
        total: usize,
        outer_iterations: u32,
        inner_iterations: u32,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for workflow events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<WorkflowEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: WorkflowEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WorkflowEvent>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

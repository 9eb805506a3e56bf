//! Run summaries — the serializable view of a finished run.

use serde::Serialize;
use taskweave_core::state::RunState;
use taskweave_core::task::{Feedback, Task, TaskStatus};
use uuid::Uuid;

pub const DEFAULT_PREVIEW_CHARS: usize = 150;

/// Counts derived from the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub total: usize,
    /// Completion was reached with every task completed, not forced by a bound.
    pub succeeded: bool,
}

/// Everything a caller reads back from a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub request: String,
    pub tasks: Vec<Task>,
    pub pending_feedback: Vec<Feedback>,
    pub outer_iterations: u32,
    pub inner_iterations: u32,
    pub workflow_complete: bool,
    pub final_result: String,
    pub stats: RunStats,
}

impl RunSummary {
    /// Summarize with the default result preview length.
    pub fn from_state(state: &RunState, full_results: bool) -> Self {
        Self::with_preview(state, full_results, DEFAULT_PREVIEW_CHARS)
    }

    /// Summarize, truncating each result to `preview_chars` unless `full_results`.
    pub fn with_preview(state: &RunState, full_results: bool, preview_chars: usize) -> Self {
        let tasks = state
            .subtasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                if !full_results {
                    task.result = preview(&task.result, preview_chars);
                }
                task
            })
            .collect();

        Self {
            run_id: state.run_id,
            request: state.user_query().to_string(),
            tasks,
            pending_feedback: state.feedback_queue.iter().cloned().collect(),
            outer_iterations: state.outer_iteration,
            inner_iterations: state.inner_iteration,
            workflow_complete: state.workflow_complete,
            final_result: state.final_result.clone(),
            stats: RunStats {
                completed: state.subtasks.count(TaskStatus::Completed),
                failed: state.subtasks.count(TaskStatus::Failed),
                pending: state.subtasks.count(TaskStatus::Pending),
                total: state.subtasks.len(),
                succeeded: state.workflow_complete && state.all_completed(),
            },
        }
    }

    /// Pretty-printed JSON for `run --json`.
    pub fn to_json(&self) -> taskweave_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// First `max_chars` characters of `text`, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

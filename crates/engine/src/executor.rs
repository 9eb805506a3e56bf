//! Executor — runs the selected task against the generator.
//!
//! Non-empty generator text completes the task. Empty text fails it and a
//! synthetic result naming the tools is recorded instead; that failure is
//! what drives retry and abandonment downstream.

use std::sync::Arc;
use taskweave_core::generator::Generator;
use taskweave_core::state::RunState;
use taskweave_core::task::{Task, TaskStatus};
use tracing::{debug, info, warn};

/// Outcome of one execution, for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub task_id: String,
    pub status: TaskStatus,
    pub attempt: u32,
}

pub struct Executor {
    generator: Arc<dyn Generator>,
}

impl Executor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Execute the current task once. No-op without a selection.
    pub async fn execute(&self, state: &mut RunState) -> Option<Execution> {
        let request = state.user_query().to_string();
        let task = state.current_task_mut()?;

        if !task.has_attempts_left() {
            warn!(
                task_id = %task.id(),
                attempts = task.attempts,
                "Executor: attempt ceiling already reached, not executing"
            );
            task.status = TaskStatus::Failed;
            return Some(Execution {
                task_id: task.id().to_string(),
                status: task.status,
                attempt: task.attempts,
            });
        }

        task.attempts += 1;
        task.status = TaskStatus::InProgress;
        info!(task_id = %task.id(), attempt = task.attempts, "Executor: executing task");

        let prompt = execution_prompt(task, &request);
        debug!(prompt_chars = prompt.len(), "Executor: prompt built");
        let output = self.generator.generate(&prompt).await;

        if output.trim().is_empty() {
            task.result = synthetic_result(&task.tools);
            task.status = TaskStatus::Failed;
            warn!(
                task_id = %task.id(),
                attempt = task.attempts,
                "Executor: empty output, task failed"
            );
        } else {
            task.result = output;
            task.status = TaskStatus::Completed;
            debug!(
                task_id = %task.id(),
                result_chars = task.result.len(),
                "Executor: task completed"
            );
        }

        Some(Execution {
            task_id: task.id().to_string(),
            status: task.status,
            attempt: task.attempts,
        })
    }
}

fn execution_prompt(task: &Task, request: &str) -> String {
    format!(
        "Execute this task:\n\
         Task: {}\n\
         Agent: {}\n\
         Tools: {}\n\
         Original request: {request}\n\n\
         Provide a detailed execution result.",
        task.description,
        task.agent_type,
        task.tools.join(", ")
    )
}

fn synthetic_result(tools: &[String]) -> String {
    if tools.is_empty() {
        "Executed using no tools".to_string()
    } else {
        format!("Executed using {}", tools.join(", "))
    }
}

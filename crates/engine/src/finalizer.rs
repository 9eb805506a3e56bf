//! Finalizer — aggregates completed results into the final report.

use taskweave_core::state::RunState;
use taskweave_core::task::{Task, TaskStatus};
use tracing::info;

pub const NO_TASKS_COMPLETED: &str = "No tasks completed successfully";

/// Build the report from completed tasks in declaration order.
///
/// Calling this twice on the same state yields the same report.
pub fn finalize(state: &mut RunState) {
    state.final_result = report(state);
    state.workflow_complete = true;
    info!(
        completed = state.subtasks.count(TaskStatus::Completed),
        total = state.subtasks.len(),
        "Finalizer: report compiled"
    );
}

/// The report for a state, without touching it.
pub fn report(state: &RunState) -> String {
    let sections: Vec<String> = state
        .subtasks
        .iter()
        .filter(|task| task.is_completed())
        .map(section)
        .collect();

    if sections.is_empty() {
        NO_TASKS_COMPLETED.to_string()
    } else {
        sections.join("\n\n")
    }
}

fn section(task: &Task) -> String {
    format!("✅ {}\n   → {}", task.description, task.result)
}

//! Router — pure decisions mapping the run state to the next node.
//!
//! All loop and termination logic lives here. None of these functions
//! mutate the state.

use taskweave_core::state::{Node, RunState};
use taskweave_core::task::Task;

/// After a planner pass.
pub fn after_plan(state: &RunState) -> Node {
    if state.workflow_complete {
        Node::Finalize
    } else if state.subtasks.any_eligible() && state.feedback_queue.is_empty() {
        Node::Select
    } else {
        Node::Plan
    }
}

/// After a selector pass.
pub fn after_select(state: &RunState) -> Node {
    if state.current_task_id.is_some() {
        Node::Dispatch
    } else if state.all_completed() {
        Node::Finalize
    } else {
        Node::Plan
    }
}

/// After reflection. A failed task with budget left is retried immediately.
pub fn after_reflect(state: &RunState) -> Node {
    if state.current_task().is_some_and(Task::is_retryable) {
        Node::Execute
    } else if state.subtasks.any_pending() {
        Node::Select
    } else if state.all_completed() {
        Node::Finalize
    } else {
        Node::Plan
    }
}

/// The successor of `node`, given the state it left behind.
pub fn next(node: Node, state: &RunState) -> Node {
    match node {
        Node::Plan => after_plan(state),
        Node::Select => after_select(state),
        Node::Dispatch => Node::Execute,
        Node::Execute => Node::Reflect,
        Node::Reflect => after_reflect(state),
        Node::Finalize | Node::Done => Node::Done,
    }
}

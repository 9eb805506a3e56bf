//! Selector — picks the next pending task by declaration order.

use taskweave_core::state::RunState;
use taskweave_core::task::Task;
use tracing::{debug, info};

/// Select the first pending task in order, or clear the selection.
///
/// Returns the selected id. The inner-iteration counter advances only when
/// a task is picked.
pub fn select(state: &mut RunState) -> Option<String> {
    let selected = state.subtasks.find(Task::is_pending).map(|task| task.id().to_string());

    match &selected {
        Some(id) => {
            state.inner_iteration += 1;
            info!(
                task_id = %id,
                inner_iteration = state.inner_iteration,
                "Selector: selected task"
            );
        }
        None => debug!("Selector: no pending task"),
    }

    state.current_task_id = selected.clone();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskweave_core::task::TaskStatus;

    fn state_with(statuses: &[TaskStatus]) -> RunState {
        let mut state = RunState::new("q");
        for status in statuses {
            let id = state.subtasks.next_id();
            let mut task = Task::new(id, "d", "research_agent");
            task.status = *status;
            state.subtasks.insert(task).unwrap();
        }
        state
    }

    #[test]
    fn picks_lowest_index_pending() {
        let mut state = state_with(&[
            TaskStatus::Completed,
            TaskStatus::Pending,
            TaskStatus::Pending,
        ]);
        assert_eq!(select(&mut state).as_deref(), Some("task_2"));
        assert_eq!(state.current_task_id.as_deref(), Some("task_2"));
        assert_eq!(state.inner_iteration, 1);
    }

    #[test]
    fn reopened_earlier_task_wins_over_later_ones() {
        let mut state = state_with(&[
            TaskStatus::Completed,
            TaskStatus::Completed,
            TaskStatus::Pending,
        ]);
        state.subtasks.get_mut("task_1").unwrap().reopen("retry with enhancement");

        assert_eq!(select(&mut state).as_deref(), Some("task_1"));
    }

    #[test]
    fn skips_failed_and_in_progress() {
        let mut state = state_with(&[
            TaskStatus::Failed,
            TaskStatus::InProgress,
            TaskStatus::Pending,
        ]);
        assert_eq!(select(&mut state).as_deref(), Some("task_3"));
    }

    #[test]
    fn no_pending_clears_selection() {
        let mut state = state_with(&[TaskStatus::Completed, TaskStatus::Failed]);
        state.current_task_id = Some("task_2".into());

        assert!(select(&mut state).is_none());
        assert!(state.current_task_id.is_none());
        assert_eq!(state.inner_iteration, 0);
    }
}

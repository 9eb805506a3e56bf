//! Reflector — critiques an executed task and queues at most one feedback item.
//!
//! The critique never overrides the executor's status. It only decides
//! whether a completed task needs a follow-up.

use std::sync::Arc;
use taskweave_core::generator::Generator;
use taskweave_core::state::RunState;
use taskweave_core::task::{Feedback, Task};
use tracing::{debug, info};

pub const RETRY_MESSAGE: &str = "retry with enhancement";
pub const ABANDON_MESSAGE: &str = "exhausted attempts";
pub const FOLLOW_UP_MESSAGE: &str = "Needs additional work";

pub struct Reflector {
    generator: Arc<dyn Generator>,
    continuation_cues: Vec<String>,
}

impl Reflector {
    pub fn new(generator: Arc<dyn Generator>, continuation_cues: Vec<String>) -> Self {
        let continuation_cues = continuation_cues
            .into_iter()
            .map(|cue| cue.trim().to_lowercase())
            .filter(|cue| !cue.is_empty())
            .collect();
        Self {
            generator,
            continuation_cues,
        }
    }

    /// Reflect on the current task and queue the resulting feedback, if any.
    ///
    /// No-op without a selection. The returned item has already been pushed
    /// onto the queue.
    pub async fn reflect(&self, state: &mut RunState) -> Option<Feedback> {
        let task = state.current_task()?;
        info!(task_id = %task.id(), status = %task.status, "Reflector: reflecting");

        let critique = self.generator.generate(&reflection_prompt(task)).await;
        debug!(
            task_id = %task.id(),
            critique_chars = critique.len(),
            "Reflector: critique received"
        );

        let feedback = self.feedback_for(task, &critique)?;
        info!(
            task_id = %feedback.task_id,
            kind = %feedback.kind,
            message = %feedback.message,
            "Reflector: feedback queued"
        );
        state.feedback_queue.push_back(feedback.clone());
        Some(feedback)
    }

    /// The emission rule: retry, abandon, expand, or nothing.
    fn feedback_for(&self, task: &Task, critique: &str) -> Option<Feedback> {
        if task.is_failed() {
            return Some(if task.has_attempts_left() {
                Feedback::modify(task.id(), RETRY_MESSAGE)
            } else {
                Feedback::delete(task.id(), ABANDON_MESSAGE)
            });
        }

        if self.has_continuation_cue(critique) {
            return Some(Feedback::add(
                task.id(),
                FOLLOW_UP_MESSAGE,
                vec![format!("Follow-up for {}", task.description)],
            ));
        }

        None
    }

    /// Whether any word of the critique starts with a cue ("more" matches "more," and "moreover").
    fn has_continuation_cue(&self, critique: &str) -> bool {
        critique
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| self.continuation_cues.iter().any(|cue| word.starts_with(cue.as_str())))
    }
}

fn reflection_prompt(task: &Task) -> String {
    format!(
        "Reflect on this task execution:\n\
         Task: {}\n\
         Result: {}\n\
         Status: {}\n\n\
         Evaluate the quality and suggest improvements.",
        task.description, task.result, task.status
    )
}

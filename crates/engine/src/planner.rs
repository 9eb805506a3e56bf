//! Planner — decomposes the request, applies queued feedback, decides completion.
//!
//! Every planning pass counts as one outer iteration. Once the outer ceiling
//! is reached the planner stops planning and forces completion instead.

use serde::Deserialize;
use std::sync::Arc;
use taskweave_core::capability::{CapabilityRegistry, DEFAULT_AGENT_TYPE};
use taskweave_core::generator::Generator;
use taskweave_core::state::RunState;
use taskweave_core::task::{Feedback, FeedbackKind, Task};
use tracing::{debug, info, warn};

/// What one planner pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanReport {
    /// Feedback items drained from the queue, in the order they were applied.
    pub applied: Vec<Feedback>,
    /// Ids of tasks created by decomposition or `Add` feedback.
    pub created: Vec<String>,
    /// The decomposition fell back to the fixed default tasks.
    pub used_default_tasks: bool,
    /// The outer ceiling was hit; nothing was planned.
    pub hard_stop: bool,
}

/// One entry of a decomposition response.
#[derive(Debug, Clone, Deserialize)]
struct PlannedTask {
    description: String,
    #[serde(default)]
    agent_type: Option<String>,
}

pub struct Planner {
    generator: Arc<dyn Generator>,
    registry: Arc<CapabilityRegistry>,
    max_outer_iterations: u32,
    max_attempts: u32,
}

impl Planner {
    pub fn new(
        generator: Arc<dyn Generator>,
        registry: Arc<CapabilityRegistry>,
        max_outer_iterations: u32,
        max_attempts: u32,
    ) -> Self {
        Self {
            generator,
            registry,
            max_outer_iterations,
            max_attempts,
        }
    }

    /// Run one planning pass over the state.
    pub async fn plan(&self, state: &mut RunState) -> PlanReport {
        let mut report = PlanReport::default();

        if state.outer_iteration >= self.max_outer_iterations {
            let dropped = state.feedback_queue.len();
            state.feedback_queue.clear();
            state.workflow_complete = true;
            report.hard_stop = true;
            warn!(
                outer_iteration = state.outer_iteration,
                dropped_feedback = dropped,
                "Planner: outer iteration ceiling reached, forcing completion"
            );
            return report;
        }

        state.outer_iteration += 1;
        info!(outer_iteration = state.outer_iteration, "Planner: starting pass");

        if !state.feedback_queue.is_empty() {
            self.apply_feedback(state, &mut report);
        }

        if state.subtasks.is_empty() {
            self.decompose(state, &mut report).await;
        }

        state.workflow_complete = state.all_completed();
        debug!(
            tasks = state.subtasks.len(),
            complete = state.workflow_complete,
            "Planner: pass finished"
        );
        report
    }

    /// Drain the feedback queue in arrival order.
    fn apply_feedback(&self, state: &mut RunState, report: &mut PlanReport) {
        info!(items = state.feedback_queue.len(), "Planner: applying feedback");

        while let Some(feedback) = state.feedback_queue.pop_front() {
            match feedback.kind {
                FeedbackKind::Modify => {
                    if let Some(task) = state.subtasks.get_mut(&feedback.task_id) {
                        task.reopen(&feedback.message);
                        debug!(task_id = %feedback.task_id, "Planner: task re-opened");
                    }
                }
                FeedbackKind::Delete => {
                    if state.subtasks.remove(&feedback.task_id).is_some() {
                        if state.current_task_id.as_deref() == Some(feedback.task_id.as_str()) {
                            state.current_task_id = None;
                        }
                        debug!(task_id = %feedback.task_id, "Planner: task deleted");
                    }
                }
                FeedbackKind::Add => {
                    for description in &feedback.new_tasks {
                        if let Some(id) = self.insert_task(state, description, DEFAULT_AGENT_TYPE) {
                            report.created.push(id);
                        }
                    }
                }
            }
            report.applied.push(feedback);
        }
    }

    /// Ask the generator for the initial task set.
    async fn decompose(&self, state: &mut RunState, report: &mut PlanReport) {
        let prompt = decomposition_prompt(state.user_query());
        let response = self.generator.generate(&prompt).await;

        let planned = match parse_decomposition(&response) {
            Some(planned) => planned,
            None => {
                warn!("Planner: decomposition response unusable, using default tasks");
                report.used_default_tasks = true;
                default_tasks(state.user_query())
            }
        };

        for entry in planned {
            let agent_type = self.registry.normalize(entry.agent_type.as_deref()).to_string();
            if let Some(id) = self.insert_task(state, &entry.description, &agent_type) {
                report.created.push(id);
            }
        }

        info!(tasks = state.subtasks.len(), "Planner: created subtasks");
    }

    fn insert_task(
        &self,
        state: &mut RunState,
        description: &str,
        agent_type: &str,
    ) -> Option<String> {
        let id = state.subtasks.next_id();
        let task =
            Task::new(id.clone(), description, agent_type).with_max_attempts(self.max_attempts);
        match state.subtasks.insert(task) {
            Ok(()) => Some(id),
            Err(e) => {
                warn!(error = %e, "Planner: could not insert task");
                None
            }
        }
    }
}

fn decomposition_prompt(request: &str) -> String {
    format!(
        "Break down this request into 3-5 actionable subtasks:\n\
         \"{request}\"\n\n\
         Return a JSON array, one object per subtask, each with an agent-type tag:\n\
         [{{\"description\": \"task description\", \"agent_type\": \"research_agent|analysis_agent|creative_agent|technical_agent\"}}]"
    )
}

/// Find the first well-formed, non-empty array of task objects in `text`.
fn parse_decomposition(text: &str) -> Option<Vec<PlannedTask>> {
    text.char_indices()
        .filter(|&(_, c)| c == '[')
        .find_map(|(start, _)| {
            let mut stream =
                serde_json::Deserializer::from_str(&text[start..]).into_iter::<Vec<PlannedTask>>();
            match stream.next() {
                Some(Ok(tasks))
                    if !tasks.is_empty()
                        && tasks.iter().all(|t| !t.description.trim().is_empty()) =>
                {
                    Some(tasks)
                }
                _ => None,
            }
        })
}

/// The fixed research/analyze/synthesize plan used when decomposition fails.
fn default_tasks(request: &str) -> Vec<PlannedTask> {
    [
        (format!("Research: {request}"), "research_agent"),
        (format!("Analyze: {request}"), "analysis_agent"),
        (format!("Generate output for: {request}"), "creative_agent"),
    ]
    .into_iter()
    .map(|(description, agent_type)| PlannedTask {
        description,
        agent_type: Some(agent_type.to_string()),
    })
    .collect()
}

//! Workflow driver — runs the node state machine to termination.
//!
//! ```text
//!   Plan ──► Select ──► Dispatch ──► Execute ──► Reflect
//!    ▲ │       │                        ▲           │
//!    │ │       │                        └─ retry ───┤
//!    │ │       └──────────► Finalize ◄──────────────┤
//!    │ └──────────────────────► ▲                   │
//!    └──────────────────────────┴──── re-plan ◄─────┘
//! ```
//!
//! Each node borrows the run state mutably for its step and hands it back;
//! the router picks the successor. The loop is bounded by the outer ceiling
//! and the per-task attempt ceiling; an optional step cap can cut it shorter.

use chrono::Utc;
use std::sync::Arc;
use taskweave_config::AppConfig;
use taskweave_core::capability::CapabilityRegistry;
use taskweave_core::event::{EventBus, WorkflowEvent};
use taskweave_core::generator::Generator;
use taskweave_core::state::{Node, RunState};
use taskweave_core::task::TaskStatus;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::executor::Executor;
use crate::finalizer;
use crate::planner::Planner;
use crate::reflector::Reflector;
use crate::router;
use crate::selector;

/// Bounds of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max_outer_iterations: u32,
    pub max_attempts: u32,
    /// Node executions before finalization is forced; `None` disables the cap
    pub max_steps: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_outer_iterations: 5,
            max_attempts: 3,
            max_steps: None,
        }
    }
}

/// The assembled engine: one instance can serve many sequential runs.
pub struct Workflow {
    planner: Planner,
    dispatcher: Dispatcher,
    executor: Executor,
    reflector: Reflector,
    limits: Limits,
    event_bus: Option<Arc<EventBus>>,
}

impl Workflow {
    /// An engine with the built-in registry, default bounds and cues.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self::build(
            generator,
            Arc::new(CapabilityRegistry::builtin()),
            Limits::default(),
            vec!["additional".into(), "more".into()],
        )
    }

    /// An engine configured from the application config.
    pub fn from_config(generator: Arc<dyn Generator>, config: &AppConfig) -> Self {
        let limits = Limits {
            max_outer_iterations: config.engine.max_outer_iterations,
            max_attempts: config.engine.max_attempts,
            max_steps: config.engine.max_steps,
        };
        Self::build(
            generator,
            Arc::new(crate::registry_from_config(config)),
            limits,
            config.engine.continuation_cues.clone(),
        )
    }

    fn build(
        generator: Arc<dyn Generator>,
        registry: Arc<CapabilityRegistry>,
        limits: Limits,
        continuation_cues: Vec<String>,
    ) -> Self {
        Self {
            planner: Planner::new(
                generator.clone(),
                registry.clone(),
                limits.max_outer_iterations,
                limits.max_attempts,
            ),
            dispatcher: Dispatcher::new(registry),
            executor: Executor::new(generator.clone()),
            reflector: Reflector::new(generator, continuation_cues),
            limits,
            event_bus: None,
        }
    }

    /// Publish progress events on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Run one request to termination. Never fails; the returned state
    /// carries the report, the task list and the counters.
    pub async fn run(&self, request: impl Into<String>) -> RunState {
        let state = RunState::new(request);
        info!(run_id = %state.run_id, request = %state.user_query(), "Workflow: run started");
        self.publish(|| WorkflowEvent::RunStarted {
            run_id: state.run_id,
            request: state.user_query().to_string(),
            timestamp: Utc::now(),
        });
        self.resume(state, Node::Plan).await
    }

    /// Drive an existing state from `node` until `Done`.
    pub async fn resume(&self, mut state: RunState, mut node: Node) -> RunState {
        let mut steps = 0usize;

        while node != Node::Done {
            let capped = self.limits.max_steps.is_some_and(|cap| steps >= cap);
            if capped && node != Node::Finalize {
                warn!(
                    steps,
                    node = %node,
                    "Workflow: step cap reached, forcing finalization"
                );
                state.workflow_complete = true;
                node = Node::Finalize;
            }

            steps += 1;
            self.publish(|| WorkflowEvent::NodeEntered {
                run_id: state.run_id,
                node,
                step: steps,
                timestamp: Utc::now(),
            });

            node = self.step(node, &mut state).await;
            debug!(next = %node, step = steps, "Workflow: routed");
        }

        info!(
            run_id = %state.run_id,
            outer_iterations = state.outer_iteration,
            inner_iterations = state.inner_iteration,
            complete = state.workflow_complete,
            stopped_early = state.stopped_early(),
            "Workflow: run finished"
        );
        self.publish(|| WorkflowEvent::RunFinished {
            run_id: state.run_id,
            completed: state.subtasks.count(TaskStatus::Completed),
            total: state.subtasks.len(),
            outer_iterations: state.outer_iteration,
            inner_iterations: state.inner_iteration,
            timestamp: Utc::now(),
        });
        state
    }

    /// Execute one node and return the routed successor.
    pub async fn step(&self, node: Node, state: &mut RunState) -> Node {
        match node {
            Node::Plan => {
                let report = self.planner.plan(state).await;
                for feedback in &report.applied {
                    self.publish(|| WorkflowEvent::FeedbackApplied {
                        run_id: state.run_id,
                        task_id: feedback.task_id.clone(),
                        kind: feedback.kind,
                        timestamp: Utc::now(),
                    });
                }
            }
            Node::Select => {
                if let Some(task_id) = selector::select(state) {
                    self.publish(|| WorkflowEvent::TaskSelected {
                        run_id: state.run_id,
                        task_id,
                        timestamp: Utc::now(),
                    });
                }
            }
            Node::Dispatch => self.dispatcher.dispatch(state),
            Node::Execute => {
                if let Some(execution) = self.executor.execute(state).await {
                    self.publish(|| WorkflowEvent::TaskExecuted {
                        run_id: state.run_id,
                        task_id: execution.task_id,
                        status: execution.status,
                        attempt: execution.attempt,
                        timestamp: Utc::now(),
                    });
                }
            }
            Node::Reflect => {
                if let Some(feedback) = self.reflector.reflect(state).await {
                    self.publish(|| WorkflowEvent::FeedbackQueued {
                        run_id: state.run_id,
                        task_id: feedback.task_id,
                        kind: feedback.kind,
                        message: feedback.message,
                        timestamp: Utc::now(),
                    });
                }
            }
            Node::Finalize => finalizer::finalize(state),
            Node::Done => {}
        }

        router::next(node, state)
    }

    fn publish(&self, event: impl FnOnce() -> WorkflowEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event());
        }
    }
}

//! The taskweave orchestration engine.
//!
//! One request is decomposed into subtasks, each subtask is dispatched to a
//! typed worker and executed, the result is reflected on, and the resulting
//! feedback reshapes the task set on the next planning pass:
//!
//! 1. **Plan**: apply queued feedback, decompose if there are no tasks, decide completion
//! 2. **Select**: pick the first pending task in declaration order
//! 3. **Dispatch**: attach the agent type's tools
//! 4. **Execute**: ask the generator, record the result
//! 5. **Reflect**: critique, queue a modify/delete/add item
//! 6. **Finalize**: compile completed results into the report
//!
//! Routing between these steps is pure ([`router`]); [`Workflow`] drives the
//! loop until the terminal node.

pub mod dispatcher;
pub mod executor;
pub mod finalizer;
pub mod planner;
pub mod reflector;
pub mod router;
pub mod selector;
pub mod summary;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::Dispatcher;
pub use executor::{Execution, Executor};
pub use planner::{PlanReport, Planner};
pub use reflector::Reflector;
pub use summary::{RunStats, RunSummary};
pub use workflow::{Limits, Workflow};

use taskweave_config::AppConfig;
use taskweave_core::capability::CapabilityRegistry;

/// The built-in registry extended (or overridden) by `[capabilities]`.
pub fn registry_from_config(config: &AppConfig) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::builtin();
    for (agent_type, tools) in &config.capabilities {
        registry.register(agent_type.clone(), tools.iter().cloned());
    }
    registry
}

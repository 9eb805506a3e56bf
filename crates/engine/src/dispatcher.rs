//! Dispatcher — attaches the agent type's tool set to the selected task.

use std::sync::Arc;
use taskweave_core::capability::CapabilityRegistry;
use taskweave_core::state::RunState;
use tracing::info;

pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Assign tools to the current task. No-op without a selection.
    pub fn dispatch(&self, state: &mut RunState) {
        let Some(task) = state.current_task_mut() else {
            return;
        };

        task.tools = self.registry.tools_for(&task.agent_type);
        info!(
            task_id = %task.id(),
            agent_type = %task.agent_type,
            tools = ?task.tools,
            "Dispatcher: tools attached"
        );
    }
}

//! Capability registry — which tools each agent type gets.
//!
//! Tool identifiers are metadata only; nothing here executes anything.

use std::collections::BTreeMap;

/// Agent type assigned when a tag is missing or unrecognized.
pub const DEFAULT_AGENT_TYPE: &str = "research_agent";

/// Tool attached when an agent type has no registered capability set.
pub const DEFAULT_TOOL: &str = "web_search";

/// Static mapping from agent-type tag to an ordered tool list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, Vec<String>>,
}

impl CapabilityRegistry {
    /// An empty registry. Every lookup falls back to the default tool.
    pub fn empty() -> Self {
        Self {
            capabilities: BTreeMap::new(),
        }
    }

    /// The four built-in agent types.
    pub fn builtin() -> Self {
        Self::empty()
            .with("research_agent", ["web_search", "document_analysis"])
            .with("analysis_agent", ["data_processing", "statistical_analysis"])
            .with("creative_agent", ["text_generator", "content_creation"])
            .with("technical_agent", ["calculator", "code_execution"])
    }

    /// Register (or replace) an agent type.
    pub fn with<I, S>(mut self, agent_type: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(agent_type, tools);
        self
    }

    pub fn register<I, S>(&mut self, agent_type: impl Into<String>, tools: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .insert(agent_type.into(), tools.into_iter().map(Into::into).collect());
    }

    pub fn is_known(&self, agent_type: &str) -> bool {
        self.capabilities.contains_key(agent_type)
    }

    /// The tag itself if registered, otherwise the default agent type.
    pub fn normalize<'a>(&self, agent_type: Option<&'a str>) -> &'a str {
        match agent_type.map(str::trim) {
            Some(tag) if self.is_known(tag) => tag,
            _ => DEFAULT_AGENT_TYPE,
        }
    }

    /// Tools for an agent type, or the single default tool when unknown.
    pub fn tools_for(&self, agent_type: &str) -> Vec<String> {
        self.capabilities
            .get(agent_type)
            .cloned()
            .unwrap_or_else(|| vec![DEFAULT_TOOL.to_string()])
    }

    /// Registered agent types, sorted.
    pub fn agent_types(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Tool registry for MCP tools.
//!
//! Each registered tool keeps the catalog descriptor it was generated from,
//! so the executor can map arguments back to the integration's field names.

use crate::protocol::ToolDefinition;
use soar_core::ActionDescriptor;
use std::collections::BTreeMap;

/// A tool together with the action it invokes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    /// Integration name as known by the SOAR platform.
    pub integration: String,
    pub action: ActionDescriptor,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Remote action name, `<Integration>_<Action>`.
    pub fn action_name(&self) -> String {
        self.action.action_name(&self.integration)
    }
}

/// Registry of available MCP tools, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, returning the one it replaced.
    pub fn register(&mut self, tool: RegisteredTool) -> Option<RegisteredTool> {
        self.tools.insert(tool.definition.name.clone(), tool)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tools.
    pub fn list(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    /// Definitions as advertised by `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

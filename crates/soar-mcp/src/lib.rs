//! # soar-mcp
//!
//! MCP (Model Context Protocol) server exposing SOAR marketplace integration
//! actions as typed tools.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  SOAR MCP Server     │
//! │  1. Validate args    │  ← catalog descriptor
//! │  2. Resolve scope    │  ← permitted scopes
//! │  3. Find instance    │  ← InstanceDirectory
//! │  4. Build request    │
//! │  5. Execute action   │  ← ActionEndpoint
//! │  6. Return JSON      │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!     SOAR REST API
//! ```
//!
//! ## Tool Generation
//!
//! One tool per catalog action, named `<integration>_<action>` in snake
//! case, e.g. `crowd_strike_falcon_contain_endpoint`. See
//! [`tool_generator`] for the argument schema.
//!
//! ## Case Management Tools
//!
//! [`CaseTools`] adds a fixed set of tools (`list_cases`,
//! `post_case_comment`, `get_case_full_details`, ...) that call the case,
//! alert and entity endpoints directly. Enable them with
//! [`McpServer::with_case_tools`].
//!
//! ## Example Usage
//!
//! ```ignore
//! use soar_core::{Marketplace, McpConfig, PermittedScopes};
//! use soar_mcp::{CaseTools, McpServer, ToolExecutor, tool_generation};
//!
//! let marketplace = Marketplace::builtin()?;
//! let tools = tool_generation::generate_tools(&marketplace, &["Slack".to_string()])?;
//! let executor = ToolExecutor::new(client.clone(), client.clone(), scopes);
//!
//! McpServer::new(McpConfig::default(), tools, executor)
//!     .with_case_tools(CaseTools::new(client))
//!     .run()
//!     .await?;
//! ```

pub mod case_tools;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tool_generation;
pub mod tool_generator;
pub mod tools;
pub mod validator;

// Re-export main types
pub use case_tools::{CaseTool, CaseTools};
pub use error::McpError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tool_generation::{ToolGenerationError, generate_tools};
pub use tool_generator::ToolGenerator;
pub use tools::{RegisteredTool, ToolRegistry};
pub use validator::{ParamValue, ToolInvocation, ValidationError};

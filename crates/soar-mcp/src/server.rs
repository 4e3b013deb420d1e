//! MCP server implementation.
//!
//! This module provides the main MCP server that handles tool discovery
//! and execution over stdio or HTTP.

use crate::case_tools::{CaseTool, CaseTools};
use crate::error::McpError;
use crate::executor::ToolExecutor;
use crate::http_transport::HttpServer;
use crate::protocol::error_codes::{INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::protocol::*;
use crate::tools::ToolRegistry;
use serde_json::{Value, json};
use soar_core::config::mcp::{McpConfig, Transport};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Name reported in `initialize` and `/health`.
pub const SERVER_NAME: &str = "soar-mcp";

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    executor: ToolExecutor,
    case_tools: Option<CaseTools>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(config: McpConfig, tools: ToolRegistry, executor: ToolExecutor) -> Self {
        Self {
            config,
            tools,
            executor,
            case_tools: None,
        }
    }

    /// Also serve the case management tools. They take precedence over a
    /// generated tool of the same name.
    pub fn with_case_tools(mut self, case_tools: CaseTools) -> Self {
        for tool in CaseTool::ALL {
            if self.tools.contains(tool.name()) {
                tracing::warn!(tool = %tool.name(), "Generated tool shadowed by case management tool");
            }
        }
        self.case_tools = Some(case_tools);
        self
    }

    /// Get a reference to the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Every tool definition served by `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = match self.case_tools {
            Some(_) => CaseTools::definitions(),
            None => Vec::new(),
        };
        definitions.extend(
            self.tools
                .definitions()
                .into_iter()
                .filter(|d| self.case_tool(&d.name).is_none()),
        );
        definitions
    }

    pub fn tool_count(&self) -> usize {
        self.definitions().len()
    }

    fn case_tool(&self, name: &str) -> Option<(&CaseTools, CaseTool)> {
        let case_tools = self.case_tools.as_ref()?;
        CaseTool::from_name(name).map(|tool| (case_tools, tool))
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => Arc::new(self).run_http().await,
        }
    }

    /// Run the server with stdio transport, one JSON-RPC message per line,
    /// until stdin closes.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!(tool_count = self.tool_count(), "Starting MCP server with stdio transport");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let response_json = serde_json::to_string(&response)?;

            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Run the server with HTTP transport.
    pub async fn run_http(self: Arc<Self>) -> Result<(), McpError> {
        let address = self.config.bind_address();
        tracing::info!(
            address = %address,
            tool_count = self.tool_count(),
            "Starting MCP server with HTTP transport"
        );

        HttpServer::new(address, self).run().await
    }

    /// Handle one raw message. Parse failures produce a JSON-RPC parse error;
    /// notifications produce nothing.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_message(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable JSON-RPC message");
                Some(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)))
            }
        }
    }

    /// Handle a request or notification.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.definitions(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = if let Some((case_tools, tool)) = self.case_tool(&params.name) {
            case_tools.call(tool, &params.arguments).await
        } else if let Some(tool) = self.tools.get(&params.name) {
            self.executor.call(tool, &params.arguments).await
        } else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Tool not found: {}", params.name));
        };

        let response = result.into_response();
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

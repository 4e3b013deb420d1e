//! In-memory SOAR collaborators that record every call.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use soar_core::{
    ActionEndpoint, ActionRequest, ApiCall, InstanceDirectory, InstanceRecord, Marketplace,
    McpConfig, PermittedScopes, SoarApi,
};
use soar_mcp::{CaseTools, McpServer, RegisteredTool, ToolExecutor, ToolRegistry, generate_tools};
use std::sync::{Arc, Mutex};

/// Directory answer for every lookup.
pub enum Lookup {
    Instances(Vec<InstanceRecord>),
    Error(String),
}

pub struct RecordingDirectory {
    lookup: Lookup,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingDirectory {
    pub fn with_instances(instances: Vec<InstanceRecord>) -> Arc<Self> {
        Arc::new(Self {
            lookup: Lookup::Instances(instances),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn single(identifier: &str) -> Arc<Self> {
        Self::with_instances(vec![InstanceRecord::with_identifier(identifier)])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            lookup: Lookup::Error(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InstanceDirectory for RecordingDirectory {
    async fn list_instances(&self, integration: &str) -> anyhow::Result<Vec<InstanceRecord>> {
        self.calls.lock().unwrap().push(integration.to_string());
        match &self.lookup {
            Lookup::Instances(instances) => Ok(instances.clone()),
            Lookup::Error(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }
}

pub struct RecordingEndpoint {
    response: Result<Value, String>,
    pub requests: Mutex<Vec<ActionRequest>>,
}

impl RecordingEndpoint {
    pub fn responding(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::responding(json!({"status": "Completed"}))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ActionRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl ActionEndpoint for RecordingEndpoint {
    async fn execute_action(&self, request: &ActionRequest) -> anyhow::Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }
}

/// SOAR API that answers by last path segment and records every call.
pub struct RecordingApi {
    responses: Vec<(String, Result<Value, String>)>,
    pub calls: Mutex<Vec<ApiCall>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, segment: &str, response: Value) -> Self {
        self.responses.push((segment.to_string(), Ok(response)));
        self
    }

    pub fn fail(mut self, segment: &str, message: &str) -> Self {
        self.responses.push((segment.to_string(), Err(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> ApiCall {
        self.calls().pop().expect("no call was sent")
    }
}

#[async_trait]
impl SoarApi for RecordingApi {
    async fn send(&self, call: &ApiCall) -> anyhow::Result<Value> {
        self.calls.lock().unwrap().push(call.clone());
        let last = call.path.last().map(String::as_str).unwrap_or_default();
        match self.responses.iter().find(|(segment, _)| segment == last) {
            Some((_, Ok(value))) => Ok(value.clone()),
            Some((_, Err(message))) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(json!({})),
        }
    }
}

pub fn scopes() -> PermittedScopes {
    PermittedScopes::new(["All entities", "Specific entities"])
}

/// Tools for every built-in integration.
pub fn all_tools() -> ToolRegistry {
    let marketplace = Marketplace::builtin().unwrap();
    let names: Vec<String> = marketplace.catalogs().map(|c| c.integration.clone()).collect();
    generate_tools(&marketplace, &names).unwrap()
}

pub fn tool(name: &str) -> RegisteredTool {
    all_tools().get(name).cloned().unwrap_or_else(|| panic!("no tool {}", name))
}

pub fn executor(directory: Arc<RecordingDirectory>, endpoint: Arc<RecordingEndpoint>) -> ToolExecutor {
    ToolExecutor::new(directory, endpoint, scopes())
}

pub fn server(directory: Arc<RecordingDirectory>, endpoint: Arc<RecordingEndpoint>) -> McpServer {
    McpServer::new(McpConfig::default(), all_tools(), executor(directory, endpoint))
}

pub fn case_server(api: Arc<RecordingApi>) -> McpServer {
    server(RecordingDirectory::single("inst-1"), RecordingEndpoint::ok())
        .with_case_tools(CaseTools::new(api))
}

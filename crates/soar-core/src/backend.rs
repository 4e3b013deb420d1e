use crate::case::ApiCall;
use crate::model::{ActionRequest, InstanceRecord};
use async_trait::async_trait;

/// Resolves an integration name to its configured instances.
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// List configured instances of `integration`, in directory order.
    async fn list_instances(&self, integration: &str) -> anyhow::Result<Vec<InstanceRecord>>;
}

/// Performs the remote integration call for a manual action.
#[async_trait]
pub trait ActionEndpoint: Send + Sync {
    /// Submit the request once. The response body is returned as-is.
    async fn execute_action(&self, request: &ActionRequest) -> anyhow::Result<serde_json::Value>;
}

/// Source of the platform's permitted scope names.
#[async_trait]
pub trait ScopeSource: Send + Sync {
    async fn fetch_scopes(&self) -> anyhow::Result<Vec<String>>;
}

/// Sends case management calls and returns the response body.
#[async_trait]
pub trait SoarApi: Send + Sync {
    async fn send(&self, call: &ApiCall) -> anyhow::Result<serde_json::Value>;
}

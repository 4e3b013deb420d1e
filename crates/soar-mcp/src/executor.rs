//! Tool execution engine.
//!
//! One generic adapter runs every catalog action:
//!
//! 1. resolve explicit targets vs. predefined scope,
//! 2. look up the integration's first configured instance,
//! 3. assemble the script parameters under their display names,
//! 4. submit the manual action and relay the response.
//!
//! Every failure becomes a [`Failure`] result; nothing is retried and
//! nothing is raised to the caller.

use crate::protocol::{CallToolResponse, ToolContent};
use crate::tools::RegisteredTool;
use crate::validator::{ScriptParameter, ToolInvocation, ValidationError, validate_arguments};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use soar_core::model::ACTION_PROVIDER;
use soar_core::scope::resolve_scope;
use soar_core::{
    ActionEndpoint, ActionProperties, ActionRequest, Failure, InstanceDirectory, PermittedScopes,
    ScopeSelection, ToolResult,
};
use std::sync::Arc;
use tracing::Instrument;

/// Result of a tool call as handed to the MCP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Whether the call produced a remote response.
    pub success: bool,
    /// The result content.
    pub content: Vec<ToolContent>,
    /// The result as JSON, when there is one.
    pub structured: Option<Value>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Create an error result carrying only a message.
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            content: vec![ToolContent::text(msg.clone())],
            structured: None,
            error: Some(msg),
        }
    }

    /// Argument validation failure, reported before the adapter runs.
    pub fn invalid_arguments(tool: &str, error: &ValidationError) -> Self {
        Self::error(format!("invalid arguments for tool {}: {}", tool, error))
    }

    pub fn into_response(self) -> CallToolResponse {
        CallToolResponse {
            content: self.content,
            structured_content: self.structured.filter(Value::is_object),
            is_error: Some(!self.success),
        }
    }
}

impl From<ToolResult> for ExecutionResult {
    fn from(result: ToolResult) -> Self {
        let value = result.to_value();
        let text = result.to_json_string();
        let error = match &result {
            ToolResult::Failed(failure) => Some(failure.message.clone()),
            ToolResult::Remote(_) => None,
        };
        Self {
            success: !result.is_failure(),
            content: vec![ToolContent::text(text)],
            structured: Some(value),
            error,
        }
    }
}

/// Script parameters serialized as a JSON object in catalog order.
struct OrderedParameters<'a>(&'a [ScriptParameter]);

impl Serialize for OrderedParameters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in self.0 {
            map.serialize_entry(&param.field, &param.value.to_value())?;
        }
        map.end()
    }
}

/// Serialize set parameters into the `ScriptParametersEntityFields` string.
pub fn script_parameters(parameters: &[ScriptParameter]) -> serde_json::Result<String> {
    serde_json::to_string(&OrderedParameters(parameters))
}

/// The tool executor runs catalog actions against the SOAR platform.
#[derive(Clone)]
pub struct ToolExecutor {
    directory: Arc<dyn InstanceDirectory>,
    endpoint: Arc<dyn ActionEndpoint>,
    scopes: PermittedScopes,
}

impl ToolExecutor {
    pub fn new(
        directory: Arc<dyn InstanceDirectory>,
        endpoint: Arc<dyn ActionEndpoint>,
        scopes: PermittedScopes,
    ) -> Self {
        Self {
            directory,
            endpoint,
            scopes,
        }
    }

    pub fn permitted_scopes(&self) -> &PermittedScopes {
        &self.scopes
    }

    /// Validate raw arguments and run the tool.
    pub async fn call(&self, tool: &RegisteredTool, arguments: &Value) -> ExecutionResult {
        match validate_arguments(tool, arguments) {
            Ok(invocation) => self.execute(tool, invocation).await.into(),
            Err(e) => {
                tracing::warn!(tool = %tool.name(), error = %e, "Rejected tool arguments");
                ExecutionResult::invalid_arguments(tool.name(), &e)
            }
        }
    }

    /// Run one validated invocation.
    pub async fn execute(&self, tool: &RegisteredTool, invocation: ToolInvocation) -> ToolResult {
        let span = tracing::info_span!(
            "tool_call",
            tool = %tool.name(),
            action = %tool.action_name(),
            case_id = %invocation.case_id,
            invocation_id = %uuid::Uuid::new_v4(),
        );
        self.run(tool, invocation).instrument(span).await
    }

    async fn run(&self, tool: &RegisteredTool, invocation: ToolInvocation) -> ToolResult {
        let ToolInvocation {
            case_id,
            alert_group_identifiers,
            target_entities,
            scope,
            parameters,
        } = invocation;

        let selection = match resolve_scope(target_entities, &scope, &self.scopes) {
            Ok(selection) => selection,
            Err(failure) => {
                tracing::warn!(%scope, "Invalid scope");
                return failure.into();
            }
        };

        let instances = match self.directory.list_instances(&tool.integration).await {
            Ok(instances) => instances,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch integration instances");
                return Failure::fetching_instance(e).into();
            }
        };
        let Some(first) = instances.first() else {
            tracing::warn!(integration = %tool.integration, "No active instance");
            return Failure::no_active_instance().into();
        };
        let Some(instance) = first.usable_identifier() else {
            tracing::warn!(integration = %tool.integration, "Instance has no identifier");
            return Failure::missing_identifier().into();
        };
        if instances.len() > 1 {
            tracing::debug!(count = instances.len(), %instance, "Several instances configured, using the first");
        }

        let script_parameters = match script_parameters(&parameters) {
            Ok(json) => json,
            Err(e) => return Failure::executing_action(e).into(),
        };

        let action_name = tool.action_name();
        let is_predefined_scope = selection.is_predefined();
        let (target_entities, scope) = match selection {
            ScopeSelection::Entities(entities) => (entities, None),
            ScopeSelection::Predefined(scope) => (Vec::new(), Some(scope)),
        };

        let request = ActionRequest {
            alert_group_identifiers,
            case_id,
            target_entities,
            scope,
            is_predefined_scope,
            action_provider: ACTION_PROVIDER.to_string(),
            action_name: action_name.clone(),
            properties: ActionProperties {
                integration_instance: instance.to_string(),
                script_name: action_name,
                script_parameters,
            },
        };

        match self.endpoint.execute_action(&request).await {
            Ok(response) => {
                tracing::info!("Action executed");
                ToolResult::Remote(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Action execution failed");
                Failure::executing_action(e).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{ChoiceValue, ParamValue};
    use serde_json::json;

    fn param(field: &str, value: ParamValue) -> ScriptParameter {
        ScriptParameter {
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn test_script_parameters_keep_order() {
        let params = vec![
            param("Table Name", ParamValue::String("incident".to_string())),
            param("Mode", ParamValue::Choice(ChoiceValue::Single(json!("Add")))),
            param("Limit", ParamValue::Choice(ChoiceValue::Single(json!(50)))),
            param("Notify", ParamValue::Boolean(true)),
            param("Accounts", ParamValue::StringList(vec!["a".to_string()])),
        ];
        assert_eq!(
            script_parameters(&params).unwrap(),
            r#"{"Table Name":"incident","Mode":"Add","Limit":50,"Notify":true,"Accounts":["a"]}"#
        );
    }

    #[test]
    fn test_script_parameters_empty() {
        assert_eq!(script_parameters(&[]).unwrap(), "{}");
    }

    #[test]
    fn test_json_parameter_passes_through() {
        let params = vec![param("Object Json Data", ParamValue::Json(json!({"state": "2"})))];
        assert_eq!(
            script_parameters(&params).unwrap(),
            r#"{"Object Json Data":{"state":"2"}}"#
        );
    }

    #[test]
    fn test_failure_result_is_error() {
        let result = ExecutionResult::from(ToolResult::Failed(Failure::no_active_instance()));
        assert!(!result.success);
        assert_eq!(
            result.content,
            vec![ToolContent::text(r#"{"Status":"Failed","Message":"No active instance found."}"#)]
        );

        let response = result.into_response();
        assert_eq!(response.is_error, Some(true));
        assert_eq!(
            response.structured_content,
            Some(json!({"Status": "Failed", "Message": "No active instance found."}))
        );
    }

    #[test]
    fn test_remote_result_is_relayed() {
        let result = ExecutionResult::from(ToolResult::Remote(json!({"result": [1, 2]})));
        assert!(result.success);
        assert_eq!(result.structured, Some(json!({"result": [1, 2]})));
        assert_eq!(result.into_response().is_error, Some(false));
    }

    #[test]
    fn test_non_object_response_has_no_structured_content() {
        let result = ExecutionResult::from(ToolResult::Remote(json!([1, 2])));
        let response = result.into_response();
        assert!(response.structured_content.is_none());
        assert_eq!(response.content, vec![ToolContent::text("[1,2]")]);
    }
}

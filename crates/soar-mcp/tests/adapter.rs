//! Behaviour of the generic action adapter against recording mocks.

mod common;

use common::{RecordingDirectory, RecordingEndpoint, executor, tool};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use soar_core::{InstanceRecord, TargetEntity, ToolResult};

fn failure(message: &str) -> Value {
    json!({"Status": "Failed", "Message": message})
}

fn add_comment_args(extra: Value) -> Value {
    let mut args = json!({
        "case_id": "1001",
        "alert_group_identifiers": ["ag-1", "ag-2"],
        "detection_id": "det-9",
        "comment": "triaged"
    });
    for (k, v) in extra.as_object().unwrap() {
        args[k] = v.clone();
    }
    args
}

const ADD_COMMENT: &str = "crowd_strike_falcon_add_comment_to_detection";

#[tokio::test]
async fn predefined_scope_uses_first_instance() {
    let directory = RecordingDirectory::single("abc123");
    let endpoint = RecordingEndpoint::responding(json!({"result": "ok"}));
    let executor = executor(directory.clone(), endpoint.clone());

    let result = executor
        .call(&tool(ADD_COMMENT), &add_comment_args(json!({"scope": "All entities"})))
        .await;

    assert!(result.success);
    assert_eq!(result.structured, Some(json!({"result": "ok"})));
    assert_eq!(*directory.calls.lock().unwrap(), vec!["CrowdStrikeFalcon"]);

    let request = endpoint.last_request();
    assert_eq!(request.properties.integration_instance, "abc123");
    assert!(request.is_predefined_scope);
    assert_eq!(request.scope.as_deref(), Some("All entities"));
    assert!(request.target_entities.is_empty());
}

#[tokio::test]
async fn request_envelope_matches_wire_format() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::single("inst-1"), endpoint.clone());

    executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    let wire = serde_json::to_value(endpoint.last_request()).unwrap();
    assert_eq!(
        wire,
        json!({
            "alertGroupIdentifiers": ["ag-1", "ag-2"],
            "caseId": "1001",
            "targetEntities": [],
            "scope": "All entities",
            "isPredefinedScope": true,
            "actionProvider": "Scripts",
            "actionName": "CrowdStrikeFalcon_Add Comment to Detection",
            "properties": {
                "IntegrationInstance": "inst-1",
                "ScriptName": "CrowdStrikeFalcon_Add Comment to Detection",
                "ScriptParametersEntityFields": "{\"Detection ID\":\"det-9\",\"Comment\":\"triaged\"}"
            }
        })
    );
}

#[tokio::test]
async fn invalid_scope_fails_before_any_lookup() {
    let directory = RecordingDirectory::single("abc123");
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(directory.clone(), endpoint.clone());

    let result = executor
        .call(&tool(ADD_COMMENT), &add_comment_args(json!({"scope": "Bogus"})))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.structured,
        Some(failure(
            "Invalid scope 'Bogus'. Allowed values are: All entities, Specific entities"
        ))
    );
    assert_eq!(directory.call_count(), 0);
    assert!(endpoint.requests().is_empty());
}

#[tokio::test]
async fn explicit_targets_override_scope() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::single("abc123"), endpoint.clone());

    let args = add_comment_args(json!({
        "scope": "Bogus",
        "target_entities": [{"identifier": "10.0.0.1", "entityType": "IP Address"}]
    }));
    let result = executor.call(&tool(ADD_COMMENT), &args).await;

    assert!(result.success);
    let request = endpoint.last_request();
    assert_eq!(request.target_entities, vec![TargetEntity::new("10.0.0.1", "IP Address")]);
    assert!(!request.is_predefined_scope);
    assert_eq!(request.scope, None);

    let wire = serde_json::to_value(&request).unwrap();
    assert_eq!(
        wire["targetEntities"],
        json!([{"Identifier": "10.0.0.1", "EntityType": "IP Address"}])
    );
    assert_eq!(wire["scope"], Value::Null);
}

#[tokio::test]
async fn empty_instance_list() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::with_instances(vec![]), endpoint.clone());

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(result.structured, Some(failure("No active instance found.")));
    assert!(endpoint.requests().is_empty());
}

#[tokio::test]
async fn first_instance_without_identifier() {
    let mut unnamed = InstanceRecord::default();
    unnamed
        .metadata
        .insert("displayName".to_string(), json!("Primary"));
    let directory = RecordingDirectory::with_instances(vec![
        unnamed,
        InstanceRecord::with_identifier("second"),
    ]);
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(directory, endpoint.clone());

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(
        result.structured,
        Some(failure("Instance found but identifier is missing."))
    );
    assert!(endpoint.requests().is_empty());
}

#[tokio::test]
async fn empty_identifier_counts_as_missing() {
    let directory = RecordingDirectory::with_instances(vec![InstanceRecord::with_identifier("")]);
    let executor = executor(directory, RecordingEndpoint::ok());

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(
        result.structured,
        Some(failure("Instance found but identifier is missing."))
    );
}

#[tokio::test]
async fn first_of_several_instances_is_used() {
    let directory = RecordingDirectory::with_instances(vec![
        InstanceRecord::with_identifier("first"),
        InstanceRecord::with_identifier("second"),
    ]);
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(directory, endpoint.clone());

    executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(endpoint.last_request().properties.integration_instance, "first");
}

#[tokio::test]
async fn directory_timeout_is_reported() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::failing("operation timed out"), endpoint.clone());

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(
        result.structured,
        Some(failure("Error fetching instance: operation timed out"))
    );
    assert!(endpoint.requests().is_empty());
}

#[tokio::test]
async fn execution_error_is_reported_once() {
    let endpoint = RecordingEndpoint::failing("HTTP 500: boom");
    let executor = executor(RecordingDirectory::single("abc123"), endpoint.clone());

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert_eq!(
        result.structured,
        Some(failure("Error executing action: HTTP 500: boom"))
    );
    assert_eq!(endpoint.requests().len(), 1);
}

#[tokio::test]
async fn remote_response_is_relayed_verbatim() {
    let response = json!({
        "id": 77,
        "result": {"hosts": [{"name": "ws-1"}]},
        "Status": "Failed"
    });
    let executor = executor(
        RecordingDirectory::single("abc123"),
        RecordingEndpoint::responding(response.clone()),
    );

    let result = executor.call(&tool(ADD_COMMENT), &add_comment_args(json!({}))).await;

    assert!(result.success);
    assert_eq!(result.structured, Some(response));
}

#[tokio::test]
async fn optional_parameters_only_when_set() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::single("abc123"), endpoint.clone());
    let contain = tool("crowd_strike_falcon_contain_endpoint");

    let base = json!({"case_id": "5", "alert_group_identifiers": []});
    executor.call(&contain, &base).await;
    assert_eq!(endpoint.last_request().properties.script_parameters, "{}");

    let with_flag = json!({
        "case_id": "5",
        "alert_group_identifiers": [],
        "customer_id": null,
        "fail_if_timeout": false
    });
    executor.call(&contain, &with_flag).await;
    assert_eq!(
        endpoint.last_request().properties.script_parameters,
        r#"{"Fail If Timeout":false}"#
    );
}

#[tokio::test]
async fn json_parameter_is_forwarded_as_given() {
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(RecordingDirectory::single("sn-1"), endpoint.clone());

    let args = json!({
        "case_id": "5",
        "alert_group_identifiers": [],
        "object_json_data": {"short_description": "Phishing"},
        "record_sys_id": "abc"
    });
    let result = executor.call(&tool("service_now_update_record"), &args).await;

    assert!(result.success);
    let request = endpoint.last_request();
    assert_eq!(request.action_name, "ServiceNow_Update Record");
    let params: Value = serde_json::from_str(&request.properties.script_parameters).unwrap();
    assert_eq!(params["Object Json Data"], json!({"short_description": "Phishing"}));
    assert_eq!(params["Record Sys ID"], "abc");
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_backend() {
    let directory = RecordingDirectory::single("abc123");
    let endpoint = RecordingEndpoint::ok();
    let executor = executor(directory.clone(), endpoint.clone());

    let args = json!({"case_id": "1", "alert_group_identifiers": [], "comment": "x"});
    let result = executor.call(&tool(ADD_COMMENT), &args).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some(
            "invalid arguments for tool crowd_strike_falcon_add_comment_to_detection: missing required argument 'detection_id'"
        )
    );
    assert_eq!(directory.call_count(), 0);
    assert!(endpoint.requests().is_empty());
}

#[tokio::test]
async fn repeated_calls_give_identical_results() {
    let endpoint = RecordingEndpoint::responding(json!({"answer": 42}));
    let executor = executor(RecordingDirectory::single("abc123"), endpoint.clone());
    let args = add_comment_args(json!({}));

    let first = executor.call(&tool(ADD_COMMENT), &args).await;
    let second = executor.call(&tool(ADD_COMMENT), &args).await;

    assert_eq!(first, second);
    let requests = endpoint.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);

    let failing = common::executor(RecordingDirectory::with_instances(vec![]), RecordingEndpoint::ok());
    let a = failing.call(&tool(ADD_COMMENT), &args).await;
    let b = failing.call(&tool(ADD_COMMENT), &args).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn execute_returns_tool_result() {
    let executor = executor(RecordingDirectory::with_instances(vec![]), RecordingEndpoint::ok());
    let add_comment = tool(ADD_COMMENT);
    let invocation =
        soar_mcp::validator::validate_arguments(&add_comment, &add_comment_args(json!({}))).unwrap();

    let result = executor.execute(&add_comment, invocation).await;

    assert!(matches!(result, ToolResult::Failed(ref f) if f.message == "No active instance found."));
}

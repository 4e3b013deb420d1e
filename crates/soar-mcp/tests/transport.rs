//! MCP request handling over the in-process server and the HTTP router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{RecordingDirectory, RecordingEndpoint, server};
use serde_json::{Value, json};
use soar_mcp::JsonRpcRequest;
use soar_mcp::http_transport::create_router;
use std::sync::Arc;
use tower::ServiceExt;

fn call(name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest::new(
        1,
        "tools/call",
        Some(json!({"name": name, "arguments": arguments})),
    )
}

#[tokio::test]
async fn tools_list_advertises_catalog_tools() {
    let server = server(RecordingDirectory::single("x"), RecordingEndpoint::ok());

    let response = server
        .handle_request(JsonRpcRequest::new(1, "tools/list", None))
        .await;
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();

    assert_eq!(tools.len(), 113);
    let ping = tools
        .iter()
        .find(|t| t["name"] == "slack_ping")
        .expect("slack_ping listed");
    assert_eq!(ping["annotations"]["action"], "Slack_Ping");
    assert_eq!(ping["inputSchema"]["properties"]["scope"]["default"], "All entities");
}

#[tokio::test]
async fn tools_call_returns_remote_response() {
    let endpoint = RecordingEndpoint::responding(json!({"is_success": true}));
    let server = server(RecordingDirectory::single("slack-1"), endpoint.clone());

    let response = server
        .handle_request(call(
            "slack_ping",
            json!({"case_id": "12", "alert_group_identifiers": []}),
        ))
        .await;

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"], json!({"is_success": true}));
    assert_eq!(result["content"][0]["type"], "text");
    let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, json!({"is_success": true}));

    assert_eq!(endpoint.last_request().action_name, "Slack_Ping");
}

#[tokio::test]
async fn tools_call_failure_is_a_tool_error() {
    let server = server(RecordingDirectory::with_instances(vec![]), RecordingEndpoint::ok());

    let response = server
        .handle_request(call(
            "slack_ping",
            json!({"case_id": "12", "alert_group_identifiers": []}),
        ))
        .await;

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["structuredContent"],
        json!({"Status": "Failed", "Message": "No active instance found."})
    );
}

#[tokio::test]
async fn tools_call_with_bad_arguments_is_a_tool_error() {
    let server = server(RecordingDirectory::single("x"), RecordingEndpoint::ok());

    let response = server
        .handle_request(call("slack_ping", json!({"alert_group_identifiers": []})))
        .await;

    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["content"][0]["text"],
        "invalid arguments for tool slack_ping: missing required argument 'case_id'"
    );
}

#[tokio::test]
async fn tools_call_without_params_is_invalid() {
    let server = server(RecordingDirectory::single("x"), RecordingEndpoint::ok());

    let response = server
        .handle_request(JsonRpcRequest::new(3, "tools/call", None))
        .await;

    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn ping_and_shutdown() {
    let server = server(RecordingDirectory::single("x"), RecordingEndpoint::ok());

    let ping = server.handle_request(JsonRpcRequest::new(1, "ping", None)).await;
    assert_eq!(ping.result, Some(json!({})));

    let shutdown = server.handle_request(JsonRpcRequest::new(2, "shutdown", None)).await;
    assert!(shutdown.error.is_none());
}

#[tokio::test]
async fn http_mcp_endpoint_round_trip() {
    let endpoint = RecordingEndpoint::ok();
    let app = create_router(Arc::new(server(RecordingDirectory::single("e-1"), endpoint.clone())));

    let body = serde_json::to_string(&call(
        "endgame_ping",
        json!({"case_id": "3", "alert_group_identifiers": ["a"]}),
    ))
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["result"]["isError"], false);
    assert_eq!(endpoint.last_request().properties.integration_instance, "e-1");
}

#[tokio::test]
async fn http_parse_error() {
    let app = create_router(Arc::new(server(RecordingDirectory::single("x"), RecordingEndpoint::ok())));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from("{oops"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["code"], -32700);
}

#[tokio::test]
async fn http_requests_are_served_concurrently() {
    let endpoint = RecordingEndpoint::ok();
    let app = create_router(Arc::new(server(RecordingDirectory::single("x"), endpoint.clone())));

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = serde_json::to_string(&call(
                "slack_ping",
                json!({"case_id": i.to_string(), "alert_group_identifiers": []}),
            ))
            .unwrap();
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let mut case_ids: Vec<String> = endpoint.requests().into_iter().map(|r| r.case_id).collect();
    case_ids.sort();
    assert_eq!(case_ids, vec!["0", "1", "2", "3", "4", "5", "6", "7"]);
}

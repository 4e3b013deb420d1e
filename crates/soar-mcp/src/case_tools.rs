//! Case management tools.
//!
//! A fixed set of tools that read and update cases, alerts and entities
//! through the SOAR REST API. They are listed next to the generated
//! integration tools and report results the same way: the response body on
//! success, a [`Failure`] otherwise.

use crate::executor::ExecutionResult;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::validator::{ValidationError, present, string_list, validate_case_id};
use serde_json::{Map, Value, json};
use soar_core::case::{self, ApiCall, CasePriority, EntitySearch};
use soar_core::{Failure, SoarApi, ToolResult};
use std::sync::Arc;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTool {
    ListCases,
    PostCaseComment,
    ListAlertsByCase,
    ListAlertGroupIdentifiersByCase,
    ListEventsByAlert,
    ChangeCasePriority,
    GetEntitiesByAlertGroupIdentifiers,
    GetEntityDetails,
    SearchEntity,
    GetCaseFullDetails,
}

/// What a validated case tool call sends.
#[derive(Debug, Clone, PartialEq)]
enum CaseRequest {
    Call(ApiCall),
    /// Case, alerts and comments of one case, fetched together.
    FullDetails(String),
}

impl CaseTool {
    pub const ALL: [CaseTool; 10] = [
        CaseTool::ListCases,
        CaseTool::PostCaseComment,
        CaseTool::ListAlertsByCase,
        CaseTool::ListAlertGroupIdentifiersByCase,
        CaseTool::ListEventsByAlert,
        CaseTool::ChangeCasePriority,
        CaseTool::GetEntitiesByAlertGroupIdentifiers,
        CaseTool::GetEntityDetails,
        CaseTool::SearchEntity,
        CaseTool::GetCaseFullDetails,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CaseTool::ListCases => "list_cases",
            CaseTool::PostCaseComment => "post_case_comment",
            CaseTool::ListAlertsByCase => "list_alerts_by_case",
            CaseTool::ListAlertGroupIdentifiersByCase => "list_alert_group_identifiers_by_case",
            CaseTool::ListEventsByAlert => "list_events_by_alert",
            CaseTool::ChangeCasePriority => "change_case_priority",
            CaseTool::GetEntitiesByAlertGroupIdentifiers => "get_entities_by_alert_group_identifiers",
            CaseTool::GetEntityDetails => "get_entity_details",
            CaseTool::SearchEntity => "search_entity",
            CaseTool::GetCaseFullDetails => "get_case_full_details",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            CaseTool::ListCases => "List cases, one page at a time.",
            CaseTool::PostCaseComment => "Add a comment to a case.",
            CaseTool::ListAlertsByCase => "List the alerts of a case.",
            CaseTool::ListAlertGroupIdentifiersByCase => {
                "List the alert group identifiers of a case's alerts."
            }
            CaseTool::ListEventsByAlert => "List the events involved in an alert.",
            CaseTool::ChangeCasePriority => "Change the priority of a case.",
            CaseTool::GetEntitiesByAlertGroupIdentifiers => {
                "Get the entities involved in the given alert groups of a case."
            }
            CaseTool::GetEntityDetails => "Get the full details of one entity.",
            CaseTool::SearchEntity => "Search entities by term, type and flags.",
            CaseTool::GetCaseFullDetails => {
                "Get a case together with its alerts and comments."
            }
        }
    }

    fn properties(&self) -> (Value, Vec<&'static str>) {
        let case_id = json!({"type": "string", "description": "The ID of the case."});
        let page_token = json!({
            "type": "string",
            "description": "Token of the page to fetch, from the previous response."
        });
        match self {
            CaseTool::ListCases => (json!({"page_token": page_token}), vec![]),
            CaseTool::PostCaseComment => (
                json!({
                    "case_id": case_id,
                    "comment": {"type": "string", "description": "Comment text."}
                }),
                vec!["case_id", "comment"],
            ),
            CaseTool::ListAlertsByCase | CaseTool::ListAlertGroupIdentifiersByCase => (
                json!({"case_id": case_id, "page_token": page_token}),
                vec!["case_id"],
            ),
            CaseTool::ListEventsByAlert => (
                json!({
                    "case_id": case_id,
                    "alert_id": {"type": "string", "description": "The ID of the alert."},
                    "page_token": page_token
                }),
                vec!["case_id", "alert_id"],
            ),
            CaseTool::ChangeCasePriority => (
                json!({
                    "case_id": case_id,
                    "case_priority": {
                        "type": "string",
                        "enum": CasePriority::ALL.iter().map(CasePriority::as_str).collect::<Vec<_>>()
                    }
                }),
                vec!["case_id", "case_priority"],
            ),
            CaseTool::GetEntitiesByAlertGroupIdentifiers => (
                json!({
                    "case_id": case_id,
                    "alert_group_identifiers": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Identifiers for the alert groups."
                    }
                }),
                vec!["case_id", "alert_group_identifiers"],
            ),
            CaseTool::GetEntityDetails => (
                json!({
                    "entity_identifier": {"type": "string"},
                    "entity_type": {"type": "string", "description": "e.g. ADDRESS, HOSTNAME"},
                    "environment": {"type": "string"}
                }),
                vec!["entity_identifier", "entity_type", "environment"],
            ),
            CaseTool::SearchEntity => {
                let list = json!({"type": "array", "items": {"type": "string"}});
                (
                    json!({
                        "term": {"type": "string"},
                        "type": list,
                        "is_suspicious": {"type": "boolean"},
                        "is_internal_asset": {"type": "boolean"},
                        "is_enriched": {"type": "boolean"},
                        "network_name": list,
                        "environment_name": list
                    }),
                    vec![],
                )
            }
            CaseTool::GetCaseFullDetails => (json!({"case_id": case_id}), vec!["case_id"]),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        let (properties, required) = self.properties();
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": required
            }),
            annotations: Some(ToolAnnotations {
                title: Some(self.name().to_string()),
                open_world_hint: Some(true),
                ..Default::default()
            }),
        }
    }

    fn request(&self, arguments: &Value) -> Result<CaseRequest, ValidationError> {
        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(ValidationError::NotAnObject),
        };
        let case_id = || validate_case_id(present(args, "case_id"));
        let page_token = || optional_string(args, "page_token");

        let call = match self {
            CaseTool::ListCases => case::list_cases(page_token()?),
            CaseTool::PostCaseComment => {
                case::post_case_comment(&case_id()?, required_string(args, "comment")?)
            }
            CaseTool::ListAlertsByCase => case::list_alerts_by_case(&case_id()?, page_token()?),
            CaseTool::ListAlertGroupIdentifiersByCase => {
                case::list_alert_group_identifiers_by_case(&case_id()?, page_token()?)
            }
            CaseTool::ListEventsByAlert => {
                case::list_events_by_alert(&case_id()?, &required_id(args, "alert_id")?, page_token()?)
            }
            CaseTool::ChangeCasePriority => {
                let value = required_string(args, "case_priority")?;
                let priority = CasePriority::parse(value).ok_or_else(|| ValidationError::InvalidChoice {
                    argument: "case_priority".to_string(),
                    value: value.to_string(),
                    allowed: CasePriority::ALL
                        .iter()
                        .map(CasePriority::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                })?;
                case::change_case_priority(&case_id()?, priority)
            }
            CaseTool::GetEntitiesByAlertGroupIdentifiers => {
                let identifiers = match present(args, "alert_group_identifiers") {
                    Some(value) => string_list("alert_group_identifiers", value)?,
                    None => {
                        return Err(ValidationError::MissingArgument(
                            "alert_group_identifiers".to_string(),
                        ));
                    }
                };
                case::get_entities_by_alert_group_identifiers(&case_id()?, &identifiers)
            }
            CaseTool::GetEntityDetails => case::get_entity_details(
                required_string(args, "entity_identifier")?,
                required_string(args, "entity_type")?,
                required_string(args, "environment")?,
            ),
            CaseTool::SearchEntity => case::search_entity(&EntitySearch {
                term: optional_string(args, "term")?.map(str::to_string),
                entity_types: optional_list(args, "type")?,
                is_suspicious: optional_bool(args, "is_suspicious")?,
                is_internal_asset: optional_bool(args, "is_internal_asset")?,
                is_enriched: optional_bool(args, "is_enriched")?,
                network_names: optional_list(args, "network_name")?,
                environment_names: optional_list(args, "environment_name")?,
            }),
            CaseTool::GetCaseFullDetails => return Ok(CaseRequest::FullDetails(case_id()?)),
        };
        Ok(CaseRequest::Call(call))
    }
}

fn optional_string<'a>(args: &'a Map<String, Value>, name: &str) -> Result<Option<&'a str>, ValidationError> {
    match present(args, name) {
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::invalid_type(name, "a string")),
        None => Ok(None),
    }
}

fn required_string<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, ValidationError> {
    optional_string(args, name)?.ok_or_else(|| ValidationError::MissingArgument(name.to_string()))
}

/// A string or integer identifier, trimmed and non-empty.
fn required_id(args: &Map<String, Value>, name: &str) -> Result<String, ValidationError> {
    let id = match present(args, name) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
        Some(_) => return Err(ValidationError::invalid_type(name, "a string")),
        None => return Err(ValidationError::MissingArgument(name.to_string())),
    };
    if id.is_empty() {
        return Err(ValidationError::invalid_type(name, "a non-empty string"));
    }
    Ok(id)
}

fn optional_bool(args: &Map<String, Value>, name: &str) -> Result<Option<bool>, ValidationError> {
    match present(args, name) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::invalid_type(name, "a boolean")),
        None => Ok(None),
    }
}

fn optional_list(args: &Map<String, Value>, name: &str) -> Result<Option<Vec<String>>, ValidationError> {
    present(args, name).map(|value| string_list(name, value)).transpose()
}

/// Case management tools bound to a SOAR API.
#[derive(Clone)]
pub struct CaseTools {
    api: Arc<dyn SoarApi>,
}

impl CaseTools {
    pub fn new(api: Arc<dyn SoarApi>) -> Self {
        Self { api }
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        CaseTool::ALL.iter().map(CaseTool::definition).collect()
    }

    /// Validate raw arguments and run the tool.
    pub async fn call(&self, tool: CaseTool, arguments: &Value) -> ExecutionResult {
        let request = match tool.request(arguments) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(tool = %tool.name(), error = %e, "Rejected tool arguments");
                return ExecutionResult::invalid_arguments(tool.name(), &e);
            }
        };

        let span = tracing::info_span!(
            "tool_call",
            tool = %tool.name(),
            invocation_id = %uuid::Uuid::new_v4(),
        );
        self.run(request).instrument(span).await.into()
    }

    async fn run(&self, request: CaseRequest) -> ToolResult {
        match request {
            CaseRequest::Call(call) => match self.api.send(&call).await {
                Ok(response) => {
                    tracing::info!("SOAR API call succeeded");
                    ToolResult::Remote(response)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SOAR API call failed");
                    Failure::calling_api(e).into()
                }
            },
            CaseRequest::FullDetails(case_id) => self.full_details(&case_id).await,
        }
    }

    /// The case is required. Alerts or comments that fail to load are
    /// reported as `null`.
    async fn full_details(&self, case_id: &str) -> ToolResult {
        let get_case = case::get_case(case_id);
        let list_alerts = case::list_alerts_by_case(case_id, None);
        let list_comments = case::list_case_comments(case_id);
        let (details, alerts, comments) = tokio::join!(
            self.api.send(&get_case),
            self.api.send(&list_alerts),
            self.api.send(&list_comments),
        );

        let details = match details {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch case");
                return Failure::calling_api(e).into();
            }
        };
        ToolResult::Remote(json!({
            "case_details": details,
            "case_alerts": part("alerts", alerts),
            "case_comments": part("comments", comments),
        }))
    }
}

fn part<E: std::fmt::Display>(name: &str, result: Result<Value, E>) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(part = %name, error = %e, "Failed to fetch case part");
            Value::Null
        }
    }
}

//! Request and result types exchanged with the SOAR platform.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

/// Execution backend tag for marketplace integration actions.
pub const ACTION_PROVIDER: &str = "Scripts";

/// A case entity an action should run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntity {
    #[serde(rename = "Identifier", alias = "identifier")]
    pub identifier: String,
    #[serde(rename = "EntityType", alias = "entityType", alias = "entity_type")]
    pub entity_type: String,
}

impl TargetEntity {
    pub fn new(identifier: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            entity_type: entity_type.into(),
        }
    }
}

/// Properties block of a manual action request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProperties {
    #[serde(rename = "IntegrationInstance")]
    pub integration_instance: String,
    #[serde(rename = "ScriptName")]
    pub script_name: String,
    /// JSON encoded mapping of field display names to values.
    #[serde(rename = "ScriptParametersEntityFields")]
    pub script_parameters: String,
}

/// Envelope posted to the "execute manual action" endpoint.
///
/// Exactly one of `target_entities` (non-empty) and `scope` (set) is used;
/// `is_predefined_scope` records which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub alert_group_identifiers: Vec<String>,
    pub case_id: String,
    pub target_entities: Vec<TargetEntity>,
    pub scope: Option<String>,
    pub is_predefined_scope: bool,
    pub action_provider: String,
    pub action_name: String,
    pub properties: ActionProperties,
}

/// One configured integration instance as reported by the directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl InstanceRecord {
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            metadata: Map::new(),
        }
    }

    /// The identifier, if present and non-empty.
    pub fn usable_identifier(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|id| !id.is_empty())
    }
}

/// Instance directory response body.
///
/// A missing or `null` list means no instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub integration_instances: Vec<InstanceRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Normalized failure returned to the tool caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl Failure {
    pub const STATUS: &'static str = "Failed";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Self::STATUS.to_string(),
            message: message.into(),
        }
    }

    pub fn fetching_instance(error: impl std::fmt::Display) -> Self {
        Self::new(format!("Error fetching instance: {}", error))
    }

    pub fn no_active_instance() -> Self {
        Self::new("No active instance found.")
    }

    pub fn missing_identifier() -> Self {
        Self::new("Instance found but identifier is missing.")
    }

    pub fn executing_action(error: impl std::fmt::Display) -> Self {
        Self::new(format!("Error executing action: {}", error))
    }

    pub fn calling_api(error: impl std::fmt::Display) -> Self {
        Self::new(format!("Error calling SOAR API: {}", error))
    }
}

/// What a tool invocation hands back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Response of the action endpoint, untouched.
    Remote(Value),
    Failed(Failure),
}

impl ToolResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolResult::Failed(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolResult::Remote(value) => value.clone(),
            ToolResult::Failed(failure) => json!(failure),
        }
    }

    /// Compact JSON text. Failures keep `Status` ahead of `Message`.
    pub fn to_json_string(&self) -> String {
        let text = match self {
            ToolResult::Remote(value) => serde_json::to_string(value),
            ToolResult::Failed(failure) => serde_json::to_string(failure),
        };
        text.unwrap_or_else(|_| self.to_value().to_string())
    }
}

impl From<Failure> for ToolResult {
    fn from(failure: Failure) -> Self {
        ToolResult::Failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_action_request_wire_format() {
        let request = ActionRequest {
            alert_group_identifiers: vec!["group-1".to_string()],
            case_id: "42".to_string(),
            target_entities: vec![],
            scope: Some("All entities".to_string()),
            is_predefined_scope: true,
            action_provider: ACTION_PROVIDER.to_string(),
            action_name: "Slack_Ping".to_string(),
            properties: ActionProperties {
                integration_instance: "abc123".to_string(),
                script_name: "Slack_Ping".to_string(),
                script_parameters: "{}".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "alertGroupIdentifiers": ["group-1"],
                "caseId": "42",
                "targetEntities": [],
                "scope": "All entities",
                "isPredefinedScope": true,
                "actionProvider": "Scripts",
                "actionName": "Slack_Ping",
                "properties": {
                    "IntegrationInstance": "abc123",
                    "ScriptName": "Slack_Ping",
                    "ScriptParametersEntityFields": "{}"
                }
            })
        );
    }

    #[test]
    fn test_target_entity_accepts_both_spellings() {
        let lower: TargetEntity =
            serde_json::from_value(json!({"identifier": "10.0.0.1", "entityType": "IP Address"}))
                .unwrap();
        let pascal: TargetEntity =
            serde_json::from_value(json!({"Identifier": "10.0.0.1", "EntityType": "IP Address"}))
                .unwrap();
        assert_eq!(lower, pascal);
        assert_eq!(
            serde_json::to_value(&lower).unwrap(),
            json!({"Identifier": "10.0.0.1", "EntityType": "IP Address"})
        );
    }

    #[test]
    fn test_instance_list_keeps_metadata() {
        let list: InstanceList = serde_json::from_value(json!({
            "integration_instances": [
                {"identifier": "abc123", "environment": "Default"},
                {"environment": "Other"}
            ]
        }))
        .unwrap();

        assert_eq!(list.integration_instances.len(), 2);
        assert_eq!(list.integration_instances[0].usable_identifier(), Some("abc123"));
        assert_eq!(list.integration_instances[0].metadata["environment"], "Default");
        assert_eq!(list.integration_instances[1].usable_identifier(), None);
    }

    #[test]
    fn test_missing_instances_key_is_empty() {
        let list: InstanceList = serde_json::from_value(json!({})).unwrap();
        assert!(list.integration_instances.is_empty());
    }

    #[test]
    fn test_null_instances_is_empty() {
        let list: InstanceList =
            serde_json::from_str(r#"{"integration_instances": null}"#).unwrap();
        assert!(list.integration_instances.is_empty());
    }

    #[test]
    fn test_failure_text_keeps_field_order() {
        let result = ToolResult::from(Failure::missing_identifier());
        assert_eq!(
            result.to_json_string(),
            r#"{"Status":"Failed","Message":"Instance found but identifier is missing."}"#
        );
        assert_eq!(ToolResult::Remote(json!([1, "a"])).to_json_string(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_failure_shape() {
        let result = ToolResult::from(Failure::no_active_instance());
        assert!(result.is_failure());
        assert_eq!(
            result.to_value(),
            json!({"Status": "Failed", "Message": "No active instance found."})
        );
    }
}

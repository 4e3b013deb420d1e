//! Catalog-driven tool generation.
//!
//! Every action of an integration catalog becomes one MCP tool. The input
//! schema always carries the common arguments:
//!
//! | Argument | Type | Required |
//! |----------|------|----------|
//! | `case_id` | string | yes |
//! | `alert_group_identifiers` | array of strings | yes |
//! | `target_entities` | array of `{Identifier, EntityType}` | no |
//! | `scope` | string, default `All entities` | no |
//!
//! followed by one property per action parameter, named after the snake
//! case form of the parameter's display name.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::tools::RegisteredTool;
use serde_json::{Map, Value, json};
use soar_core::{ActionDescriptor, DEFAULT_SCOPE, IntegrationCatalog, ParameterKind, ParameterSpec};

/// Generator for creating MCP tools from one integration catalog.
pub struct ToolGenerator<'a> {
    catalog: &'a IntegrationCatalog,
}

impl<'a> ToolGenerator<'a> {
    pub fn new(catalog: &'a IntegrationCatalog) -> Self {
        Self { catalog }
    }

    /// Generate one tool per catalog action, in catalog order.
    pub fn generate_all(&self) -> Vec<RegisteredTool> {
        let tools: Vec<_> = self
            .catalog
            .actions
            .iter()
            .map(|action| self.generate_action_tool(action))
            .collect();

        tracing::debug!(
            integration = %self.catalog.integration,
            tools = ?tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            "Generated tools"
        );

        tools
    }

    fn generate_action_tool(&self, action: &ActionDescriptor) -> RegisteredTool {
        let integration = &self.catalog.integration;

        let definition = ToolDefinition {
            name: action.tool_name(integration),
            description: Some(action.description.clone()).filter(|d| !d.is_empty()),
            input_schema: input_schema(action),
            annotations: Some(ToolAnnotations {
                title: Some(action.name.clone()),
                integration: Some(integration.clone()),
                action: Some(action.action_name(integration)),
                open_world_hint: Some(true),
            }),
        };

        RegisteredTool {
            definition,
            integration: integration.clone(),
            action: action.clone(),
        }
    }
}

/// JSON Schema for an action's arguments.
pub fn input_schema(action: &ActionDescriptor) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "case_id".to_string(),
        json!({
            "type": "string",
            "description": "The ID of the case."
        }),
    );
    properties.insert(
        "alert_group_identifiers".to_string(),
        json!({
            "type": "array",
            "items": {"type": "string"},
            "description": "Identifiers for the alert groups."
        }),
    );

    let mut required = vec![
        Value::from("case_id"),
        Value::from("alert_group_identifiers"),
    ];

    for param in &action.parameters {
        let name = param.argument_name();
        properties.insert(name.clone(), parameter_schema(param));
        if param.required {
            required.push(Value::from(name));
        }
    }

    properties.insert(
        "target_entities".to_string(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "Identifier": {"type": "string"},
                    "EntityType": {"type": "string"}
                },
                "required": ["Identifier", "EntityType"]
            },
            "default": [],
            "description": "Optional list of specific target entities (Identifier, EntityType) to run the action on."
        }),
    );
    properties.insert(
        "scope".to_string(),
        json!({
            "type": "string",
            "default": DEFAULT_SCOPE,
            "description": "Defines the scope for the action."
        }),
    );

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Schema for one action parameter.
fn parameter_schema(param: &ParameterSpec) -> Value {
    let mut schema = match param.kind {
        ParameterKind::String => json!({"type": "string"}),
        ParameterKind::Boolean => json!({"type": "boolean"}),
        ParameterKind::StringList => json!({
            "type": "array",
            "items": {"type": "string"}
        }),
        ParameterKind::Choice => {
            let item = if param.options.is_empty() {
                json!({"type": ["string", "number", "boolean"]})
            } else {
                json!({"type": "string", "enum": param.options})
            };
            json!({
                "anyOf": [item.clone(), {"type": "array", "items": item}]
            })
        }
        ParameterKind::Json => json!({
            "anyOf": [{"type": "object"}, {"type": "string"}]
        }),
        ParameterKind::EmailContent => json!({
            "type": "object",
            "properties": {
                "Content": {"type": "string"},
                "ContentTemplateName": {"type": ["string", "null"]},
                "HtmlTemplateName": {"type": ["string", "null"]}
            },
            "required": ["Content"]
        }),
    };

    if !param.description.is_empty() {
        if let Value::Object(ref mut map) = schema {
            map.insert("description".to_string(), Value::from(param.description.clone()));
        }
    }

    schema
}

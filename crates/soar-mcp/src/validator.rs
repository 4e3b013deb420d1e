//! Argument validation for tool calls.
//!
//! Turns the untyped `arguments` object of a `tools/call` request into a
//! [`ToolInvocation`]: the common arguments plus one typed [`ParamValue`] per
//! parameter that was set. All shape checks happen here, before the executor
//! touches the network.

use crate::tools::RegisteredTool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use soar_core::{DEFAULT_SCOPE, ParameterKind, ParameterSpec, TargetEntity};

/// Error type for argument validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("argument '{argument}' must be {expected}")]
    InvalidType { argument: String, expected: String },

    #[error("argument 'case_id' must not be empty")]
    EmptyCaseId,

    #[error("invalid value '{value}' for argument '{argument}'. Allowed values are: {allowed}")]
    InvalidChoice {
        argument: String,
        value: String,
        allowed: String,
    },

    #[error("invalid target_entities: {0}")]
    InvalidTargetEntities(String),
}

impl ValidationError {
    pub(crate) fn invalid_type(argument: &str, expected: &str) -> Self {
        Self::InvalidType {
            argument: argument.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Email body argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "ContentTemplateName", default)]
    pub content_template_name: Option<String>,
    #[serde(rename = "HtmlTemplateName", default)]
    pub html_template_name: Option<String>,
}

/// A choice argument: one value or several. Values are JSON scalars
/// (string, number or boolean) and are forwarded as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceValue {
    Single(Value),
    Multiple(Vec<Value>),
}

impl ChoiceValue {
    fn scalar(argument: &str, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
            _ => Err(ValidationError::invalid_type(
                argument,
                "a string, number or boolean, or an array of them",
            )),
        }
    }

    fn parse(argument: &str, value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Self::scalar(argument, item))
                .collect::<Result<Vec<_>, _>>()
                .map(ChoiceValue::Multiple),
            _ => Self::scalar(argument, value).map(ChoiceValue::Single),
        }
    }
}

/// Text form used to match a choice against the catalog options.
fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A validated parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Boolean(bool),
    StringList(Vec<String>),
    Choice(ChoiceValue),
    /// A JSON object, or a string holding one.
    Json(Value),
    EmailContent(EmailContent),
}

impl ParamValue {
    /// Value as sent to the integration script.
    pub fn to_value(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::from(s.as_str()),
            ParamValue::Boolean(b) => Value::Bool(*b),
            ParamValue::StringList(items) => Value::from(items.clone()),
            ParamValue::Choice(ChoiceValue::Single(v)) => v.clone(),
            ParamValue::Choice(ChoiceValue::Multiple(items)) => Value::Array(items.clone()),
            ParamValue::Json(value) => value.clone(),
            ParamValue::EmailContent(content) => serde_json::json!({
                "Content": content.content,
                "ContentTemplateName": content.content_template_name,
                "HtmlTemplateName": content.html_template_name,
            }),
        }
    }
}

/// A set parameter, keyed by the integration's field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptParameter {
    pub field: String,
    pub value: ParamValue,
}

/// Validated arguments of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub case_id: String,
    pub alert_group_identifiers: Vec<String>,
    pub target_entities: Vec<TargetEntity>,
    pub scope: String,
    /// Parameters that were set, in catalog order.
    pub parameters: Vec<ScriptParameter>,
}

/// Validate `arguments` against the tool's action descriptor.
///
/// Absent and `null` optional arguments are treated as unset. Arguments the
/// tool does not declare are ignored.
pub fn validate_arguments(
    tool: &RegisteredTool,
    arguments: &Value,
) -> Result<ToolInvocation, ValidationError> {
    let empty = Map::new();
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(ValidationError::NotAnObject),
    };

    let case_id = validate_case_id(present(args, "case_id"))?;

    let alert_group_identifiers = match present(args, "alert_group_identifiers") {
        Some(value) => string_list("alert_group_identifiers", value)?,
        None => return Err(ValidationError::MissingArgument("alert_group_identifiers".to_string())),
    };

    let target_entities = match present(args, "target_entities") {
        Some(value) => serde_json::from_value::<Vec<TargetEntity>>(value.clone())
            .map_err(|e| ValidationError::InvalidTargetEntities(e.to_string()))?,
        None => Vec::new(),
    };

    let scope = match present(args, "scope") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::invalid_type("scope", "a string")),
        None => DEFAULT_SCOPE.to_string(),
    };

    let mut parameters = Vec::new();
    for spec in &tool.action.parameters {
        let argument = spec.argument_name();
        match present(args, &argument) {
            Some(value) => parameters.push(ScriptParameter {
                field: spec.field.clone(),
                value: validate_parameter(spec, &argument, value)?,
            }),
            None if spec.required => return Err(ValidationError::MissingArgument(argument)),
            None => {}
        }
    }

    for name in args.keys() {
        let declared = soar_core::catalog::COMMON_ARGUMENTS.contains(&name.as_str())
            || tool.action.parameters.iter().any(|p| &p.argument_name() == name);
        if !declared {
            tracing::debug!(tool = %tool.name(), argument = %name, "Ignoring undeclared argument");
        }
    }

    Ok(ToolInvocation {
        case_id,
        alert_group_identifiers,
        target_entities,
        scope,
        parameters,
    })
}

/// The argument, unless absent or null.
pub(crate) fn present<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

pub(crate) fn validate_case_id(value: Option<&Value>) -> Result<String, ValidationError> {
    let case_id = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
        Some(_) => return Err(ValidationError::invalid_type("case_id", "a string")),
        None => return Err(ValidationError::MissingArgument("case_id".to_string())),
    };
    if case_id.is_empty() {
        return Err(ValidationError::EmptyCaseId);
    }
    Ok(case_id)
}

pub(crate) fn string_list(argument: &str, value: &Value) -> Result<Vec<String>, ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::invalid_type(argument, "an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::invalid_type(argument, "an array of strings"))
        })
        .collect()
}

fn validate_parameter(
    spec: &ParameterSpec,
    argument: &str,
    value: &Value,
) -> Result<ParamValue, ValidationError> {
    match spec.kind {
        ParameterKind::String => value
            .as_str()
            .map(|s| ParamValue::String(s.to_string()))
            .ok_or_else(|| ValidationError::invalid_type(argument, "a string")),
        ParameterKind::Boolean => match value {
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(ParamValue::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(ParamValue::Boolean(false)),
            _ => Err(ValidationError::invalid_type(argument, "a boolean")),
        },
        ParameterKind::StringList => string_list(argument, value).map(ParamValue::StringList),
        ParameterKind::Choice => {
            let choice = ChoiceValue::parse(argument, value)?;
            check_options(spec, argument, &choice)?;
            Ok(ParamValue::Choice(choice))
        }
        ParameterKind::Json => match value {
            Value::Object(_) | Value::String(_) => Ok(ParamValue::Json(value.clone())),
            _ => Err(ValidationError::invalid_type(argument, "a JSON object or a string")),
        },
        ParameterKind::EmailContent => serde_json::from_value::<EmailContent>(value.clone())
            .map(ParamValue::EmailContent)
            .map_err(|_| {
                ValidationError::invalid_type(
                    argument,
                    "an object with a string 'Content' and optional 'ContentTemplateName', 'HtmlTemplateName'",
                )
            }),
    }
}

fn check_options(
    spec: &ParameterSpec,
    argument: &str,
    choice: &ChoiceValue,
) -> Result<(), ValidationError> {
    if spec.options.is_empty() {
        return Ok(());
    }
    let values: Vec<String> = match choice {
        ChoiceValue::Single(v) => vec![option_text(v)],
        ChoiceValue::Multiple(items) => items.iter().map(option_text).collect(),
    };
    match values.into_iter().find(|v| !spec.options.contains(v)) {
        Some(value) => Err(ValidationError::InvalidChoice {
            argument: argument.to_string(),
            value,
            allowed: spec.options.join(", "),
        }),
        None => Ok(()),
    }
}

//! Declarative action catalog.
//!
//! Each integration is described by one YAML document listing its actions and
//! their parameters. The MCP layer turns every action into a tool; the
//! executor uses the same descriptor to build the remote request. Nothing
//! about an individual action lives in code.
//!
//! ```yaml
//! integration: CrowdStrikeFalcon
//! actions:
//! - name: Add Comment to Detection
//!   description: Add a comment to the detection in Crowdstrike Falcon.
//!   parameters:
//!   - field: Detection ID
//!     kind: string
//!     required: true
//!     description: Specify the id of the detection.
//! ```

mod builtin;

use crate::naming::{normalize_integration_name, to_snake_case, tool_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Argument names every tool carries in addition to its own parameters.
pub const COMMON_ARGUMENTS: [&str; 4] = ["case_id", "alert_group_identifiers", "target_entities", "scope"];

/// Error type for catalog loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {source_name}: {error}")]
    Yaml {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },

    #[error("Invalid catalog for '{integration}': {reason}")]
    Invalid { integration: String, reason: String },
}

/// Shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Boolean,
    StringList,
    /// Enumerated choice. Accepts a string or a list of strings.
    Choice,
    /// Structured value: a JSON object, or a string holding one.
    Json,
    /// Email body object: `Content`, `ContentTemplateName`, `HtmlTemplateName`.
    EmailContent,
}

/// One action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Human-readable field name the integration script expects.
    pub field: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    /// Allowed values for `choice` parameters. Empty means open.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParameterSpec {
    /// Name of the tool argument carrying this parameter.
    pub fn argument_name(&self) -> String {
        to_snake_case(&self.field)
    }
}

/// One remote action of an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Display name, e.g. "Add Comment to Detection".
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ActionDescriptor {
    /// Remote action name: `<Integration>_<Display Name>`.
    pub fn action_name(&self, integration: &str) -> String {
        format!("{}_{}", integration, self.name)
    }

    pub fn tool_name(&self, integration: &str) -> String {
        tool_name(integration, &self.name)
    }
}

/// All actions of one integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationCatalog {
    /// Integration identifier as known by the SOAR platform.
    pub integration: String,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
}

impl IntegrationCatalog {
    /// Parse and validate a catalog document.
    pub fn from_yaml(content: &str, source_name: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(content).map_err(|error| CatalogError::Yaml {
            source_name: source_name.to_string(),
            error,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Key used to match `--integrations` entries.
    pub fn key(&self) -> String {
        normalize_integration_name(&self.integration)
    }

    pub fn get_action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn invalid(&self, reason: impl Into<String>) -> CatalogError {
        CatalogError::Invalid {
            integration: self.integration.clone(),
            reason: reason.into(),
        }
    }

    /// Check naming invariants the tool layer relies on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.integration.trim().is_empty() {
            return Err(self.invalid("integration name is empty"));
        }

        let mut tools = HashSet::new();
        for action in &self.actions {
            if action.name.trim().is_empty() {
                return Err(self.invalid("action with an empty name"));
            }
            let tool = action.tool_name(&self.integration);
            if !tools.insert(tool.clone()) {
                return Err(self.invalid(format!("duplicate tool name '{}'", tool)));
            }

            let mut arguments = HashSet::new();
            for param in &action.parameters {
                let argument = param.argument_name();
                if COMMON_ARGUMENTS.contains(&argument.as_str()) {
                    return Err(self.invalid(format!(
                        "parameter '{}' of action '{}' collides with common argument '{}'",
                        param.field, action.name, argument
                    )));
                }
                if !arguments.insert(argument.clone()) {
                    return Err(self.invalid(format!(
                        "action '{}' has two parameters named '{}'",
                        action.name, argument
                    )));
                }
                if !param.options.is_empty() && param.kind != ParameterKind::Choice {
                    return Err(self.invalid(format!(
                        "parameter '{}' of action '{}' lists options but is not a choice",
                        param.field, action.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// The set of integration catalogs available to the server, keyed by
/// normalized integration name.
#[derive(Debug, Clone, Default)]
pub struct Marketplace {
    catalogs: BTreeMap<String, IntegrationCatalog>,
}

impl Marketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogs shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut marketplace = Self::new();
        for (source_name, content) in builtin::CATALOGS {
            marketplace.insert(IntegrationCatalog::from_yaml(content, source_name)?);
        }
        Ok(marketplace)
    }

    /// Add (or replace) a catalog.
    pub fn insert(&mut self, catalog: IntegrationCatalog) -> Option<IntegrationCatalog> {
        self.catalogs.insert(catalog.key(), catalog)
    }

    /// Load every `*.yaml` / `*.yml` file in `dir`, replacing catalogs with the
    /// same normalized name. Returns the number of files loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        for path in &paths {
            let catalog = IntegrationCatalog::from_file(path)?;
            tracing::debug!(
                integration = %catalog.integration,
                actions = catalog.actions.len(),
                path = %path.display(),
                "Loaded integration catalog"
            );
            if self.insert(catalog).is_some() {
                tracing::info!(path = %path.display(), "Catalog replaces a previously loaded integration");
            }
        }

        Ok(paths.len())
    }

    /// Look up a catalog by any spelling of its integration name.
    pub fn get(&self, integration: &str) -> Option<&IntegrationCatalog> {
        self.catalogs.get(&normalize_integration_name(integration))
    }

    pub fn catalogs(&self) -> impl Iterator<Item = &IntegrationCatalog> {
        self.catalogs.values()
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

//! Tool generation for a set of enabled integrations.
//!
//! The CLI's `serve` and `tools` commands both go through
//! [`generate_tools`], so the tool list shown offline matches what the
//! server advertises.

use crate::tool_generator::ToolGenerator;
use crate::tools::ToolRegistry;
use soar_core::naming::normalize_integration_name;
use soar_core::{IntegrationCatalog, Marketplace};

/// Error type for tool generation.
#[derive(Debug, thiserror::Error)]
pub enum ToolGenerationError {
    #[error("Tool '{tool}' is generated by both {first} and {second}")]
    DuplicateTool {
        tool: String,
        first: String,
        second: String,
    },
}

/// Catalogs picked for a list of requested integration names.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    pub catalogs: Vec<&'a IntegrationCatalog>,
    /// Requested names with no matching catalog.
    pub unknown: Vec<String>,
}

/// Resolve requested integration names against the marketplace.
///
/// Names are compared after normalization, so `Microsoft Graph Mail`,
/// `MicrosoftGraphMail` and `microsoftgraphmail` all select the same catalog.
/// Blank entries and repeats are skipped.
pub fn select_catalogs<'a>(marketplace: &'a Marketplace, requested: &[String]) -> Selection<'a> {
    let mut selection = Selection::default();
    let mut seen = Vec::new();

    for name in requested {
        let key = normalize_integration_name(name);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);

        match marketplace.get(name) {
            Some(catalog) => selection.catalogs.push(catalog),
            None => selection.unknown.push(name.trim().to_string()),
        }
    }

    selection
}

/// Build the tool registry for the requested integrations.
///
/// Unknown names are logged and skipped. An empty request yields an empty
/// registry.
pub fn generate_tools(
    marketplace: &Marketplace,
    requested: &[String],
) -> Result<ToolRegistry, ToolGenerationError> {
    let selection = select_catalogs(marketplace, requested);

    for name in &selection.unknown {
        tracing::warn!(integration = %name, "No catalog for requested integration, skipping");
    }
    if selection.catalogs.is_empty() {
        tracing::info!("No integrations enabled, no integration tools will be registered");
    }

    let mut registry = ToolRegistry::new();
    for catalog in selection.catalogs {
        let tools = ToolGenerator::new(catalog).generate_all();
        tracing::info!(
            integration = %catalog.integration,
            tool_count = tools.len(),
            "Enabled integration"
        );
        for tool in tools {
            let second = tool.integration.clone();
            if let Some(previous) = registry.register(tool) {
                return Err(ToolGenerationError::DuplicateTool {
                    tool: previous.definition.name,
                    first: previous.integration,
                    second,
                });
            }
        }
    }

    Ok(registry)
}

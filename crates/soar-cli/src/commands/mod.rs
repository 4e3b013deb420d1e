//! CLI command implementations for the SOAR MCP server.

pub mod integrations;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use soar_core::Marketplace;
use std::path::Path;

/// Built-in catalogs, overlaid with the ones found in `catalog_dir`.
pub fn load_marketplace(catalog_dir: Option<&Path>) -> Result<Marketplace> {
    let mut marketplace = Marketplace::builtin().context("Failed to load built-in catalogs")?;

    if let Some(dir) = catalog_dir {
        let loaded = marketplace
            .load_dir(dir)
            .with_context(|| format!("Failed to load catalogs from {:?}", dir))?;
        tracing::info!(dir = %dir.display(), files = loaded, "Loaded additional catalogs");
    }

    Ok(marketplace)
}

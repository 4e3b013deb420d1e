use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::load_marketplace;

#[derive(Args, Debug, Default)]
pub struct IntegrationsArgs {
    /// Directory with additional integration catalogs.
    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,
}

/// List the integrations that can be passed to `serve --integrations`.
pub fn list(args: IntegrationsArgs) -> Result<()> {
    let marketplace = load_marketplace(args.catalog_dir.as_deref())?;

    println!("\n📦 Integrations ({}):", marketplace.len());
    for catalog in marketplace.catalogs() {
        println!("   • {} ({} actions)", catalog.integration, catalog.actions.len());
    }

    println!();
    Ok(())
}

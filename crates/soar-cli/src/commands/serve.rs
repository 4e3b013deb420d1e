use anyhow::{Context, Result};
use clap::Args;
use soar_client::SoarClient;
use soar_core::{PermittedScopes, SoarConfig, Transport};
use soar_mcp::{CaseTool, CaseTools, McpServer, ToolExecutor, generate_tools};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::load_marketplace;

const DEFAULT_CONFIG_FILE: &str = "soar-mcp.yaml";

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to the configuration file (defaults to ./soar-mcp.yaml when present).
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Integrations to enable, comma separated (e.g. "CrowdStrikeFalcon,Slack").
    #[arg(long, value_delimiter = ',')]
    pub integrations: Option<Vec<String>>,

    /// Transport type: stdio or http.
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP host (only for http transport).
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port (only for http transport).
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory with additional integration catalogs.
    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Overlay command line flags on a loaded configuration.
    pub fn apply_to(&self, config: &mut SoarConfig) {
        if let Some(integrations) = &self.integrations {
            config.integrations = integrations
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
        if let Some(transport) = self.transport {
            config.mcp.transport = transport;
        }
        if let Some(host) = &self.host {
            config.mcp.host = host.clone();
        }
        if let Some(port) = self.port {
            config.mcp.port = port;
        }
        if let Some(dir) = &self.catalog_dir {
            config.catalog_dir = Some(dir.clone());
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SoarConfig> {
    match path {
        Some(path) => SoarConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                SoarConfig::from_file(default)
                    .with_context(|| format!("Failed to load configuration from {:?}", default))
            } else {
                Ok(SoarConfig::default())
            }
        }
    }
}

/// File, then environment, then flags.
pub fn resolve_config(args: &ServeArgs) -> Result<SoarConfig> {
    let mut config = load_config(args.config.as_deref())?;
    config.apply_env();
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let client = Arc::new(
        SoarClient::from_config(&config.soar).context("Failed to create SOAR API client")?,
    );
    tracing::info!(url = %client.base_url(), "Connecting to SOAR");

    let scopes = client.get_scopes().await.context(
        "Failed to fetch valid scopes from SOAR, please make sure you have configured the right SOAR credentials",
    )?;
    let scopes = PermittedScopes::new(scopes);
    tracing::info!(scopes = %scopes.allowed_values(), "Fetched permitted scopes");

    let marketplace = load_marketplace(config.catalog_dir.as_deref())?;
    let tools = generate_tools(&marketplace, &config.integrations)
        .context("Failed to generate tools")?;

    let executor = ToolExecutor::new(client.clone(), client.clone(), scopes);

    tracing::info!(
        transport = %config.mcp.transport,
        tool_count = tools.len(),
        case_tool_count = CaseTool::ALL.len(),
        "Starting SOAR MCP server"
    );

    McpServer::new(config.mcp, tools, executor)
        .with_case_tools(CaseTools::new(client))
        .run()
        .await
        .context("MCP server failed")?;

    Ok(())
}

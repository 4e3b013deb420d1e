//! Offline tool introspection. Nothing here talks to the SOAR platform.

use anyhow::{Context, Result};
use clap::Args;
use soar_core::Marketplace;
use soar_mcp::{CaseTool, ToolDefinition, ToolRegistry, generate_tools};
use std::path::PathBuf;

use super::load_marketplace;

#[derive(Args, Debug, Default)]
pub struct ToolsListArgs {
    /// Integrations to list, comma separated. All catalogs when omitted.
    #[arg(long, value_delimiter = ',')]
    pub integrations: Option<Vec<String>>,

    /// Directory with additional integration catalogs.
    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,

    /// Print each tool's input schema.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args, Debug, Default)]
pub struct ToolsDescribeArgs {
    /// Tool name, e.g. crowd_strike_falcon_contain_endpoint
    pub tool: String,

    /// Directory with additional integration catalogs.
    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,
}

fn build_registry(marketplace: &Marketplace, integrations: Option<&[String]>) -> Result<ToolRegistry> {
    let requested: Vec<String> = match integrations {
        Some(names) => names.to_vec(),
        None => marketplace.catalogs().map(|c| c.integration.clone()).collect(),
    };
    generate_tools(marketplace, &requested).context("Failed to generate tools")
}

/// List generated tools.
pub fn list(args: ToolsListArgs) -> Result<()> {
    let marketplace = load_marketplace(args.catalog_dir.as_deref())?;
    let tools = build_registry(&marketplace, args.integrations.as_deref())?;

    println!("\n🔧 Available Tools ({}):", tools.len());

    for tool in tools.list() {
        println!("   • {} ({})", tool.name(), tool.action_name());

        if let Some(summary) = tool
            .definition
            .description
            .as_deref()
            .and_then(|d| d.lines().next())
            .filter(|line| !line.is_empty())
        {
            println!("     {}", summary);
        }

        if args.verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.definition.input_schema)?
            );
        }
    }

    println!("\n📁 Case Management Tools ({}):", CaseTool::ALL.len());
    for tool in CaseTool::ALL {
        let definition = tool.definition();
        println!("   • {}", definition.name);
        if let Some(description) = &definition.description {
            println!("     {}", description);
        }
        if args.verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&definition.input_schema)?
            );
        }
    }

    println!();
    Ok(())
}

fn describe_case_tool(definition: &ToolDefinition) -> Result<()> {
    println!("\nTool: {}", definition.name);
    println!("Kind: case management");
    if let Some(desc) = &definition.description {
        println!("\nDescription: {}", desc);
    }
    println!("\nInput Schema:");
    println!("{}", serde_json::to_string_pretty(&definition.input_schema)?);
    println!();
    Ok(())
}

/// Show detailed schema and field mapping for a specific tool.
pub fn describe(args: ToolsDescribeArgs) -> Result<()> {
    if let Some(tool) = CaseTool::from_name(&args.tool) {
        return describe_case_tool(&tool.definition());
    }

    let marketplace = load_marketplace(args.catalog_dir.as_deref())?;
    let tools = build_registry(&marketplace, None)?;

    let tool = tools
        .get(&args.tool)
        .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", args.tool))?;

    println!("\nTool: {}", tool.name());
    println!("Action: {}", tool.action_name());

    if let Some(desc) = &tool.definition.description {
        println!("\nDescription: {}", desc);
    }

    println!("\nInput Schema:");
    println!("{}", serde_json::to_string_pretty(&tool.definition.input_schema)?);

    if !tool.action.parameters.is_empty() {
        println!("\nScript Parameters:");
        for param in &tool.action.parameters {
            let kind = serde_json::to_value(param.kind)?;
            let mut badges = vec![kind.as_str().unwrap_or("value").to_string()];
            if param.required {
                badges.push("required".to_string());
            }
            println!(
                "  • {} → \"{}\" ({})",
                param.argument_name(),
                param.field,
                badges.join(", ")
            );
        }
    }

    println!();
    Ok(())
}

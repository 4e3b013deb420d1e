use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::integrations::IntegrationsArgs;
use commands::serve::ServeArgs;
use commands::tools::{ToolsDescribeArgs, ToolsListArgs};

#[derive(Parser, Debug)]
#[command(
    name = "soar-mcp",
    version,
    about = "MCP server exposing SOAR marketplace integration actions as tools"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve(ServeArgs),

    /// Tools introspection (list/describe), offline.
    Tools {
        #[command(subcommand)]
        cmd: ToolsCommand,
    },

    /// List the integration catalogs available to the server.
    Integrations(IntegrationsArgs),
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// List generated tools
    List(ToolsListArgs),

    /// Show the schema and field mapping of one tool
    Describe(ToolsDescribeArgs),
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::Serve(args) => args.verbose,
            Command::Tools {
                cmd: ToolsCommand::List(args),
            } => args.verbose,
            _ => false,
        }
    }
}

/// Log to stderr so the stdio transport keeps stdout for protocol messages.
/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.cmd.verbose());

    match cli.cmd {
        Command::Serve(args) => commands::serve::run(args).await?,
        Command::Tools { cmd } => match cmd {
            ToolsCommand::List(args) => commands::tools::list(args)?,
            ToolsCommand::Describe(args) => commands::tools::describe(args)?,
        },
        Command::Integrations(args) => commands::integrations::list(args)?,
    }

    Ok(())
}

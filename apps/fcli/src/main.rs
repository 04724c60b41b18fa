#![warn(clippy::pedantic)]

//! # fcli tool installer
//!
//! The `fcli tool` commands install, list and remove the external Fortify
//! tools that fcli can drive: the ScanCentral SAST client, the Vulnerability
//! Exporter, the FoD Uploader and the BugTracker Utility.
//!
//! ## Subcommands
//!
//! - `tool <tool> install` - Download, verify and install a tool version
//! - `tool <tool> uninstall` - Remove the installed version of a tool
//! - `tool <tool> list` - List published versions and the installed one
//! - `tool definitions update` - Replace the local tool definitions
//!
//! ## Examples
//!
//! Install the default ScanCentral client version:
//! ```bash
//! fcli tool sc-client install --yes
//! ```
//!
//! Install a specific FoD Uploader version into a custom directory:
//! ```bash
//! fcli tool fod-uploader install -v 5.4.0 -d /opt/fortify/fod-uploader
//! ```
//!
//! Refresh the tool definitions:
//! ```bash
//! fcli tool definitions update --source https://example.com/tool-definitions.json
//! ```

mod commands;
mod confirm;

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{definitions, install, list, uninstall};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "FCLI_LOG";

/// Fortify command-line client.
#[derive(Parser)]
#[command(
    name = "fcli",
    author,
    version,
    about = "Fortify command-line client",
    after_help = "\
ENVIRONMENT VARIABLES:
    FORTIFY_HOME            Root directory (default: ~/.fortify)
    FCLI_HOME               fcli data directory (default: $FORTIFY_HOME/fcli)
    FCLI_TOOL_DEFINITIONS   Tool definitions file
    FCLI_PROXY              Proxy URL for tool downloads
    FCLI_LOG                Log filter (default: warn)"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage external Fortify tools.
    #[command(subcommand)]
    Tool(ToolCommands),
}

/// Tools and the definitions subcommand under `fcli tool`.
#[derive(Subcommand)]
pub enum ToolCommands {
    /// ScanCentral SAST client.
    #[command(name = "sc-client")]
    #[command(subcommand)]
    ScClient(ToolAction),

    /// Fortify Vulnerability Exporter.
    #[command(name = "vuln-exporter")]
    #[command(subcommand)]
    VulnExporter(ToolAction),

    /// FoD Uploader.
    #[command(name = "fod-uploader")]
    #[command(subcommand)]
    FodUploader(ToolAction),

    /// Fortify BugTracker Utility.
    #[command(name = "bugtracker-utility")]
    #[command(subcommand)]
    BugtrackerUtility(ToolAction),

    /// Manage tool definitions.
    #[command(subcommand)]
    Definitions(definitions::DefinitionsCommands),
}

/// Actions available for every tool.
#[derive(Subcommand)]
pub enum ToolAction {
    /// Download, verify and install a tool version.
    ///
    /// An existing non-empty install directory is only replaced after
    /// confirmation. Use --yes when running non-interactively.
    Install(install::InstallArgs),

    /// Remove the installed version of a tool.
    Uninstall(uninstall::UninstallArgs),

    /// List published versions and the installed one.
    List,
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Sends log output to stderr, filtered by `FCLI_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Prints the error chain on one line and returns the exit code.
fn handle_error(e: &anyhow::Error) -> i32 {
    eprintln!("Error: {e:#}");
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Commands::Tool(command) = cli.command;
    match command {
        ToolCommands::ScClient(action) => run_action("sc-client", action).await,
        ToolCommands::VulnExporter(action) => run_action("vuln-exporter", action).await,
        ToolCommands::FodUploader(action) => run_action("fod-uploader", action).await,
        ToolCommands::BugtrackerUtility(action) => run_action("bugtracker-utility", action).await,
        ToolCommands::Definitions(command) => definitions::execute(&command).await,
    }
}

async fn run_action(tool: &str, action: ToolAction) -> Result<()> {
    match action {
        ToolAction::Install(args) => install::execute(tool, &args).await,
        ToolAction::Uninstall(args) => uninstall::execute(tool, &args),
        ToolAction::List => list::execute(tool),
    }
}

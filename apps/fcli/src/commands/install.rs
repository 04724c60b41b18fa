//! Install command for `fcli tool <tool>`.
//!
//! ## Usage
//!
//! ```bash
//! fcli tool sc-client install                      # Default version
//! fcli tool sc-client install -v 23.1              # Version or alias
//! fcli tool fod-uploader install -d ./fod --yes    # Custom directory
//! ```
//!
//! On success the install record is printed as JSON, followed by the
//! `INSTALLED` action line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fcli_tool::{
    DEFAULT_VERSION, DigestMismatchAction, FcliPaths, HttpRetriever, InstallRequest, Installer,
    RetrieverConfig, ToolCatalog, tools,
};

use crate::confirm::PromptGate;

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Version to install: a version number, an alias or "default".
    #[clap(short = 'v', long, default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Install directory (default: $FORTIFY_HOME/tools/<tool>/<version>).
    #[clap(short = 'd', long = "install-dir")]
    pub install_dir: Option<PathBuf>,

    /// What to do if the download does not match its published digest.
    #[clap(long = "on-digest-mismatch", default_value = "fail", value_name = "fail|warn")]
    pub on_digest_mismatch: DigestMismatchAction,

    /// Replace a non-empty install directory without asking.
    #[clap(short = 'y', long)]
    pub yes: bool,
}

/// Executes the install command.
///
/// # Process
///
/// 1. Resolve paths and load the tool definitions
/// 2. Run the installer pipeline for the requested version
/// 3. Print the install record
///
/// # Errors
///
/// Returns an error if:
/// - The tool definitions cannot be loaded
/// - The version cannot be resolved
/// - Replacing an existing directory was not confirmed
/// - Download, verification or installation fails
pub async fn execute(tool: &str, args: &InstallArgs) -> Result<()> {
    let integration = tools::integration_for(tool)?;
    let paths = FcliPaths::from_env()?;
    let catalog = ToolCatalog::load(&paths.definitions)?;
    let retriever = HttpRetriever::new(&RetrieverConfig::from_env())?;
    let installer = Installer::new(paths, catalog, retriever, PromptGate::new(args.yes));

    let request = InstallRequest {
        version: args.version.clone(),
        install_dir: args.install_dir.clone(),
        on_digest_mismatch: args.on_digest_mismatch,
    };
    let record = installer.install(integration.as_ref(), &request).await?;

    let json = serde_json::to_string_pretty(&record).context("Failed to format install record")?;
    println!("{json}");
    println!("INSTALLED");
    Ok(())
}

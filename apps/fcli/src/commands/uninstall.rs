//! Uninstall command for `fcli tool <tool>`.
//!
//! Deletes the install directory recorded in the ledger and removes the
//! record. The tool definitions are not needed.

use anyhow::{Context, Result};
use clap::Args;
use fcli_tool::{FcliPaths, InstallLedger, uninstall};

use crate::confirm::PromptGate;

/// Arguments for the uninstall command.
#[derive(Args)]
pub struct UninstallArgs {
    /// Delete the install directory without asking.
    #[clap(short = 'y', long)]
    pub yes: bool,
}

/// Executes the uninstall command.
///
/// # Errors
///
/// Returns an error if the tool is not installed, deletion was not
/// confirmed, or the install directory cannot be removed.
pub fn execute(tool: &str, args: &UninstallArgs) -> Result<()> {
    let paths = FcliPaths::from_env()?;
    let ledger = InstallLedger::new(&paths.ledger);

    let record = uninstall(&ledger, &PromptGate::new(args.yes), tool)?;

    let json = serde_json::to_string_pretty(&record).context("Failed to format install record")?;
    println!("{json}");
    println!("UNINSTALLED");
    Ok(())
}

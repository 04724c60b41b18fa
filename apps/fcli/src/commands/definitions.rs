//! Tool definitions management.
//!
//! ## Usage
//!
//! ```bash
//! fcli tool definitions update --source https://example.com/tool-definitions.json
//! fcli tool definitions update --source ./tool-definitions.json
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use fcli_tool::definitions::update_definitions;
use fcli_tool::{FcliPaths, HttpRetriever, RetrieverConfig};

/// Subcommands of `fcli tool definitions`.
#[derive(Subcommand)]
pub enum DefinitionsCommands {
    /// Replace the local tool definitions from a URL or file.
    Update(UpdateArgs),
}

/// Arguments for `definitions update`.
#[derive(Args)]
pub struct UpdateArgs {
    /// URL or file path of the new tool definitions.
    #[clap(long)]
    pub source: String,
}

/// Executes a definitions subcommand.
///
/// # Errors
///
/// Returns an error if the source cannot be read, is not a valid catalog,
/// or the local definitions file cannot be written.
pub async fn execute(command: &DefinitionsCommands) -> Result<()> {
    match command {
        DefinitionsCommands::Update(args) => update(args).await,
    }
}

async fn update(args: &UpdateArgs) -> Result<()> {
    let paths = FcliPaths::from_env()?;
    let retriever = HttpRetriever::new(&RetrieverConfig::from_env())?;

    println!("Updating tool definitions from {}...", args.source);
    let catalog = update_definitions(&retriever, &args.source, &paths.definitions).await?;

    for (name, entry) in &catalog.tools {
        println!(
            "  {name}: {} versions, default {}",
            entry.versions.len(),
            entry.default_version
        );
    }
    println!("Tool definitions written to {}", paths.definitions.display());
    Ok(())
}

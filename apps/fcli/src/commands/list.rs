//! List command for `fcli tool <tool>`.
//!
//! ## Output Format
//!
//! ```text
//! Version   Aliases   Default   Installed   Install dir
//! 23.1.0    23.1, 23  yes       yes         /home/user/.fortify/tools/sc-client/23.1.0
//! 22.2.1              no        no
//! ```

use anyhow::Result;
use fcli_tool::{FcliPaths, InstallLedger, ToolCatalog, VersionRow, list_versions};

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the tool definitions cannot be loaded, the tool is
/// unknown, or the install record cannot be read.
pub fn execute(tool: &str) -> Result<()> {
    let paths = FcliPaths::from_env()?;
    let catalog = ToolCatalog::load(&paths.definitions)?;
    let ledger = InstallLedger::new(&paths.ledger);

    let rows = list_versions(&catalog, &ledger, tool)?;
    print!("{}", format_rows(&rows));
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn format_rows(rows: &[VersionRow]) -> String {
    let aliases: Vec<String> = rows.iter().map(|r| r.aliases.join(", ")).collect();
    let version_width = rows
        .iter()
        .map(|r| r.version.len())
        .chain(std::iter::once("Version".len()))
        .max()
        .unwrap_or_default();
    let alias_width = aliases
        .iter()
        .map(String::len)
        .chain(std::iter::once("Aliases".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!(
        "{:<version_width$}  {:<alias_width$}  {:<7}  {:<9}  Install dir\n",
        "Version", "Aliases", "Default", "Installed"
    );
    for (row, aliases) in rows.iter().zip(&aliases) {
        let dir = row
            .install_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        let line = format!(
            "{:<version_width$}  {:<alias_width$}  {:<7}  {:<9}  {dir}",
            row.version,
            aliases,
            yes_no(row.is_default),
            yes_no(row.installed),
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

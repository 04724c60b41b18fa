//! Replacing the local tool definitions file.

use std::path::Path;

use crate::catalog::ToolCatalog;
use crate::download::Retriever;
use crate::errors::ToolError;
use crate::ledger::write_json_atomic;

/// Loads a catalog from `source` and atomically writes it to `target`.
///
/// `source` is either an `http(s)://` URL, fetched through `retriever`, or a
/// local file path. The new catalog is validated before anything is written,
/// so a broken source leaves the current definitions in place.
///
/// # Errors
///
/// Returns an error if the source cannot be read, is not a valid catalog,
/// or the target cannot be written.
pub async fn update_definitions<R: Retriever>(
    retriever: &R,
    source: &str,
    target: &Path,
) -> Result<ToolCatalog, ToolError> {
    let text = if is_url(source) {
        let temp = retriever.fetch(source).await?;
        read_text(temp.path())?
    } else {
        read_text(Path::new(source))?
    };

    let catalog = ToolCatalog::from_json(&text)?;
    catalog.validate()?;

    write_json_atomic(target, &catalog).map_err(|e| {
        ToolError::io(
            format!("Failed to write tool definitions {}", target.display()),
            e,
        )
    })?;
    tracing::info!(
        tools = catalog.tools.len(),
        "updated tool definitions at {}",
        target.display()
    );
    Ok(catalog)
}

fn is_url(source: &str) -> bool {
    source.starts_with("https://") || source.starts_with("http://")
}

fn read_text(path: &Path) -> Result<String, ToolError> {
    std::fs::read_to_string(path)
        .map_err(|e| ToolError::io(format!("Failed to read {}", path.display()), e))
}

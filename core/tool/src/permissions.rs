//! Executable permission normalization for installed `bin` directories.

use std::path::Path;

use crate::errors::ToolError;

/// Permission mask applied to every entry below `bin`.
pub const BIN_MODE: u32 = 0o755;

/// Sets [`BIN_MODE`] on `bin_path` and every entry below it.
///
/// Entries that reject the change are skipped with a debug log; a permission
/// problem never fails an otherwise complete install. On platforms without
/// POSIX permissions only the existence check is performed.
///
/// # Errors
///
/// Returns an `InstallError` if `bin_path` is not a directory, which means
/// the install is incomplete.
pub fn normalize(bin_path: &Path) -> Result<(), ToolError> {
    if !bin_path.is_dir() {
        return Err(ToolError::install_error(format!(
            "Install is incomplete: {} is missing",
            bin_path.display()
        )));
    }

    let mut visited = 0usize;
    for entry in walkdir::WalkDir::new(bin_path) {
        match entry {
            Ok(entry) => {
                set_mode(entry.path());
                visited += 1;
            }
            Err(e) => tracing::debug!("skipping unreadable entry below {}: {e}", bin_path.display()),
        }
    }
    tracing::debug!(entries = visited, "normalized permissions in {}", bin_path.display());

    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(BIN_MODE)) {
        tracing::debug!("cannot set permissions on {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
fn set_mode(path: &Path) {
    tracing::debug!("permission bits not supported for {}", path.display());
}

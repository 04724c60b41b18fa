//! ZIP extraction for tool archives.
//!
//! Entries are extracted with their internal directory structure intact.
//! Every entry name is validated before anything is written, so an archive
//! containing a single escaping entry leaves the destination untouched.

use std::path::{Component, Path, PathBuf};

use crate::errors::ToolError;

/// Extracts a ZIP archive into `dest_dir`.
///
/// Creates the destination directory if it does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a valid ZIP file
/// - Any entry would resolve outside `dest_dir`
/// - Directory or file creation fails
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), ToolError> {
    let file = std::fs::File::open(archive_path).map_err(|e| {
        ToolError::io(
            format!("Failed to open archive: {}", archive_path.display()),
            e,
        )
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        ToolError::install_error(format!(
            "Failed to read ZIP archive {}: {e}",
            archive_path.display()
        ))
    })?;

    let entries = validated_entries(&mut archive)?;

    std::fs::create_dir_all(dest_dir).map_err(|e| {
        ToolError::io(
            format!("Failed to create directory: {}", dest_dir.display()),
            e,
        )
    })?;

    for (index, relative_path) in entries {
        let mut entry = archive.by_index(index).map_err(|e| {
            ToolError::install_error(format!("Failed to read archive entry {index}: {e}"))
        })?;
        let output_path = dest_dir.join(&relative_path);

        if entry.is_dir() {
            create_dir(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                create_dir(parent)?;
            }

            let mut outfile = std::fs::File::create(&output_path).map_err(|e| {
                ToolError::io(
                    format!("Failed to create file: {}", output_path.display()),
                    e,
                )
            })?;

            std::io::copy(&mut entry, &mut outfile).map_err(|e| {
                ToolError::io(format!("Failed to extract: {}", output_path.display()), e)
            })?;
        }
    }

    Ok(())
}

/// Returns the relative output path of every entry, or the first entry that
/// would escape the destination.
fn validated_entries<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<Vec<(usize, PathBuf)>, ToolError> {
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            ToolError::install_error(format!("Failed to read archive entry {i}: {e}"))
        })?;

        let Some(entry_path) = entry.enclosed_name() else {
            return Err(ToolError::install_error(format!(
                "Refusing to extract archive entry outside the install directory: {}",
                entry.name()
            )));
        };

        // enclosed_name already filters these; checked again for clarity of intent
        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(ToolError::install_error(format!(
                "Refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            )));
        }

        if entry_path.as_os_str().is_empty() {
            continue;
        }
        entries.push((i, entry_path));
    }

    Ok(entries)
}

fn create_dir(path: &Path) -> Result<(), ToolError> {
    std::fs::create_dir_all(path)
        .map_err(|e| ToolError::io(format!("Failed to create directory: {}", path.display()), e))
}

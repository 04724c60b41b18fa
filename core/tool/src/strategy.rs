//! Materializes a verified artifact under an install path.

use std::path::Path;

use crate::archive::extract_zip;
use crate::descriptor::{InstallDescriptor, InstallType};
use crate::errors::ToolError;

/// Places `artifact` under the install path of `install` according to
/// `install_type`.
///
/// - `ExtractZip` extracts all entries, keeping their directory structure.
/// - `Copy` copies the file as `<install_path>/<last URL segment>`,
///   overwriting an existing file of that name.
///
/// # Errors
///
/// Returns an `InstallError` if extraction or copying fails, including when
/// an archive entry would escape the install path.
pub fn materialize(
    install_type: InstallType,
    install: &InstallDescriptor,
    artifact: &Path,
) -> Result<(), ToolError> {
    match install_type {
        InstallType::ExtractZip => extract_zip(artifact, install.install_path()),
        InstallType::Copy => copy_artifact(install, artifact),
    }
}

fn copy_artifact(install: &InstallDescriptor, artifact: &Path) -> Result<(), ToolError> {
    let file_name = install.download().file_name();
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(ToolError::install_error(format!(
            "Cannot derive a file name from {}",
            install.download().download_url
        )));
    }

    let install_path = install.install_path();
    std::fs::create_dir_all(install_path).map_err(|e| {
        ToolError::io(
            format!("Failed to create directory: {}", install_path.display()),
            e,
        )
    })?;

    let target = install_path.join(file_name);
    std::fs::copy(artifact, &target).map_err(|e| {
        ToolError::io(format!("Failed to copy to {}", target.display()), e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::write_zip;
    use crate::descriptor::{DigestAlgorithm, DownloadDescriptor};

    fn install_for(url: &str, install_path: &Path) -> InstallDescriptor {
        InstallDescriptor::new(
            DownloadDescriptor {
                tool_name: "fod-uploader".to_string(),
                version: "5.4.0".to_string(),
                download_url: url.to_string(),
                digest_algorithm: DigestAlgorithm::Sha256,
                expected_digest: "00".to_string(),
            },
            install_path.to_path_buf(),
        )
    }

    #[test]
    fn copy_uses_remote_file_name_and_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let install_path = temp.path().join("fod");
        std::fs::create_dir_all(&install_path).unwrap();
        std::fs::write(install_path.join("FodUpload.jar"), b"old").unwrap();

        let artifact = temp.path().join("fcli-tool-download123");
        std::fs::write(&artifact, b"new jar").unwrap();

        let install = install_for("https://host/dl/FodUpload.jar", &install_path);
        materialize(InstallType::Copy, &install, &artifact).unwrap();

        assert_eq!(
            std::fs::read(install_path.join("FodUpload.jar")).unwrap(),
            b"new jar"
        );
    }

    #[test]
    fn copy_creates_missing_install_path() {
        let temp = tempfile::tempdir().unwrap();
        let install_path = temp.path().join("a").join("b");
        let artifact = temp.path().join("artifact");
        std::fs::write(&artifact, b"x").unwrap();

        let install = install_for("https://host/tool.jar?sig=1", &install_path);
        materialize(InstallType::Copy, &install, &artifact).unwrap();

        assert!(install_path.join("tool.jar").is_file());
    }

    #[test]
    fn copy_rejects_url_without_file_name() {
        let temp = tempfile::tempdir().unwrap();
        let artifact = temp.path().join("artifact");
        std::fs::write(&artifact, b"x").unwrap();

        let install = install_for("https://host/dl/", &temp.path().join("out"));
        assert!(materialize(InstallType::Copy, &install, &artifact).is_err());
    }

    #[test]
    fn extract_zip_dispatches_to_archive_extraction() {
        let temp = tempfile::tempdir().unwrap();
        let artifact = temp.path().join("artifact.zip");
        write_zip(&artifact, &[("bin/scanctl", b"x"), ("lib/x.jar", b"y")]);
        let install_path = temp.path().join("scanctl");

        let install = install_for("https://host/scanctl-1.2.0.zip", &install_path);
        materialize(InstallType::ExtractZip, &install, &artifact).unwrap();

        assert!(install_path.join("bin/scanctl").is_file());
        assert!(install_path.join("lib/x.jar").is_file());
        assert!(!install_path.join("scanctl-1.2.0.zip").exists());
    }
}

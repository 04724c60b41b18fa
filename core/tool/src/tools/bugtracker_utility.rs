//! Fortify BugTracker Utility.
//!
//! The distribution zip contains the utility jar somewhere below its root;
//! the post-install hook locates it and writes launchers into `bin`.

use std::path::{Path, PathBuf};

use crate::descriptor::{InstallDescriptor, InstallType};
use crate::errors::ToolError;
use crate::integration::ToolIntegration;
use crate::tools::wrapper::write_java_wrappers;

const JAR_PREFIX: &str = "FortifyBugTrackerUtility";
const WRAPPER_NAME: &str = "FortifyBugTrackerUtility";

#[derive(Debug, Default, Clone, Copy)]
pub struct BugTrackerUtility;

impl ToolIntegration for BugTrackerUtility {
    fn tool_name(&self) -> &'static str {
        "bugtracker-utility"
    }

    fn install_type(&self) -> InstallType {
        InstallType::ExtractZip
    }

    fn post_install(&self, install: &InstallDescriptor) -> Result<(), ToolError> {
        let jar = find_jar(install.install_path()).ok_or_else(|| {
            ToolError::post_install(
                self.tool_name(),
                format!(
                    "no {JAR_PREFIX}*.jar found in {}",
                    install.install_path().display()
                ),
            )
        })?;
        tracing::debug!("found {}", jar.display());
        write_java_wrappers(self.tool_name(), install.bin_path(), WRAPPER_NAME, &jar)?;
        Ok(())
    }
}

/// First matching jar in walk order sorted by file name.
fn find_jar(root: &Path) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with(JAR_PREFIX) && n.ends_with(".jar"))
        })
        .map(walkdir::DirEntry::into_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DigestAlgorithm, DownloadDescriptor};

    fn install(root: &Path) -> InstallDescriptor {
        InstallDescriptor::new(
            DownloadDescriptor {
                tool_name: "bugtracker-utility".to_string(),
                version: "4.14".to_string(),
                download_url: "https://host/FortifyBugTrackerUtility-4.14-dist.zip".to_string(),
                digest_algorithm: DigestAlgorithm::Sha256,
                expected_digest: "00".to_string(),
            },
            root.to_path_buf(),
        )
    }

    #[test]
    fn post_install_finds_nested_jar() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("FortifyBugTrackerUtility-4.14");
        std::fs::create_dir_all(&nested).unwrap();
        let jar = nested.join("FortifyBugTrackerUtility-4.14.jar");
        std::fs::write(&jar, b"jar").unwrap();
        let install = install(temp.path());

        BugTrackerUtility.post_install(&install).unwrap();

        let script =
            std::fs::read_to_string(install.bin_path().join("FortifyBugTrackerUtility")).unwrap();
        assert!(script.contains("FortifyBugTrackerUtility-4.14.jar"));
        assert!(install.bin_path().join("FortifyBugTrackerUtility.bat").is_file());
    }

    #[test]
    fn post_install_fails_without_jar() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("README.txt"), b"hi").unwrap();

        let err = BugTrackerUtility
            .post_install(&install(temp.path()))
            .unwrap_err();
        assert!(matches!(err, ToolError::PostInstallFailed { .. }));
        assert!(!temp.path().join("bin").exists());
    }
}

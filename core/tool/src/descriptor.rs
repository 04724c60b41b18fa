//! Descriptor types flowing through the install pipeline.
//!
//! A [`DownloadDescriptor`] is produced by the catalog, wrapped into an
//! [`InstallDescriptor`] once the target directory is known, and finally
//! folded into a [`CombinedDescriptor`] which is the only value persisted
//! to the install ledger.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ToolError;

/// Name of the executables directory below every install path.
pub const BIN_DIR: &str = "bin";

/// Digest algorithms accepted in catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Canonical name as written in tool definitions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(ToolError::catalog(format!(
                "unsupported digest algorithm '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigestAlgorithm> for String {
    fn from(value: DigestAlgorithm) -> Self {
        value.name().to_string()
    }
}

/// What to do when a downloaded artifact does not match its published digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestMismatchAction {
    /// Abort the install.
    #[default]
    Fail,
    /// Log a warning and continue.
    Warn,
}

impl FromStr for DigestMismatchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "warn" => Ok(Self::Warn),
            other => Err(format!(
                "invalid digest mismatch action '{other}' (expected fail or warn)"
            )),
        }
    }
}

/// How an artifact is materialized under the install path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallType {
    /// Extract all archive entries, keeping their directory structure.
    ExtractZip,
    /// Copy the artifact as-is, named after the last URL path segment.
    Copy,
}

/// A resolved catalog entry for one tool version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDescriptor {
    pub tool_name: String,
    /// Concrete version; never the `default` sentinel.
    pub version: String,
    pub download_url: String,
    pub digest_algorithm: DigestAlgorithm,
    pub expected_digest: String,
}

impl DownloadDescriptor {
    /// Returns the final path segment of the download URL.
    ///
    /// Example: `"https://host/dl/FodUpload.jar?x=1"` -> `"FodUpload.jar"`
    #[must_use]
    pub fn file_name(&self) -> &str {
        let without_query = self
            .download_url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.download_url);
        without_query
            .rsplit('/')
            .next()
            .unwrap_or(without_query)
    }
}

/// A download descriptor bound to a concrete install location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDescriptor {
    download: DownloadDescriptor,
    install_path: PathBuf,
    bin_path: PathBuf,
}

impl InstallDescriptor {
    /// Binds `download` to `install_path`, which must already be canonical.
    #[must_use]
    pub fn new(download: DownloadDescriptor, install_path: PathBuf) -> Self {
        let bin_path = install_path.join(BIN_DIR);
        Self {
            download,
            install_path,
            bin_path,
        }
    }

    #[must_use]
    pub fn download(&self) -> &DownloadDescriptor {
        &self.download
    }

    #[must_use]
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Always `install_path/bin`.
    #[must_use]
    pub fn bin_path(&self) -> &Path {
        &self.bin_path
    }
}

/// The persisted install record for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedDescriptor {
    pub tool_name: String,
    pub version: String,
    pub download_url: String,
    pub digest_algorithm: DigestAlgorithm,
    pub expected_digest: String,
    /// Digest computed from the artifact that was actually installed.
    pub actual_digest: String,
    pub install_path: PathBuf,
    pub bin_path: PathBuf,
    pub installed_at: DateTime<Utc>,
}

impl CombinedDescriptor {
    /// Builds the ledger record for a completed install.
    #[must_use]
    pub fn new(install: &InstallDescriptor, actual_digest: impl Into<String>) -> Self {
        let download = install.download();
        Self {
            tool_name: download.tool_name.clone(),
            version: download.version.clone(),
            download_url: download.download_url.clone(),
            digest_algorithm: download.digest_algorithm,
            expected_digest: download.expected_digest.clone(),
            actual_digest: actual_digest.into(),
            install_path: install.install_path().to_path_buf(),
            bin_path: install.bin_path().to_path_buf(),
            installed_at: Utc::now(),
        }
    }

    /// Whether the installed artifact matched the catalog digest.
    #[must_use]
    pub fn digest_verified(&self) -> bool {
        self.expected_digest.eq_ignore_ascii_case(&self.actual_digest)
    }
}

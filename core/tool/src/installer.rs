//! Installer orchestration.
//!
//! An install runs through a fixed sequence of stages:
//!
//! ```text
//! RESOLVING -> CHECKING_EXISTING -> DOWNLOADING -> VERIFYING
//!           -> INSTALLING -> NORMALIZING_PERMISSIONS -> PERSISTING -> DONE
//! ```
//!
//! Any error ends the install. Filesystem and transport errors are wrapped
//! with the tool name and the stage in which they occurred.
//!
//! Confirmation to replace a non-empty install directory is requested in
//! `CHECKING_EXISTING`, before anything is downloaded. The directory is only
//! deleted at the start of `INSTALLING`, once the artifact has passed
//! verification, so a rejected artifact leaves the existing install intact.
//! A failure after that point is not rolled back; re-running the install
//! offers to clear the partial directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{DEFAULT_VERSION, ToolCatalog};
use crate::descriptor::{CombinedDescriptor, DigestMismatchAction, InstallDescriptor};
use crate::download::Retriever;
use crate::errors::ToolError;
use crate::integration::ToolIntegration;
use crate::ledger::InstallLedger;
use crate::paths::{FcliPaths, canonicalize};
use crate::permissions::normalize;
use crate::strategy::materialize;
use crate::verify::verify;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Resolving,
    CheckingExisting,
    Downloading,
    Verifying,
    Installing,
    NormalizingPermissions,
    Persisting,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolving => "resolving",
            Self::CheckingExisting => "checking existing installation",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Installing => "installing",
            Self::NormalizingPermissions => "normalizing permissions",
            Self::Persisting => "persisting",
        })
    }
}

/// Asks the caller before a destructive operation.
pub trait ConfirmationGate {
    /// Returns `true` if the operation described by `prompt` may proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves everything, for `--yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl ConfirmationGate for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Per-invocation install options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Version, alias or `default`.
    pub version: String,
    /// Overrides the default `<root>/tools/<tool>/<version>` location.
    pub install_dir: Option<PathBuf>,
    pub on_digest_mismatch: DigestMismatchAction,
}

impl Default for InstallRequest {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            install_dir: None,
            on_digest_mismatch: DigestMismatchAction::default(),
        }
    }
}

/// Runs installs against one catalog, ledger and retriever.
pub struct Installer<R, G> {
    paths: FcliPaths,
    catalog: ToolCatalog,
    ledger: InstallLedger,
    retriever: R,
    gate: G,
}

impl<R: Retriever, G: ConfirmationGate> Installer<R, G> {
    #[must_use]
    pub fn new(paths: FcliPaths, catalog: ToolCatalog, retriever: R, gate: G) -> Self {
        let ledger = InstallLedger::new(&paths.ledger);
        Self {
            paths,
            catalog,
            ledger,
            retriever,
            gate,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &InstallLedger {
        &self.ledger
    }

    /// Installs a tool and records it in the ledger.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage. The ledger is only
    /// written when every stage has succeeded.
    pub async fn install(
        &self,
        tool: &dyn ToolIntegration,
        request: &InstallRequest,
    ) -> Result<CombinedDescriptor, ToolError> {
        let name = tool.tool_name();

        enter(name, InstallStage::Resolving);
        let install = self.resolve(name, request)?;

        enter(name, InstallStage::CheckingExisting);
        let _lock = self
            .ledger
            .lock(name)
            .map_err(|e| e.in_stage(name, InstallStage::CheckingExisting))?;
        let replace_existing = self
            .check_existing(&install)
            .map_err(|e| e.in_stage(name, InstallStage::CheckingExisting))?;

        enter(name, InstallStage::Downloading);
        let download = install.download();
        let artifact = self
            .retriever
            .fetch(&download.download_url)
            .await
            .map_err(|e| e.in_stage(name, InstallStage::Downloading))?;

        enter(name, InstallStage::Verifying);
        let verified = verify(
            artifact.path(),
            download.digest_algorithm,
            &download.expected_digest,
            request.on_digest_mismatch,
        )
        .map_err(|e| e.in_stage(name, InstallStage::Verifying))?;

        enter(name, InstallStage::Installing);
        if replace_existing {
            remove_install_dir(install.install_path())
                .map_err(|e| e.in_stage(name, InstallStage::Installing))?;
        }
        materialize(tool.install_type(), &install, artifact.path())
            .map_err(|e| e.in_stage(name, InstallStage::Installing))?;
        if let Err(e) = artifact.close() {
            tracing::debug!("failed to remove temporary download: {e}");
        }
        tool.post_install(&install)
            .map_err(|e| e.in_stage(name, InstallStage::Installing))?;

        enter(name, InstallStage::NormalizingPermissions);
        normalize(install.bin_path())
            .map_err(|e| e.in_stage(name, InstallStage::NormalizingPermissions))?;

        enter(name, InstallStage::Persisting);
        let record = CombinedDescriptor::new(&install, verified.actual());
        self.ledger
            .save(&record)
            .map_err(|e| e.in_stage(name, InstallStage::Persisting))?;

        tracing::info!(
            tool = name,
            version = %record.version,
            "installed to {}",
            record.install_path.display()
        );
        Ok(record)
    }

    fn resolve(&self, name: &str, request: &InstallRequest) -> Result<InstallDescriptor, ToolError> {
        let download = self.catalog.resolve(name, &request.version)?;
        let requested = request
            .install_dir
            .clone()
            .unwrap_or_else(|| self.paths.default_install_dir(name, &download.version));
        let install_path = canonicalize(&requested)
            .map_err(|e| {
                ToolError::io(
                    format!("Failed to resolve install directory {}", requested.display()),
                    e,
                )
            })
            .map_err(|e| e.in_stage(name, InstallStage::Resolving))?;
        Ok(InstallDescriptor::new(download, install_path))
    }

    /// Returns whether a non-empty install directory must be cleared, after
    /// the gate has approved it.
    fn check_existing(&self, install: &InstallDescriptor) -> Result<bool, ToolError> {
        let path = install.install_path();
        if !is_non_empty(path)? {
            return Ok(false);
        }

        let download = install.download();
        let prompt = format!(
            "{} is not empty. Delete it and install {} {}?",
            path.display(),
            download.tool_name,
            download.version
        );
        if self.gate.confirm(&prompt) {
            Ok(true)
        } else {
            Err(ToolError::not_confirmed("deleting", path))
        }
    }
}

fn enter(tool: &str, stage: InstallStage) {
    tracing::info!(tool, "{stage}");
}

fn is_non_empty(path: &Path) -> Result<bool, ToolError> {
    if !path.exists() {
        return Ok(false);
    }
    if !path.is_dir() {
        return Err(ToolError::install_error(format!(
            "{} exists and is not a directory",
            path.display()
        )));
    }
    let mut entries = std::fs::read_dir(path)
        .map_err(|e| ToolError::io(format!("Failed to read {}", path.display()), e))?;
    Ok(entries.next().is_some())
}

fn remove_install_dir(path: &Path) -> Result<(), ToolError> {
    tracing::info!("removing {}", path.display());
    std::fs::remove_dir_all(path)
        .map_err(|e| ToolError::io(format!("Failed to remove {}", path.display()), e))
}

/// Removes an installed tool and its ledger record.
///
/// # Errors
///
/// - `NotInstalled` if the ledger has no record for `tool`
/// - `NotConfirmed` if the gate refuses; nothing is deleted
/// - `InstallError` or `Ledger` if deletion fails
pub fn uninstall<G: ConfirmationGate>(
    ledger: &InstallLedger,
    gate: &G,
    tool: &str,
) -> Result<CombinedDescriptor, ToolError> {
    let _lock = ledger.lock(tool)?;
    let record = ledger
        .load(tool)?
        .ok_or_else(|| ToolError::not_installed(tool))?;

    let prompt = format!(
        "Delete {} {} from {}?",
        record.tool_name,
        record.version,
        record.install_path.display()
    );
    if !gate.confirm(&prompt) {
        return Err(ToolError::not_confirmed("deleting", &record.install_path));
    }

    if record.install_path.exists() {
        remove_install_dir(&record.install_path)?;
    } else {
        tracing::warn!(
            "{} no longer exists; removing install record only",
            record.install_path.display()
        );
    }
    ledger.remove(tool)?;
    Ok(record)
}

/// One published version of a tool, with its install state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRow {
    pub version: String,
    pub aliases: Vec<String>,
    pub is_default: bool,
    pub installed: bool,
    pub install_dir: Option<PathBuf>,
}

/// Lists catalog versions of `tool`, newest first, marking the installed one.
///
/// # Errors
///
/// Returns `UnknownTool` if the catalog has no such tool, or a `Ledger`
/// error if the install record cannot be read.
pub fn list_versions(
    catalog: &ToolCatalog,
    ledger: &InstallLedger,
    tool: &str,
) -> Result<Vec<VersionRow>, ToolError> {
    let entry = catalog.tool(tool)?;
    let record = ledger.load(tool)?;

    Ok(entry
        .sorted_versions()
        .into_iter()
        .map(|v| {
            let installed = record.as_ref().filter(|r| r.version == v.version);
            VersionRow {
                version: v.version.clone(),
                aliases: v.aliases.clone(),
                is_default: v.version == entry.default_version,
                installed: installed.is_some(),
                install_dir: installed.map(|r| r.install_path.clone()),
            }
        })
        .collect())
}

//! The capability interface every installable tool implements.

use crate::descriptor::{InstallDescriptor, InstallType};
use crate::errors::ToolError;

/// Tool-specific behavior plugged into the installer.
///
/// The installer knows nothing about concrete tools beyond these three
/// operations.
pub trait ToolIntegration: Send + Sync {
    /// Catalog key and ledger key of the tool, e.g. `sc-client`.
    fn tool_name(&self) -> &'static str;

    /// How the downloaded artifact is materialized.
    fn install_type(&self) -> InstallType;

    /// Runs after the artifact is materialized and before permissions are
    /// normalized. The default does nothing.
    ///
    /// # Errors
    ///
    /// Returns `PostInstallFailed` if the tool-specific setup fails; the
    /// install is then aborted without a ledger record.
    fn post_install(&self, install: &InstallDescriptor) -> Result<(), ToolError> {
        let _ = install;
        Ok(())
    }
}

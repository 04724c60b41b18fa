#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Versioned tool installer for fcli.
//!
//! Installs external Fortify tools (ScanCentral client, FoD Uploader and
//! others) from a catalog of published versions:
//!
//! 1. Resolve a version token to a [`DownloadDescriptor`]
//! 2. Confirm replacement of a non-empty install directory
//! 3. Download the artifact to a temporary file
//! 4. Verify its digest under a [`DigestMismatchAction`] policy
//! 5. Extract or copy it, then run the tool's post-install hook
//! 6. Normalize permissions below `bin`
//! 7. Record the install in the [`InstallLedger`]
//!
//! [`Installer`] sequences these steps. Tool-specific behavior is supplied
//! through [`ToolIntegration`]; see [`tools`] for the built-in tools.

pub mod archive;
pub mod catalog;
pub mod definitions;
pub mod descriptor;
pub mod download;
pub mod errors;
pub mod installer;
pub mod integration;
pub mod ledger;
pub mod paths;
pub mod permissions;
pub mod strategy;
pub mod tools;
pub mod verify;

pub use catalog::{DEFAULT_VERSION, ToolCatalog};
pub use descriptor::{
    CombinedDescriptor, DigestAlgorithm, DigestMismatchAction, DownloadDescriptor,
    InstallDescriptor, InstallType,
};
pub use download::{HttpRetriever, Retriever, RetrieverConfig};
pub use errors::ToolError;
pub use installer::{
    AssumeYes, ConfirmationGate, InstallRequest, InstallStage, Installer, VersionRow,
    list_versions, uninstall,
};
pub use integration::ToolIntegration;
pub use ledger::InstallLedger;
pub use paths::FcliPaths;

//! Error types for the tool installer.
//!
//! `ToolError` covers every way a resolve, install or uninstall can fail.
//! None of the variants are retried; each one ends the current invocation.

use std::path::PathBuf;

use thiserror::Error;

use crate::installer::InstallStage;

/// Boxed error used for transport failures, whose concrete type depends on
/// the retriever in use.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Consolidated error type for tool installer operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The catalog has no entry for the requested tool.
    #[error("unknown tool: {tool}")]
    UnknownTool {
        /// The tool name that was looked up.
        tool: String,
    },

    /// The requested version token does not match any published version.
    #[error("unknown version '{version}' for {tool} (available: {})", available.join(", "))]
    UnknownVersion {
        /// The tool the version was requested for.
        tool: String,
        /// The version token as given by the caller.
        version: String,
        /// Published versions, for the diagnostic.
        available: Vec<String>,
    },

    /// The catalog itself is malformed.
    #[error("tool catalog error: {message}")]
    Catalog {
        /// Description of the problem.
        message: String,
    },

    /// The artifact could not be fetched.
    #[error("download of {url} failed: {message}")]
    RetrievalFailed {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The artifact digest differs from the catalog digest.
    #[error("digest mismatch ({algorithm}): expected {expected}, actual {actual}")]
    DigestMismatch {
        /// Name of the digest algorithm.
        algorithm: String,
        /// Digest published in the catalog.
        expected: String,
        /// Digest computed from the downloaded file.
        actual: String,
    },

    /// The caller declined to confirm a destructive operation.
    #[error("{action} {} was not confirmed; re-run with --yes to confirm", path.display())]
    NotConfirmed {
        /// What would have been done.
        action: String,
        /// The path that would have been affected.
        path: PathBuf,
    },

    /// Materializing the artifact failed.
    #[error("{message}")]
    InstallError {
        /// Description of the failure.
        message: String,
        /// The underlying I/O error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The tool-specific post-install hook failed.
    #[error("post-install step for {tool} failed: {message}")]
    PostInstallFailed {
        /// The tool whose hook failed.
        tool: String,
        /// Description of the failure.
        message: String,
        /// The underlying I/O error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Reading or writing an install record failed.
    #[error("install ledger error: {message}")]
    Ledger {
        /// Description of the failure.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// No install record exists for the tool.
    #[error("{tool} is not installed")]
    NotInstalled {
        /// The tool that was looked up.
        tool: String,
    },

    /// A filesystem or transport failure, annotated with where it happened.
    #[error("installing {tool} failed while {stage}")]
    Stage {
        /// The tool being installed.
        tool: String,
        /// The pipeline stage that failed.
        stage: InstallStage,
        /// The original error.
        #[source]
        source: Box<ToolError>,
    },
}

impl ToolError {
    /// Creates a new `UnknownTool` error.
    #[must_use]
    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        Self::UnknownTool { tool: tool.into() }
    }

    /// Creates a new `UnknownVersion` error.
    #[must_use]
    pub fn unknown_version(
        tool: impl Into<String>,
        version: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnknownVersion {
            tool: tool.into(),
            version: version.into(),
            available,
        }
    }

    /// Creates a new `Catalog` error.
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Creates a new `RetrievalFailed` error without an underlying cause.
    #[must_use]
    pub fn retrieval_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RetrievalFailed {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `RetrievalFailed` error with the transport error attached.
    #[must_use]
    pub fn retrieval_failed_with_source(
        url: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::RetrievalFailed {
            url: url.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `DigestMismatch` error.
    #[must_use]
    pub fn digest_mismatch(
        algorithm: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::DigestMismatch {
            algorithm: algorithm.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `NotConfirmed` error.
    #[must_use]
    pub fn not_confirmed(action: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotConfirmed {
            action: action.into(),
            path: path.into(),
        }
    }

    /// Creates a new `InstallError` without an underlying cause.
    #[must_use]
    pub fn install_error(message: impl Into<String>) -> Self {
        Self::InstallError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `InstallError` from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::InstallError {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `PostInstallFailed` error.
    #[must_use]
    pub fn post_install(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PostInstallFailed {
            tool: tool.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `PostInstallFailed` error from an I/O error.
    #[must_use]
    pub fn post_install_io(
        tool: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::PostInstallFailed {
            tool: tool.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `Ledger` error.
    #[must_use]
    pub fn ledger(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Ledger {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `NotInstalled` error.
    #[must_use]
    pub fn not_installed(tool: impl Into<String>) -> Self {
        Self::NotInstalled { tool: tool.into() }
    }

    /// Attaches tool and stage context to filesystem and transport errors.
    ///
    /// Resolution, integrity, confirmation and hook errors already name
    /// their cause and are returned unchanged.
    #[must_use]
    pub fn in_stage(self, tool: &str, stage: InstallStage) -> Self {
        match self {
            Self::RetrievalFailed { .. } | Self::InstallError { .. } | Self::Ledger { .. } => {
                Self::Stage {
                    tool: tool.to_string(),
                    stage,
                    source: Box::new(self),
                }
            }
            other => other,
        }
    }
}

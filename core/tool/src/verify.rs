//! Digest verification for downloaded artifacts.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::descriptor::{DigestAlgorithm, DigestMismatchAction};
use crate::errors::ToolError;

/// Outcome of a verification that did not abort the install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verified {
    /// The computed digest equals the expected one.
    Match {
        /// The computed digest.
        actual: String,
    },
    /// The digests differ, but the policy allowed the install to continue.
    MismatchAccepted {
        /// The computed digest.
        actual: String,
    },
}

impl Verified {
    /// The digest computed from the artifact.
    #[must_use]
    pub fn actual(&self) -> &str {
        match self {
            Self::Match { actual } | Self::MismatchAccepted { actual } => actual,
        }
    }
}

/// Computes the digest of `file_path` and checks it against `expected`.
///
/// On mismatch, `on_mismatch` decides between a `DigestMismatch` error and a
/// logged warning.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or read
/// - The digests differ and `on_mismatch` is `Fail`
pub fn verify(
    file_path: &Path,
    algorithm: DigestAlgorithm,
    expected: &str,
    on_mismatch: DigestMismatchAction,
) -> Result<Verified, ToolError> {
    let actual = compute_digest(file_path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        tracing::debug!(%algorithm, digest = %actual, "digest verified");
        return Ok(Verified::Match { actual });
    }
    decide_mismatch(on_mismatch, algorithm, expected, actual)
}

/// Applies the mismatch policy. There are exactly two outcomes: proceed with
/// a warning, or a fatal error.
fn decide_mismatch(
    on_mismatch: DigestMismatchAction,
    algorithm: DigestAlgorithm,
    expected: &str,
    actual: String,
) -> Result<Verified, ToolError> {
    match on_mismatch {
        DigestMismatchAction::Fail => Err(ToolError::digest_mismatch(
            algorithm.name(),
            expected,
            actual,
        )),
        DigestMismatchAction::Warn => {
            tracing::warn!(
                "Digest mismatch\n Expected: {expected}\n Actual:   {actual}\n\
                 Continuing because --on-digest-mismatch=warn"
            );
            Ok(Verified::MismatchAccepted { actual })
        }
    }
}

/// Computes the digest of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_digest(file_path: &Path, algorithm: DigestAlgorithm) -> Result<String, ToolError> {
    match algorithm {
        DigestAlgorithm::Sha256 => hash_file::<Sha256>(file_path),
        DigestAlgorithm::Sha384 => hash_file::<Sha384>(file_path),
        DigestAlgorithm::Sha512 => hash_file::<Sha512>(file_path),
    }
}

fn hash_file<D: Digest>(file_path: &Path) -> Result<String, ToolError> {
    let mut file = std::fs::File::open(file_path).map_err(|e| {
        ToolError::io(
            format!("Failed to open file for digest: {}", file_path.display()),
            e,
        )
    })?;

    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| {
            ToolError::io(
                format!("Failed to read file for digest: {}", file_path.display()),
                e,
            )
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

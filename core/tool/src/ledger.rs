//! Install ledger: one JSON record per tool name.
//!
//! Records live in `<ledger dir>/<tool>.json` and are replaced atomically by
//! writing a sibling temporary file and renaming it into place. A later
//! install of the same tool overwrites the previous record.
//!
//! `<ledger dir>/<tool>.lock` serializes installs and uninstalls of one tool
//! across processes. The lock is held for as long as the returned
//! [`LedgerLock`] lives.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::descriptor::CombinedDescriptor;
use crate::errors::ToolError;

const RECORD_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

/// Persistent store of install records keyed by tool name.
#[derive(Debug, Clone)]
pub struct InstallLedger {
    dir: PathBuf,
}

/// Exclusive per-tool lock, released when dropped.
#[derive(Debug)]
pub struct LedgerLock {
    _file: File,
}

impl InstallLedger {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, tool: &str) -> PathBuf {
        self.dir.join(format!("{tool}.{RECORD_EXTENSION}"))
    }

    /// Blocks until the exclusive lock for `tool` is acquired.
    ///
    /// # Errors
    ///
    /// Returns a `Ledger` error if the lock file cannot be created or locked.
    pub fn lock(&self, tool: &str) -> Result<LedgerLock, ToolError> {
        self.ensure_dir()?;
        let path = self.dir.join(format!("{tool}.{LOCK_EXTENSION}"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                ToolError::ledger(format!("Failed to open lock file {}", path.display()), e)
            })?;

        tracing::debug!("waiting for lock {}", path.display());
        FileExt::lock_exclusive(&file).map_err(|e| {
            ToolError::ledger(format!("Failed to lock {}", path.display()), e)
        })?;

        Ok(LedgerLock { _file: file })
    }

    /// Reads the record for `tool`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a `Ledger` error if the record exists but cannot be read or
    /// parsed.
    pub fn load(&self, tool: &str) -> Result<Option<CombinedDescriptor>, ToolError> {
        let path = self.record_path(tool);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ToolError::ledger(
                    format!("Failed to read install record {}", path.display()),
                    e,
                ));
            }
        };
        serde_json::from_str(&text).map(Some).map_err(|e| {
            ToolError::ledger(
                format!("Corrupt install record {}", path.display()),
                e,
            )
        })
    }

    /// Writes `record`, replacing any previous record for the same tool.
    ///
    /// # Errors
    ///
    /// Returns a `Ledger` error if the record cannot be written.
    pub fn save(&self, record: &CombinedDescriptor) -> Result<(), ToolError> {
        let path = self.record_path(&record.tool_name);
        write_json_atomic(&path, record).map_err(|e| {
            ToolError::ledger(
                format!("Failed to write install record {}", path.display()),
                e,
            )
        })
    }

    /// Removes the record for `tool`. A missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns a `Ledger` error if the record exists but cannot be removed.
    pub fn remove(&self, tool: &str) -> Result<(), ToolError> {
        let path = self.record_path(tool);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ToolError::ledger(
                format!("Failed to remove install record {}", path.display()),
                e,
            )),
        }
    }

    fn ensure_dir(&self) -> Result<(), ToolError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ToolError::ledger(
                format!("Failed to create ledger directory {}", self.dir.display()),
                e,
            )
        })
    }
}

/// Writes `value` as pretty JSON to a temporary sibling, then renames it
/// over `path`.
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DigestAlgorithm, DownloadDescriptor, InstallDescriptor};

    fn record(tool: &str, version: &str) -> CombinedDescriptor {
        let install = InstallDescriptor::new(
            DownloadDescriptor {
                tool_name: tool.to_string(),
                version: version.to_string(),
                download_url: format!("https://host/{tool}-{version}.zip"),
                digest_algorithm: DigestAlgorithm::Sha256,
                expected_digest: "abc".to_string(),
            },
            PathBuf::from(format!("/opt/{tool}/{version}")),
        );
        CombinedDescriptor::new(&install, "abc")
    }

    #[test]
    fn load_returns_none_for_unknown_tool() {
        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path().join("state"));
        assert!(ledger.load("sc-client").unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_record() {
        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path().join("state"));
        let saved = record("sc-client", "23.1.0");

        ledger.save(&saved).unwrap();

        assert_eq!(ledger.load("sc-client").unwrap(), Some(saved));
        assert!(!temp.path().join("state/sc-client.json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path());

        ledger.save(&record("sc-client", "22.2.0")).unwrap();
        ledger.save(&record("sc-client", "23.1.0")).unwrap();

        let loaded = ledger.load("sc-client").unwrap().unwrap();
        assert_eq!(loaded.version, "23.1.0");
    }

    #[test]
    fn record_file_uses_camel_case_keys() {
        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path());
        ledger.save(&record("scanctl", "1.2.0")).unwrap();

        let text = std::fs::read_to_string(temp.path().join("scanctl.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["toolName"], "scanctl");
        assert_eq!(value["installPath"], "/opt/scanctl/1.2.0");
        assert_eq!(value["binPath"], "/opt/scanctl/1.2.0/bin");
    }

    #[test]
    fn remove_deletes_record_and_tolerates_missing() {
        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path());
        ledger.save(&record("vuln-exporter", "2.0.0")).unwrap();

        ledger.remove("vuln-exporter").unwrap();
        assert!(ledger.load("vuln-exporter").unwrap().is_none());
        ledger.remove("vuln-exporter").unwrap();
    }

    #[test]
    fn corrupt_record_is_ledger_error() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("sc-client.json"), b"{not json").unwrap();
        let ledger = InstallLedger::new(temp.path());
        assert!(matches!(
            ledger.load("sc-client"),
            Err(ToolError::Ledger { .. })
        ));
    }

    #[test]
    fn lock_blocks_second_holder_until_released() {
        use std::sync::mpsc;
        use std::time::Duration;

        let temp = tempfile::tempdir().unwrap();
        let ledger = InstallLedger::new(temp.path());
        let first = ledger.lock("sc-client").unwrap();
        assert!(temp.path().join("sc-client.lock").exists());

        let (tx, rx) = mpsc::channel();
        let second_ledger = ledger.clone();
        let handle = std::thread::spawn(move || {
            let _second = second_ledger.lock("sc-client").unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(first);
        rx.recv_timeout(Duration::from_secs(5))
            .expect("second lock acquired after release");
        handle.join().unwrap();
    }
}

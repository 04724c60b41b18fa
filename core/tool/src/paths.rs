//! Path management for tool installations.
//!
//! All locations are resolved once, when a command starts, and passed down as
//! plain values.
//!
//! ## Directory Structure
//!
//! ```text
//! ~/.fortify/                      # Root directory (or FORTIFY_HOME)
//!   tools/
//!     sc-client/
//!       23.1.0/                    # Default install path for one version
//!         bin/
//!   fcli/                          # fcli data directory (or FCLI_HOME)
//!     config/
//!       tool-definitions.json      # Tool catalog (or FCLI_TOOL_DEFINITIONS)
//!     state/
//!       tool/
//!         sc-client.json           # Install record
//!         sc-client.lock           # Per-tool install lock
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::errors::ToolError;

/// Environment variable overriding the Fortify root directory.
pub const FORTIFY_HOME_ENV: &str = "FORTIFY_HOME";

/// Environment variable overriding the fcli data directory.
pub const FCLI_HOME_ENV: &str = "FCLI_HOME";

/// Environment variable pointing at an alternative tool definitions file.
pub const TOOL_DEFINITIONS_ENV: &str = "FCLI_TOOL_DEFINITIONS";

const TOOL_DEFINITIONS_FILE: &str = "tool-definitions.json";

/// Resolved locations used by the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcliPaths {
    /// Root directory (`~/.fortify` or `FORTIFY_HOME`).
    pub root: PathBuf,
    /// Base directory for default install paths.
    pub tools: PathBuf,
    /// fcli data directory (`<root>/fcli` or `FCLI_HOME`).
    pub fcli_home: PathBuf,
    /// Directory holding install records.
    pub ledger: PathBuf,
    /// Tool definitions file.
    pub definitions: PathBuf,
}

impl FcliPaths {
    /// Resolves paths from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `FORTIFY_HOME` is unset and the home directory
    /// cannot be determined.
    pub fn from_env() -> Result<Self, ToolError> {
        let root = match non_empty_env(FORTIFY_HOME_ENV) {
            Some(root) => PathBuf::from(root),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    ToolError::install_error(
                        "Cannot determine home directory. Set FORTIFY_HOME environment variable.",
                    )
                })?
                .join(".fortify"),
        };

        let mut paths = Self::with_root(root);
        if let Some(fcli_home) = non_empty_env(FCLI_HOME_ENV) {
            paths = paths.with_fcli_home(PathBuf::from(fcli_home));
        }
        if let Some(definitions) = non_empty_env(TOOL_DEFINITIONS_ENV) {
            paths.definitions = PathBuf::from(definitions);
        }
        Ok(paths)
    }

    /// Builds the default layout below `root`.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        let fcli_home = root.join("fcli");
        Self {
            tools: root.join("tools"),
            ledger: fcli_home.join("state").join("tool"),
            definitions: fcli_home.join("config").join(TOOL_DEFINITIONS_FILE),
            fcli_home,
            root,
        }
    }

    /// Relocates the fcli data directory and everything derived from it.
    #[must_use]
    pub fn with_fcli_home(self, fcli_home: PathBuf) -> Self {
        Self {
            ledger: fcli_home.join("state").join("tool"),
            definitions: fcli_home.join("config").join(TOOL_DEFINITIONS_FILE),
            fcli_home,
            ..self
        }
    }

    /// Default install directory for a tool version.
    #[must_use]
    pub fn default_install_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.tools.join(tool).join(version)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolves `path` to an absolute path without requiring it to exist.
///
/// Relative paths are joined onto the current directory. The longest existing
/// prefix is canonicalized first, so symlinks in it are resolved before any
/// `..` is applied. `.` and `..` in the remaining components are then
/// normalized lexically.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined or an
/// existing ancestor cannot be canonicalized.
pub fn canonicalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let components: Vec<Component<'_>> = absolute.components().collect();
    let mut split = components.len();
    while split > 0 {
        let prefix: PathBuf = components[..split].iter().collect();
        if prefix.exists() {
            break;
        }
        split -= 1;
    }

    let mut resolved = if split > 0 {
        components[..split].iter().collect::<PathBuf>().canonicalize()?
    } else {
        PathBuf::new()
    };
    for component in &components[split..] {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_root_derives_all_locations() {
        let paths = FcliPaths::with_root(PathBuf::from("/home/user/.fortify"));
        assert_eq!(paths.tools, PathBuf::from("/home/user/.fortify/tools"));
        assert_eq!(paths.fcli_home, PathBuf::from("/home/user/.fortify/fcli"));
        assert_eq!(
            paths.ledger,
            PathBuf::from("/home/user/.fortify/fcli/state/tool")
        );
        assert_eq!(
            paths.definitions,
            PathBuf::from("/home/user/.fortify/fcli/config/tool-definitions.json")
        );
    }

    #[test]
    fn default_install_dir_includes_tool_and_version() {
        let paths = FcliPaths::with_root(PathBuf::from("/r"));
        assert_eq!(
            paths.default_install_dir("sc-client", "23.1.0"),
            PathBuf::from("/r/tools/sc-client/23.1.0")
        );
    }

    #[test]
    fn with_fcli_home_moves_ledger_and_definitions() {
        let paths = FcliPaths::with_root(PathBuf::from("/r")).with_fcli_home(PathBuf::from("/f"));
        assert_eq!(paths.tools, PathBuf::from("/r/tools"));
        assert_eq!(paths.ledger, PathBuf::from("/f/state/tool"));
        assert_eq!(
            paths.definitions,
            PathBuf::from("/f/config/tool-definitions.json")
        );
    }

    #[test]
    #[serial_test::serial]
    fn from_env_honours_overrides() {
        // SAFETY: serialized test; variables are removed before returning.
        unsafe {
            std::env::set_var(FORTIFY_HOME_ENV, "/env/root");
            std::env::set_var(FCLI_HOME_ENV, "/env/fcli");
            std::env::set_var(TOOL_DEFINITIONS_ENV, "/env/defs.json");
        }

        let paths = FcliPaths::from_env();

        // SAFETY: cleanup of the variables set above.
        unsafe {
            std::env::remove_var(FORTIFY_HOME_ENV);
            std::env::remove_var(FCLI_HOME_ENV);
            std::env::remove_var(TOOL_DEFINITIONS_ENV);
        }

        let paths = paths.expect("should resolve");
        assert_eq!(paths.root, PathBuf::from("/env/root"));
        assert_eq!(paths.tools, PathBuf::from("/env/root/tools"));
        assert_eq!(paths.ledger, PathBuf::from("/env/fcli/state/tool"));
        assert_eq!(paths.definitions, PathBuf::from("/env/defs.json"));
    }

    #[test]
    fn canonicalize_resolves_missing_tail_under_existing_dir() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().canonicalize().unwrap();

        let resolved = canonicalize(&temp.path().join("a/./b/../c")).unwrap();
        assert_eq!(resolved, base.join("a").join("c"));
    }

    #[test]
    fn canonicalize_makes_relative_paths_absolute() {
        let resolved = canonicalize(Path::new("some/relative/dir")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/relative/dir"));
    }

    #[cfg(unix)]
    #[test]
    fn canonicalize_resolves_symlinks_in_existing_prefix() {
        let temp = tempfile::tempdir().unwrap();
        let real = temp.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolved = canonicalize(&link.join("tool")).unwrap();
        assert_eq!(resolved, real.canonicalize().unwrap().join("tool"));
    }

    #[cfg(unix)]
    #[test]
    fn canonicalize_applies_parent_dir_after_following_symlink() {
        let temp = tempfile::tempdir().unwrap();
        let real = temp.path().join("a").join("b").join("real");
        std::fs::create_dir_all(&real).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolved = canonicalize(&link.join("../target")).unwrap();
        let base = temp.path().canonicalize().unwrap();
        assert_eq!(resolved, base.join("a").join("b").join("target"));

        std::fs::create_dir(base.join("a").join("b").join("target")).unwrap();
        assert_eq!(resolved, link.join("../target").canonicalize().unwrap());
    }

    #[test]
    fn canonicalize_folds_parent_dir_in_missing_tail() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().canonicalize().unwrap();

        let resolved = canonicalize(&temp.path().join("missing/../x")).unwrap();
        assert_eq!(resolved, base.join("x"));
    }
}

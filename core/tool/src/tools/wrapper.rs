//! Launcher scripts for jar-based tools.

use std::path::Path;

use crate::errors::ToolError;

/// Writes `<bin>/<name>` (POSIX shell) and `<bin>/<name>.bat` launchers that
/// run `java -jar <jar>` with all arguments passed through.
///
/// # Errors
///
/// Returns `PostInstallFailed` if the bin directory or a script cannot be
/// written.
pub fn write_java_wrappers(
    tool: &str,
    bin_path: &Path,
    name: &str,
    jar: &Path,
) -> Result<(), ToolError> {
    std::fs::create_dir_all(bin_path).map_err(|e| {
        ToolError::post_install_io(
            tool,
            format!("cannot create {}", bin_path.display()),
            e,
        )
    })?;

    let jar = jar.display();
    let sh = bin_path.join(name);
    let bat = bin_path.join(format!("{name}.bat"));

    for (path, content) in [
        (&sh, format!("#!/bin/sh\nexec java -jar \"{jar}\" \"$@\"\n")),
        (&bat, format!("@echo off\r\njava -jar \"{jar}\" %*\r\n")),
    ] {
        std::fs::write(path, content).map_err(|e| {
            ToolError::post_install_io(tool, format!("cannot write {}", path.display()), e)
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_shell_and_batch_launchers() {
        let temp = tempfile::tempdir().unwrap();
        let bin = temp.path().join("bin");
        let jar = temp.path().join("FodUpload.jar");

        write_java_wrappers("fod-uploader", &bin, "FoDUpload", &jar).unwrap();
        let sh = bin.join("FoDUpload");
        let bat = bin.join("FoDUpload.bat");

        let sh_text = std::fs::read_to_string(&sh).unwrap();
        assert!(sh_text.starts_with("#!/bin/sh\n"));
        assert!(sh_text.contains(&format!("java -jar \"{}\" \"$@\"", jar.display())));

        let bat_text = std::fs::read_to_string(&bat).unwrap();
        assert!(bat_text.contains("%*"));
    }

    #[test]
    fn fails_when_bin_is_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let bin = temp.path().join("bin");
        std::fs::write(&bin, b"not a dir").unwrap();

        let err = write_java_wrappers("fod-uploader", &bin, "FoDUpload", Path::new("x.jar"))
            .unwrap_err();
        assert!(matches!(err, ToolError::PostInstallFailed { .. }));
    }
}

//! FoD Uploader, distributed as a single jar.

use crate::descriptor::{InstallDescriptor, InstallType};
use crate::errors::ToolError;
use crate::integration::ToolIntegration;
use crate::tools::wrapper::write_java_wrappers;

const WRAPPER_NAME: &str = "FoDUpload";

#[derive(Debug, Default, Clone, Copy)]
pub struct FodUploader;

impl ToolIntegration for FodUploader {
    fn tool_name(&self) -> &'static str {
        "fod-uploader"
    }

    fn install_type(&self) -> InstallType {
        InstallType::Copy
    }

    fn post_install(&self, install: &InstallDescriptor) -> Result<(), ToolError> {
        let jar = install
            .install_path()
            .join(install.download().file_name());
        if !jar.is_file() {
            return Err(ToolError::post_install(
                self.tool_name(),
                format!("expected jar not found at {}", jar.display()),
            ));
        }
        write_java_wrappers(self.tool_name(), install.bin_path(), WRAPPER_NAME, &jar)?;
        Ok(())
    }
}

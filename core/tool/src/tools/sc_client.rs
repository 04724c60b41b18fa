//! ScanCentral SAST client.

use crate::descriptor::InstallType;
use crate::integration::ToolIntegration;

#[derive(Debug, Default, Clone, Copy)]
pub struct ScClient;

impl ToolIntegration for ScClient {
    fn tool_name(&self) -> &'static str {
        "sc-client"
    }

    fn install_type(&self) -> InstallType {
        InstallType::ExtractZip
    }
}

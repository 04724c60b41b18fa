//! Fortify Vulnerability Exporter.

use crate::descriptor::InstallType;
use crate::integration::ToolIntegration;

#[derive(Debug, Default, Clone, Copy)]
pub struct VulnExporter;

impl ToolIntegration for VulnExporter {
    fn tool_name(&self) -> &'static str {
        "vuln-exporter"
    }

    fn install_type(&self) -> InstallType {
        InstallType::ExtractZip
    }
}

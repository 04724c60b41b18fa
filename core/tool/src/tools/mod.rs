//! Concrete tool integrations.

mod bugtracker_utility;
mod fod_uploader;
mod sc_client;
mod vuln_exporter;
pub mod wrapper;

pub use bugtracker_utility::BugTrackerUtility;
pub use fod_uploader::FodUploader;
pub use sc_client::ScClient;
pub use vuln_exporter::VulnExporter;

use crate::errors::ToolError;
use crate::integration::ToolIntegration;

/// Every tool the installer knows about.
#[must_use]
pub fn integrations() -> Vec<Box<dyn ToolIntegration>> {
    vec![
        Box::new(ScClient),
        Box::new(VulnExporter),
        Box::new(FodUploader),
        Box::new(BugTrackerUtility),
    ]
}

/// Names of all registered tools.
#[must_use]
pub fn tool_names() -> Vec<&'static str> {
    integrations().iter().map(|i| i.tool_name()).collect()
}

/// Looks up the integration for `tool`.
///
/// # Errors
///
/// Returns `UnknownTool` if no integration is registered under that name.
pub fn integration_for(tool: &str) -> Result<Box<dyn ToolIntegration>, ToolError> {
    integrations()
        .into_iter()
        .find(|i| i.tool_name() == tool)
        .ok_or_else(|| ToolError::unknown_tool(tool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::InstallType;

    #[test]
    fn registered_tool_names_are_unique() {
        let mut names = tool_names();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn integration_for_known_tools() {
        assert_eq!(
            integration_for("fod-uploader").unwrap().install_type(),
            InstallType::Copy
        );
        assert_eq!(
            integration_for("sc-client").unwrap().install_type(),
            InstallType::ExtractZip
        );
    }

    #[test]
    fn integration_for_unknown_tool_fails() {
        assert!(matches!(
            integration_for("nmap"),
            Err(ToolError::UnknownTool { .. })
        ));
    }
}

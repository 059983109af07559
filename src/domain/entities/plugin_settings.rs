use serde::{Deserialize, Serialize};

/// Feature switches for the two template kinds.
///
/// Read from storage at the start of each request and passed explicitly to
/// the services that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default = "enabled_by_default")]
    pub creation_templates_enabled: bool,
    #[serde(default = "enabled_by_default")]
    pub status_templates_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            creation_templates_enabled: true,
            status_templates_enabled: true,
        }
    }
}

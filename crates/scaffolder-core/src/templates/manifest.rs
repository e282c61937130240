//! Root template manifest (templates/template.yaml)

use serde::{Deserialize, Serialize};

/// Lists the published templates and the CLI version they expect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifest {
    /// Minimum CLI version the templates were built for
    #[serde(default)]
    pub version: Option<String>,

    /// Template directory names (= template ids)
    #[serde(default)]
    pub templates: Vec<String>,
}

impl RootManifest {
    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.iter().any(|t| t == template_id)
    }
}

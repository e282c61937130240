//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to give the scaffolding core its
//! identity, template location and post-setup instructions.

use crate::runtime::PackageManager;
use std::path::{Path, PathBuf};

/// Configuration trait for a scaffolding CLI product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default base URL for fetching template zips
    fn default_template_url(&self) -> &'static str;

    /// Environment variable name for overriding the template URL
    fn template_url_env(&self) -> &'static str;

    /// Directories that may hold templates shipped with the binary.
    /// The first one with a root manifest is used instead of the default URL.
    fn bundled_template_dirs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// "Next steps" shown after project creation.
    ///
    /// `cd_path` is the project path relative to where the user ran the
    /// CLI, or `None` when the project is the working directory itself.
    fn next_steps(
        &self,
        cd_path: Option<&Path>,
        package_manager: &PackageManager,
        installed: bool,
    ) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}

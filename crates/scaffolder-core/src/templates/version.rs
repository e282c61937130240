//! CLI / template version compatibility

use semver::Version;

/// Warning text when the running CLI is older than the templates expect.
/// Unparseable versions never warn.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    let template_ver = parse_version(template_version)?;

    (cli_ver < template_ver).then(|| {
        format!(
            "Templates expect CLI version {} or newer, you are running {}. Update with: {}",
            template_ver, cli_ver, upgrade_command
        )
    })
}

/// Parse `1.2.3` or `v1.2.3`
pub fn parse_version(version_str: &str) -> Option<Version> {
    let trimmed = version_str.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).ok()
}

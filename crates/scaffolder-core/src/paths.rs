//! Target directory and package name helpers

use crate::error::{Result, ScaffoldError};
use regex_lite::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_TARGET_DIR: &str = "my-game";
pub const DEFAULT_PROJECT_NAME: &str = "my-game";
pub const DEFAULT_DESCRIPTION: &str = "A new game project";

/// Trim whitespace and trailing slashes from a typed directory
pub fn format_target_dir(target_dir: &str) -> String {
    target_dir.trim().trim_end_matches('/').to_string()
}

/// Directory given on the command line, or `None` when it formats to
/// nothing (`"/"`, blanks) and must be asked for or defaulted
pub fn target_dir_from_arg(arg: Option<&str>) -> Option<String> {
    arg.map(format_target_dir).filter(|dir| !dir.is_empty())
}

/// Name used for the project when none is typed: the target dir, or the
/// working directory's own name for `.`
pub fn default_project_name(target_dir: &str, cwd: &Path) -> String {
    if target_dir == "." {
        cwd.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
    } else {
        target_dir.to_string()
    }
}

/// True when the directory has no entries other than `.git`.
/// A missing directory counts as empty.
pub fn is_empty_dir(path: &Path) -> std::io::Result<bool> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    for entry in entries {
        if entry?.file_name() != ".git" {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove everything in `dir` except `.git`. Missing dir is a no-op.
pub async fn empty_dir(dir: &Path) -> Result<()> {
    let read_err =
        |e: std::io::Error| ScaffoldError::io(format!("Failed to read directory: {}", dir.display()), e);

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(read_err(e)),
    };

    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        let removed = if entry.file_type().await.map_err(read_err)?.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        removed.map_err(|e| ScaffoldError::io(format!("Failed to remove {}", path.display()), e))?;
    }
    Ok(())
}

fn package_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:@[a-z0-9*~-][a-z0-9*._~-]*/)?[a-z0-9~-][a-z0-9._~-]*$")
            .expect("package name pattern is valid")
    })
}

/// URL-safe npm package name, optionally scoped
pub fn is_valid_package_name(name: &str) -> bool {
    package_name_regex().is_match(name)
}

/// Best-effort conversion of a project name into a valid package name
pub fn to_valid_package_name(project_name: &str) -> String {
    let lowered = project_name.trim().to_lowercase();
    let spaced: String = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let stripped = spaced.trim_start_matches(['.', '_']);
    // A run of invalid characters becomes a single '-'
    let mut cleaned = String::with_capacity(stripped.len());
    let mut in_run = false;
    for c in stripped.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '~' {
            cleaned.push(c);
            in_run = false;
        } else if !in_run {
            cleaned.push('-');
            in_run = true;
        }
    }

    if cleaned.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        cleaned
    }
}

//! Placeholder replacement in template manifests

use crate::selection::ProjectInfo;

pub const PACKAGE_NAME_TOKEN: &str = "my-app-package-name";
pub const DESCRIPTION_TOKEN: &str = "my-app-description";
pub const PROJECT_NAME_TOKEN: &str = "my-app-project-name";
pub const IDENTIFIER_TOKEN: &str = "com.my-app-project-name.app";

/// Files at the template root whose contents get substituted
pub const ROOT_FILES: &[&str] = &["package.json", "vite.config.ts", "index.html"];

/// Platform shell directory (Tauri) nested in multi-device templates
pub const PLATFORM_SHELL_DIR: &str = "src-tauri";

/// Files inside the platform shell directory that get substituted
pub const PLATFORM_SHELL_FILES: &[&str] = &["Cargo.toml", "Cargo.lock", "tauri.conf.json"];

/// Literal token -> replacement pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: Vec<(String, String)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        let token = token.into();
        if !token.is_empty() {
            self.entries.retain(|(t, _)| *t != token);
            self.entries.push((token, value.into()));
        }
        self
    }

    /// Tokens for root manifests
    pub fn for_project(info: &ProjectInfo) -> Self {
        Self::new()
            .with(PACKAGE_NAME_TOKEN, &info.package_name)
            .with(DESCRIPTION_TOKEN, &info.description)
            .with(PROJECT_NAME_TOKEN, &info.project_name)
    }

    /// Tokens for platform shell manifests, adding the app identifier
    pub fn for_platform_shell(info: &ProjectInfo) -> Self {
        let identifier = info
            .identifier
            .clone()
            .unwrap_or_else(|| default_identifier(&info.package_name));
        Self::for_project(info).with(IDENTIFIER_TOKEN, identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `com.<package>.app`, with any npm scope dropped
pub fn default_identifier(package_name: &str) -> String {
    let bare = package_name
        .rsplit_once('/')
        .map_or(package_name, |(_, name)| name);
    format!("com.{}.app", bare)
}

/// Replace every token occurrence with its value.
///
/// Single left-to-right pass; at each position the longest matching token
/// wins, so overlapping tokens (the identifier contains the project name
/// token) resolve the same way whatever order the map was built in.
/// Replacement text is never rescanned.
pub fn substitute(contents: &str, map: &SubstitutionMap) -> String {
    if map.is_empty() {
        return contents.to_string();
    }

    let mut tokens: Vec<&(String, String)> = map.entries.iter().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(contents.len());
    let mut rest = contents;
    while !rest.is_empty() {
        match tokens.iter().find(|(token, _)| rest.starts_with(token.as_str())) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &rest[token.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }
    out
}

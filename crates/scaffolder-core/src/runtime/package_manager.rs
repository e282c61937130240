//! Package manager detection from the invoking user agent

use std::fmt;

/// Package manager that launched the CLI (or npm when unknown)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub name: String,
    pub version: Option<String>,
}

impl Default for PackageManager {
    fn default() -> Self {
        Self {
            name: "npm".to_string(),
            version: None,
        }
    }
}

impl PackageManager {
    /// Parse an `npm_config_user_agent` value such as
    /// `pnpm/9.1.0 npm/? node/v20.11.0 linux x64`
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let agent = user_agent
            .and_then(|ua| ua.split_whitespace().next())
            .unwrap_or_default();
        let mut parts = agent.splitn(2, '/');
        match parts.next().filter(|name| !name.is_empty()) {
            Some(name) => Self {
                name: name.to_string(),
                version: parts.next().map(str::to_string),
            },
            None => Self::default(),
        }
    }

    pub fn is_yarn(&self) -> bool {
        self.name == "yarn"
    }

    /// Arguments for installing dependencies
    pub fn install_args(&self) -> Vec<&'static str> {
        vec!["install"]
    }

    pub fn install_command(&self) -> String {
        if self.is_yarn() {
            "yarn".to_string()
        } else {
            format!("{} install", self.name)
        }
    }

    pub fn start_command(&self) -> String {
        if self.is_yarn() {
            "yarn dev".to_string()
        } else {
            format!("{} run start", self.name)
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

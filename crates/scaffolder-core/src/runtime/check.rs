//! Runtime detection for the toolchains a scaffolded game needs

use std::process::Command;

/// Runtime detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
    /// Where to get it when missing
    pub install_hint: &'static str,
}

/// Run `<binary> --version` and report what came back
fn probe(binary: &str, name: &'static str, install_hint: &'static str) -> RuntimeInfo {
    let output = Command::new(binary).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
                install_hint,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
            install_hint,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("node", "Node.js", "https://nodejs.org")
}

/// Check if Cargo/Rust is available (needed by the Tauri shell)
pub fn check_cargo() -> RuntimeInfo {
    probe("cargo", "Cargo", "https://rustup.rs")
}

/// Advisory runtime report: never fails, missing runtimes are listed with
/// `available: false`. Cargo is only checked for multi-device projects.
pub fn check_runtimes(multi_device: bool) -> Vec<RuntimeInfo> {
    let mut results = vec![check_node()];
    if multi_device {
        results.push(check_cargo());
    }
    results
}

impl RuntimeInfo {
    pub fn summary(&self) -> String {
        if self.available {
            format!(
                "{} ({})",
                self.name,
                self.version.as_deref().unwrap_or("unknown")
            )
        } else {
            format!("{} (not installed, see {})", self.name, self.install_hint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_reported_unavailable() {
        let info = probe("pixi-vn-no-such-binary", "Nothing", "https://example.com");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.summary().contains("https://example.com"));
    }

    #[test]
    fn test_cargo_only_checked_for_multi_device() {
        assert_eq!(check_runtimes(false).len(), 1);
        let names: Vec<_> = check_runtimes(true).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Node.js", "Cargo"]);
    }

    #[test]
    fn test_summary_of_available_runtime() {
        let info = RuntimeInfo {
            name: "Node.js",
            version: Some("v22.1.0".to_string()),
            available: true,
            install_hint: "https://nodejs.org",
        };
        assert_eq!(info.summary(), "Node.js (v22.1.0)");
    }
}

//! External tools run after scaffolding: git, the package manager, editors
//!
//! These are thin wrappers over process spawning. They run in the project
//! root and inherit the terminal so the tool's own output is visible.

use super::package_manager::PackageManager;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::Path;
use tokio::process::Command as TokioCommand;

/// A CLI tool looked up on PATH
#[derive(Debug, Clone)]
struct ToolConfig {
    /// Name of the tool binary (e.g., "git")
    name: String,
    /// Display name for user-facing messages
    display_name: String,
}

/// Checks for and runs a CLI tool
pub struct ToolManager {
    config: ToolConfig,
}

impl ToolManager {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            config: ToolConfig {
                name: name.into(),
                display_name: display_name.into(),
            },
        }
    }

    /// Check if the tool is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        let finder = if cfg!(windows) { "where" } else { "which" };
        std::process::Command::new(finder)
            .arg(&self.config.name)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Run the tool in `cwd` and fail on a non-zero exit
    pub async fn run(&self, args: &[&str], cwd: &Path) -> Result<()> {
        let status = TokioCommand::new(&self.config.name)
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .with_context(|| format!("Failed to start {}", self.config.display_name))?;

        if !status.success() {
            anyhow::bail!(
                "`{} {}` failed with exit code {}",
                self.config.name,
                args.join(" "),
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }
}

pub fn git_tool() -> ToolManager {
    ToolManager::new("git", "Git")
}

/// Result of [`git_init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitInit {
    Initialized,
    AlreadyRepository,
}

/// Whether the project root already holds a repository
pub fn has_git_repository(root: &Path) -> bool {
    root.join(".git").exists()
}

/// `git init -b main` then `git add .`, unless `.git` already exists
pub async fn git_init(root: &Path) -> Result<GitInit> {
    if has_git_repository(root) {
        return Ok(GitInit::AlreadyRepository);
    }
    let git = git_tool();
    git.run(&["init", "-b", "main"], root).await?;
    git.run(&["add", "."], root).await?;
    Ok(GitInit::Initialized)
}

/// Install the project's dependencies with the detected package manager
pub async fn install_dependencies(package_manager: &PackageManager, root: &Path) -> Result<()> {
    ToolManager::new(package_manager.name.clone(), package_manager.name.clone())
        .run(&package_manager.install_args(), root)
        .await
}

/// Editor to open the new project in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Ide {
    Vscode,
    Cursor,
    Vscodium,
    Other,
}

impl Ide {
    pub fn display_name(&self) -> &'static str {
        match self {
            Ide::Vscode => "Visual Studio Code",
            Ide::Cursor => "Cursor",
            Ide::Vscodium => "VSCodium",
            Ide::Other => "Other",
        }
    }

    /// Command-line launcher, if the editor has one
    pub fn binary(&self) -> Option<&'static str> {
        match self {
            Ide::Vscode => Some("code"),
            Ide::Cursor => Some("cursor"),
            Ide::Vscodium => Some("codium"),
            Ide::Other => None,
        }
    }
}

impl fmt::Display for Ide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of [`open_in_editor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorLaunch {
    Opened(&'static str),
    NotInPath(&'static str),
    SystemHandler,
}

/// Open the project (and its getting-started file) in the chosen editor.
/// "Other" hands the folder to the system's default handler.
pub async fn open_in_editor(
    ide: Ide,
    root: &Path,
    file_to_open: Option<&str>,
) -> Result<EditorLaunch> {
    let Some(binary) = ide.binary() else {
        open::that(root)
            .with_context(|| format!("Failed to open {}", root.display()))?;
        return Ok(EditorLaunch::SystemHandler);
    };

    let tool = ToolManager::new(binary, ide.display_name());
    if !tool.is_installed() {
        return Ok(EditorLaunch::NotInPath(binary));
    }

    let root_arg = root.to_string_lossy().into_owned();
    let file_arg = file_to_open
        .map(|file| root.join(file))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().into_owned());

    let mut args = vec![root_arg.as_str()];
    if let Some(file) = &file_arg {
        args.push(file.as_str());
    }
    tool.run(&args, root).await?;
    Ok(EditorLaunch::Opened(binary))
}

//! Runtime detection and post-scaffold tools
//!
//! This module provides:
//! - Runtime detection (Node.js, Cargo for the Tauri shell)
//! - Package manager detection
//! - Git, dependency install and editor launch

pub mod check;
pub mod package_manager;
pub mod tool;

pub use check::{check_cargo, check_node, check_runtimes, RuntimeInfo};
pub use package_manager::PackageManager;
pub use tool::{
    git_init, has_git_repository, install_dependencies, open_in_editor, EditorLaunch, GitInit,
    Ide, ToolManager,
};

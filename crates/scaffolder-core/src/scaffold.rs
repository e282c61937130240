//! Project creation: resolve, prepare the destination, copy, post-process
//!
//! Each step finishes its filesystem work before the next begins. Nothing
//! is touched before the template has been resolved and fetched, but once
//! writing has started a failure leaves the partial project in place.
//! Only `DeleteAll` removes existing entries; everything else is reconciled
//! one entry at a time by the copier.

use crate::error::{Result as ScaffoldResult, ScaffoldError};
use crate::paths::empty_dir;
use crate::policy::{DestState, OverwritePolicy};
use crate::runtime::PackageManager;
use crate::selection::Selection;
use crate::templates::copier::{child_names, dest_state, ConflictPrompt, Copier, CopyReport};
use crate::templates::resolver::{resolve, TemplateDescriptor};
use crate::templates::substitution::{
    substitute, SubstitutionMap, PLATFORM_SHELL_DIR, PLATFORM_SHELL_FILES, ROOT_FILES,
};
use crate::templates::TemplateFetcher;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Template-root entries written under a different name. Dot-names are
/// shipped with a `_` so they survive packaging.
pub const ROOT_RENAMES: &[(&str, &str)] = &[("_gitignore", ".gitignore"), ("_github", ".github")];

/// Process state the scaffolder depends on, captured once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub cwd: PathBuf,
    /// Value of `npm_config_user_agent`, when launched through a package manager
    pub user_agent: Option<String>,
}

impl Context {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            user_agent: None,
        }
    }

    pub fn from_process() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            user_agent: std::env::var("npm_config_user_agent").ok(),
        }
    }

    pub fn package_manager(&self) -> PackageManager {
        PackageManager::from_user_agent(self.user_agent.as_deref())
    }

    /// Absolute project root for a typed target directory
    pub fn project_root(&self, target_dir: &str) -> PathBuf {
        match target_dir {
            "" | "." => self.cwd.clone(),
            dir => self.cwd.join(dir),
        }
    }

    /// Path to show in `cd` instructions; `None` when it is the cwd
    pub fn cd_path(&self, root: &Path) -> Option<PathBuf> {
        if root == self.cwd {
            return None;
        }
        Some(
            root.strip_prefix(&self.cwd)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| root.to_path_buf()),
        )
    }
}

/// What a finished run hands to the post-scaffold actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOutcome {
    pub root_folder: PathBuf,
    pub template: TemplateDescriptor,
    pub report: CopyReport,
}

impl ScaffoldOutcome {
    pub fn file_to_open(&self) -> Option<&'static str> {
        self.template.file_to_open
    }
}

/// Create the project described by `selection`
pub async fn scaffold(
    ctx: &Context,
    selection: &Selection,
    policy: OverwritePolicy,
    fetcher: &mut TemplateFetcher,
    prompt: &mut dyn ConflictPrompt,
) -> Result<ScaffoldOutcome> {
    if policy == OverwritePolicy::Cancel {
        return Err(ScaffoldError::Cancelled.into());
    }

    let root = ctx.project_root(&selection.project.target_dir);
    let template = resolve(&selection.game).map_err(ScaffoldError::from)?;
    let template_dir = fetcher
        .template_dir(template.template_id)
        .await
        .with_context(|| format!("Failed to fetch template {}", template.template_id))?;

    prepare_root(&root, policy).await?;

    let mut copier = Copier::new(policy, prompt);
    copy_template_root(&mut copier, &template_dir, &root, selection).await?;
    substitute_platform_shell(&root, selection, copier.report()).await?;

    Ok(ScaffoldOutcome {
        root_folder: root,
        template,
        report: copier.into_report(),
    })
}

/// Empty the root for `DeleteAll`, otherwise make sure it exists
async fn prepare_root(root: &Path, policy: OverwritePolicy) -> ScaffoldResult<()> {
    if policy == OverwritePolicy::DeleteAll {
        empty_dir(root).await?;
    }
    fs::create_dir_all(root).await.map_err(|e| {
        ScaffoldError::io(format!("Failed to create directory: {}", root.display()), e)
    })
}

fn dest_name(name: &str) -> &str {
    ROOT_RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| *to)
}

/// Top level of the template: manifests are substituted, the rest copied.
/// Renamed entries go straight to their final name and merge with whatever
/// is already there under the run's policy.
async fn copy_template_root(
    copier: &mut Copier<'_>,
    template_dir: &Path,
    root: &Path,
    selection: &Selection,
) -> ScaffoldResult<()> {
    let map = SubstitutionMap::for_project(&selection.project);

    for name in child_names(template_dir).await? {
        let src = template_dir.join(&name);
        let name = name.to_string_lossy().into_owned();
        let dest = root.join(dest_name(&name));

        if ROOT_FILES.contains(&name.as_str()) && dest_state(&src).await? == DestState::File {
            let contents = fs::read_to_string(&src).await.map_err(|e| {
                ScaffoldError::io(format!("Failed to read {}", src.display()), e)
            })?;
            copier
                .write_contents(&dest, substitute(&contents, &map).as_bytes())
                .await?;
        } else {
            copier.copy_entry(&src, &dest).await?;
        }
    }
    Ok(())
}

/// Second substitution pass over the platform shell manifests, limited to
/// files this run wrote
async fn substitute_platform_shell(
    root: &Path,
    selection: &Selection,
    report: &CopyReport,
) -> ScaffoldResult<()> {
    let shell_dir = root.join(PLATFORM_SHELL_DIR);
    if dest_state(&shell_dir).await? != DestState::Dir {
        return Ok(());
    }

    let map = SubstitutionMap::for_platform_shell(&selection.project);
    for file in PLATFORM_SHELL_FILES {
        let path = shell_dir.join(file);
        if !report.written.contains(&path) {
            continue;
        }
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| ScaffoldError::io(format!("Failed to read {}", path.display()), e))?;
        fs::write(&path, substitute(&contents, &map))
            .await
            .map_err(|e| ScaffoldError::io(format!("Failed to write file: {}", path.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root() {
        let ctx = Context::new("/work");
        assert_eq!(ctx.project_root("."), PathBuf::from("/work"));
        assert_eq!(ctx.project_root("my-game"), PathBuf::from("/work/my-game"));
        assert_eq!(ctx.project_root("/abs/game"), PathBuf::from("/abs/game"));
    }

    #[test]
    fn test_cd_path() {
        let ctx = Context::new("/work");
        assert_eq!(ctx.cd_path(Path::new("/work")), None);
        assert_eq!(
            ctx.cd_path(Path::new("/work/games/my-game")),
            Some(PathBuf::from("games/my-game"))
        );
        assert_eq!(
            ctx.cd_path(Path::new("/elsewhere/my-game")),
            Some(PathBuf::from("/elsewhere/my-game"))
        );
    }

    #[test]
    fn test_package_manager_from_context() {
        let mut ctx = Context::new("/work");
        assert_eq!(ctx.package_manager().name, "npm");
        ctx.user_agent = Some("bun/1.1.0 npm/? node/v20".to_string());
        assert_eq!(ctx.package_manager().name, "bun");
    }

    #[test]
    fn test_root_renames() {
        assert_eq!(dest_name("_gitignore"), ".gitignore");
        assert_eq!(dest_name("_github"), ".github");
        assert_eq!(dest_name("README.md"), "README.md");
    }
}

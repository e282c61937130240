//! Conflict-aware copying of template trees

use crate::error::{Result, ScaffoldError};
use crate::policy::{plan_entry, Action, DestState, OverwritePolicy};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Entry names never copied from a template, at any depth
pub const EXCLUDED_NAMES: &[&str] = &[
    ".git",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
];

pub fn is_excluded(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| EXCLUDED_NAMES.contains(&name))
}

/// Source of per-file decisions under [`OverwritePolicy::Ask`]
pub trait ConflictPrompt {
    /// `Ok(true)` replaces `path`, `Ok(false)` keeps it.
    /// Return [`ScaffoldError::Cancelled`] to abort the whole run.
    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool>;
}

/// Keeps every conflicting file. Used when nobody can be asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExisting;

impl ConflictPrompt for KeepExisting {
    fn confirm_overwrite(&mut self, _path: &Path) -> Result<bool> {
        Ok(false)
    }
}

/// Destination paths touched (or deliberately left alone) by a copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub written: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Copies template entries onto a destination tree under one policy
pub struct Copier<'p> {
    policy: OverwritePolicy,
    prompt: &'p mut dyn ConflictPrompt,
    report: CopyReport,
}

impl<'p> Copier<'p> {
    pub fn new(policy: OverwritePolicy, prompt: &'p mut dyn ConflictPrompt) -> Self {
        Self {
            policy,
            prompt,
            report: CopyReport::default(),
        }
    }

    pub fn report(&self) -> &CopyReport {
        &self.report
    }

    pub fn into_report(self) -> CopyReport {
        self.report
    }

    /// Copy one file or directory, reconciling with whatever is at `dest`
    pub async fn copy_entry(&mut self, src: &Path, dest: &Path) -> Result<()> {
        let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];

        while let Some((src, dest)) = pending.pop() {
            let src_is_dir = fs::metadata(&src)
                .await
                .map_err(|e| ScaffoldError::io(format!("Failed to read {}", src.display()), e))?
                .is_dir();

            match self.decide(src_is_dir, &dest).await? {
                Action::Create | Action::Replace if src_is_dir => {
                    fs::create_dir_all(&dest).await.map_err(|e| {
                        ScaffoldError::io(
                            format!("Failed to create directory: {}", dest.display()),
                            e,
                        )
                    })?;
                    push_children(&mut pending, &src, &dest).await?;
                }
                Action::Create | Action::Replace => {
                    fs::copy(&src, &dest).await.map_err(|e| {
                        ScaffoldError::io(format!("Failed to write file: {}", dest.display()), e)
                    })?;
                    self.report.written.push(dest);
                }
                Action::Merge => push_children(&mut pending, &src, &dest).await?,
                Action::Keep => self.report.kept.push(dest),
                Action::TypeConflict => return Err(ScaffoldError::TypeConflict { path: dest }),
                Action::Confirm => unreachable!("decide resolves confirmations"),
            }
        }

        Ok(())
    }

    /// Write generated file contents to `dest` under the same conflict rules
    pub async fn write_contents(&mut self, dest: &Path, contents: &[u8]) -> Result<()> {
        match self.decide(false, dest).await? {
            Action::Create | Action::Replace => {
                fs::write(dest, contents).await.map_err(|e| {
                    ScaffoldError::io(format!("Failed to write file: {}", dest.display()), e)
                })?;
                self.report.written.push(dest.to_path_buf());
            }
            Action::Keep => self.report.kept.push(dest.to_path_buf()),
            Action::TypeConflict => {
                return Err(ScaffoldError::TypeConflict {
                    path: dest.to_path_buf(),
                })
            }
            Action::Merge | Action::Confirm => unreachable!("file source is never merged"),
        }
        Ok(())
    }

    /// Plan the entry, asking the prompt when needed, and clear a file that
    /// is about to be replaced
    async fn decide(&mut self, src_is_dir: bool, dest: &Path) -> Result<Action> {
        let state = dest_state(dest).await?;
        let action = match plan_entry(self.policy, src_is_dir, state) {
            Action::Confirm => {
                if self.prompt.confirm_overwrite(dest)? {
                    Action::Replace
                } else {
                    Action::Keep
                }
            }
            action => action,
        };

        if action == Action::Replace {
            fs::remove_file(dest).await.map_err(|e| {
                ScaffoldError::io(format!("Failed to remove {}", dest.display()), e)
            })?;
        }
        Ok(action)
    }
}

pub(crate) async fn dest_state(path: &Path) -> Result<DestState> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(DestState::Dir),
        Ok(_) => Ok(DestState::File),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DestState::Missing),
        Err(e) => Err(ScaffoldError::io(
            format!("Failed to inspect {}", path.display()),
            e,
        )),
    }
}

/// Sorted, non-excluded entry names of a directory
pub(crate) async fn child_names(dir: &Path) -> Result<Vec<std::ffi::OsString>> {
    let read_err = |e: std::io::Error| ScaffoldError::io(format!("Failed to read directory: {}", dir.display()), e);

    let mut entries = fs::read_dir(dir).await.map_err(read_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let name = entry.file_name();
        if !is_excluded(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Queue children so they pop in name order
async fn push_children(
    pending: &mut Vec<(PathBuf, PathBuf)>,
    src: &Path,
    dest: &Path,
) -> Result<()> {
    for name in child_names(src).await?.into_iter().rev() {
        pending.push((src.join(&name), dest.join(&name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Scripted answers; records every path it was asked about
    struct Scripted {
        answers: VecDeque<Result<bool>>,
        asked: Vec<PathBuf>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<bool>>) -> Self {
            Self {
                answers: answers.into(),
                asked: Vec::new(),
            }
        }
    }

    impl ConflictPrompt for Scripted {
        fn confirm_overwrite(&mut self, path: &Path) -> Result<bool> {
            self.asked.push(path.to_path_buf());
            self.answers.pop_front().unwrap_or(Ok(false))
        }
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    fn template() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "template readme");
        write(dir.path(), "src/main.ts", "template main");
        write(dir.path(), "src/labels/start.ts", "template label");
        dir
    }

    async fn copy(src: &Path, dest: &Path, policy: OverwritePolicy) -> CopyReport {
        let mut prompt = KeepExisting;
        let mut copier = Copier::new(policy, &mut prompt);
        copier.copy_entry(src, dest).await.unwrap();
        copier.into_report()
    }

    #[tokio::test]
    async fn test_copy_into_missing_destination() {
        let src = template();
        let dest = TempDir::new().unwrap();
        let root = dest.path().join("game");

        let report = copy(src.path(), &root, OverwritePolicy::Skip).await;

        assert_eq!(read(&root, "src/labels/start.ts"), "template label");
        assert_eq!(report.written.len(), 3);
        assert!(report.kept.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_unrelated_siblings() {
        let src = template();
        let dest = TempDir::new().unwrap();
        write(dest.path(), "src/main.ts", "user main");
        write(dest.path(), "src/keep.txt", "user notes");

        copy(src.path(), dest.path(), OverwritePolicy::Overwrite).await;

        assert_eq!(read(dest.path(), "src/main.ts"), "template main");
        assert_eq!(read(dest.path(), "src/keep.txt"), "user notes");
        assert_eq!(read(dest.path(), "src/labels/start.ts"), "template label");
    }

    #[tokio::test]
    async fn test_skip_keeps_conflicts_and_fills_gaps() {
        let src = template();
        let dest = TempDir::new().unwrap();
        write(dest.path(), "src/main.ts", "user main");
        write(dest.path(), "src/keep.txt", "user notes");

        let report = copy(src.path(), dest.path(), OverwritePolicy::Skip).await;

        assert_eq!(read(dest.path(), "src/main.ts"), "user main");
        assert_eq!(read(dest.path(), "src/keep.txt"), "user notes");
        assert_eq!(read(dest.path(), "src/labels/start.ts"), "template label");
        assert_eq!(report.kept, vec![dest.path().join("src/main.ts")]);
    }

    #[tokio::test]
    async fn test_overwrite_twice_matches_single_copy() {
        let src = template();
        let once = TempDir::new().unwrap();
        let twice = TempDir::new().unwrap();

        copy(src.path(), once.path(), OverwritePolicy::Overwrite).await;
        copy(src.path(), twice.path(), OverwritePolicy::Overwrite).await;
        copy(src.path(), twice.path(), OverwritePolicy::Overwrite).await;

        for rel in ["README.md", "src/main.ts", "src/labels/start.ts"] {
            assert_eq!(read(once.path(), rel), read(twice.path(), rel));
        }
        let count = |root: &Path| {
            walkdir::WalkDir::new(root)
                .into_iter()
                .filter_map(|e| e.ok())
                .count()
        };
        assert_eq!(count(once.path()), count(twice.path()));
    }

    #[tokio::test]
    async fn test_ask_prompts_per_file() {
        let src = template();
        let dest = TempDir::new().unwrap();
        write(dest.path(), "README.md", "user readme");
        write(dest.path(), "src/main.ts", "user main");

        let mut prompt = Scripted::new(vec![Ok(true), Ok(false)]);
        let mut copier = Copier::new(OverwritePolicy::Ask, &mut prompt);
        copier.copy_entry(src.path(), dest.path()).await.unwrap();
        let report = copier.into_report();

        assert_eq!(
            prompt.asked,
            vec![dest.path().join("README.md"), dest.path().join("src/main.ts")]
        );
        assert_eq!(read(dest.path(), "README.md"), "template readme");
        assert_eq!(read(dest.path(), "src/main.ts"), "user main");
        assert_eq!(report.kept, vec![dest.path().join("src/main.ts")]);
    }

    #[tokio::test]
    async fn test_ask_cancellation_stops_writes() {
        let src = template();
        let dest = TempDir::new().unwrap();
        write(dest.path(), "README.md", "user readme");

        let mut prompt = Scripted::new(vec![Err(ScaffoldError::Cancelled)]);
        let mut copier = Copier::new(OverwritePolicy::Ask, &mut prompt);
        let err = copier
            .copy_entry(src.path(), dest.path())
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(read(dest.path(), "README.md"), "user readme");
        // README.md sorts first, so nothing after it was written
        assert!(!dest.path().join("src").exists());
    }

    #[tokio::test]
    async fn test_excluded_names_never_copied() {
        let src = template();
        write(src.path(), ".git/HEAD", "ref: refs/heads/main");
        write(src.path(), "package-lock.json", "{}");
        write(src.path(), "src/yarn.lock", "");

        let dest = TempDir::new().unwrap();
        copy(src.path(), dest.path(), OverwritePolicy::Overwrite).await;

        assert!(!dest.path().join(".git").exists());
        assert!(!dest.path().join("package-lock.json").exists());
        assert!(!dest.path().join("src/yarn.lock").exists());
        assert!(dest.path().join("src/main.ts").exists());
    }

    #[tokio::test]
    async fn test_directory_where_template_has_file() {
        let src = template();
        let dest = TempDir::new().unwrap();
        write(dest.path(), "README.md/notes.txt", "user notes");

        let mut prompt = KeepExisting;
        let mut copier = Copier::new(OverwritePolicy::Overwrite, &mut prompt);
        let err = copier
            .copy_entry(src.path(), dest.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::TypeConflict { .. }));
        assert_eq!(read(dest.path(), "README.md/notes.txt"), "user notes");
    }

    #[tokio::test]
    async fn test_write_contents_respects_policy() {
        let dest = TempDir::new().unwrap();
        write(dest.path(), "package.json", "user");
        let target = dest.path().join("package.json");

        let mut prompt = KeepExisting;
        let mut copier = Copier::new(OverwritePolicy::Skip, &mut prompt);
        copier.write_contents(&target, b"template").await.unwrap();
        assert_eq!(read(dest.path(), "package.json"), "user");

        let mut copier = Copier::new(OverwritePolicy::Overwrite, &mut prompt);
        copier.write_contents(&target, b"template").await.unwrap();
        assert_eq!(read(dest.path(), "package.json"), "template");
    }
}

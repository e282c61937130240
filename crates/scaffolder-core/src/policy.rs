//! How existing destination entries are reconciled with template entries

use clap::ValueEnum;
use std::fmt;

/// Overwrite policy, chosen once per run before copying begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum OverwritePolicy {
    /// Empty the destination root (keeping `.git`) before copying
    DeleteAll,
    /// Replace conflicting files, merge into existing directories
    Overwrite,
    /// Keep conflicting files, merge into existing directories
    Skip,
    /// Ask for each conflicting file
    Ask,
    /// Abort before touching the filesystem
    Cancel,
}

impl OverwritePolicy {
    pub fn display_name(&self) -> &'static str {
        match self {
            OverwritePolicy::DeleteAll => "Delete all",
            OverwritePolicy::Overwrite => "Overwrite",
            OverwritePolicy::Skip => "Skip",
            OverwritePolicy::Ask => "Ask",
            OverwritePolicy::Cancel => "Cancel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OverwritePolicy::DeleteAll => "Remove existing files and continue",
            OverwritePolicy::Overwrite => "Replace files that exist in the template",
            OverwritePolicy::Skip => "Keep existing files and add the missing ones",
            OverwritePolicy::Ask => "Ask before replacing each existing file",
            OverwritePolicy::Cancel => "Cancel operation",
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What currently occupies a destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestState {
    Missing,
    File,
    Dir,
}

/// Decision for one template entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing at the destination: write it
    Create,
    /// Remove the destination file, then write
    Replace,
    /// Leave the destination untouched
    Keep,
    /// Ask the user; "yes" means `Replace`, "no" means `Keep`
    Confirm,
    /// Both sides are directories: reconcile child by child
    Merge,
    /// A directory sits where the template has a file
    TypeConflict,
}

/// Decide what to do with one entry. Pure: no filesystem, no terminal.
///
/// `DeleteAll` only acts on the destination root; below it, it behaves
/// like `Overwrite`. Existing directories are never removed here.
pub fn plan_entry(policy: OverwritePolicy, src_is_dir: bool, dest: DestState) -> Action {
    match (dest, src_is_dir) {
        (DestState::Missing, _) => Action::Create,
        (DestState::Dir, true) => Action::Merge,
        (DestState::Dir, false) => match policy {
            OverwritePolicy::Skip => Action::Keep,
            _ => Action::TypeConflict,
        },
        (DestState::File, _) => match policy {
            OverwritePolicy::DeleteAll | OverwritePolicy::Overwrite => Action::Replace,
            OverwritePolicy::Skip | OverwritePolicy::Cancel => Action::Keep,
            OverwritePolicy::Ask => Action::Confirm,
        },
    }
}

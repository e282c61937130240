//! Error types shared by the scaffolding core

use crate::selection::GameType;
use std::path::PathBuf;
use thiserror::Error;

/// Raw answers that contradict the genre catalog.
///
/// These can only come from a prompt layer (or flag parser) that asked a
/// question it should not have, or skipped one it should have asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{genre} does not offer a {field} choice, but '{value}' was given")]
    Unexpected {
        genre: GameType,
        field: &'static str,
        value: String,
    },

    #[error("{genre} requires a {field} choice")]
    Missing { genre: GameType, field: &'static str },

    #[error("'{value}' is not an available {field} for {genre}")]
    NotOffered {
        genre: GameType,
        field: &'static str,
        value: String,
    },
}

/// A well-formed selection for which no template exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ResolutionError {
    pub reason: &'static str,
}

impl ResolutionError {
    pub const NO_UI_TEMPLATE: &'static str =
        "There are no templates for this game type and UI framework";
    pub const NO_NARRATIVE_TEMPLATE: &'static str =
        "There are no templates for this narrative language";
    pub const NO_DEVICE_TEMPLATE: &'static str =
        "There are no templates for this device target";
    pub const NO_GENRE_TEMPLATE: &'static str = "There are no templates for this game type";

    pub(crate) fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Terminal conditions of a scaffolding run
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot replace directory {} with a file from the template", path.display())]
    TypeConflict { path: PathBuf },

    #[error("Template '{id}' not found in {location}")]
    TemplateNotFound { id: String, location: String },

    #[error("Operation cancelled.")]
    Cancelled,
}

impl ScaffoldError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Map a prompt I/O failure, treating an interrupted prompt as cancellation
    pub fn from_prompt(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::Interrupted {
            Self::Cancelled
        } else {
            Self::io("Failed to read answer from terminal", err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Whether an `anyhow` chain ends in a user cancellation
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ScaffoldError>()
            .is_some_and(ScaffoldError::is_cancelled)
    })
}

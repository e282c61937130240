//! Scaffolder Core - library behind `create-pixi-vn`
//!
//! Turns a set of answers (project name, genre, UI framework, narrative
//! language, target devices) into a new project directory built from one of
//! the pre-built Pixi'VN templates.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - selection validation, template
//!   resolution, placeholder substitution, the conflict-aware copier
//! - **Layer 2: Workflow Orchestration** - [`scaffold::scaffold`] plus the
//!   `ProductConfig` trait and post-scaffold tools (git, install, editor)
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffolder_core::{scaffold, templates, OverwritePolicy, KeepExisting};
//!
//! let mut fetcher = templates::TemplateFetcher::from_local("templates".into(), "my-cli");
//! let ctx = scaffold::Context::from_process();
//! let outcome = scaffold::scaffold(
//!     &ctx,
//!     &selection,
//!     OverwritePolicy::Skip,
//!     &mut fetcher,
//!     &mut KeepExisting,
//! )
//! .await?;
//! ```

pub mod error;
pub mod paths;
pub mod policy;
pub mod product;
pub mod runtime;
pub mod scaffold;
pub mod selection;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{is_cancellation, ResolutionError, ScaffoldError, SelectionError};
pub use policy::OverwritePolicy;
pub use product::ProductConfig;
pub use scaffold::{scaffold, Context, ScaffoldOutcome};
pub use selection::{
    GameSelection, GameType, NarrativeLanguage, ProjectInfo, RawGameAnswers, Selection,
    UiFramework,
};
pub use templates::{
    resolve, ConflictPrompt, Copier, CopyReport, KeepExisting, TemplateDescriptor,
    TemplateFetcher, TemplateSource,
};

#[cfg(feature = "tui")]
pub use tui::run;

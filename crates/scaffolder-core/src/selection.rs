//! User selections and the genre catalog they are validated against

use crate::error::SelectionError;
use clap::ValueEnum;
use std::fmt;

/// Top-level game type (genre)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum GameType {
    VisualNovel,
    GameEngine,
}

impl GameType {
    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::VisualNovel => "Visual Novel",
            GameType::GameEngine => "Game Engine",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum UiFramework {
    React,
    Vue,
    Angular,
}

impl UiFramework {
    pub fn display_name(&self) -> &'static str {
        match self {
            UiFramework::React => "React",
            UiFramework::Vue => "Vue",
            UiFramework::Angular => "Angular",
        }
    }
}

impl fmt::Display for UiFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Language the story itself is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum NarrativeLanguage {
    Typescript,
    Ink,
    Renpy,
}

impl NarrativeLanguage {
    pub fn display_name(&self) -> &'static str {
        match self {
            NarrativeLanguage::Typescript => "Typescript",
            NarrativeLanguage::Ink => "Ink + Typescript",
            NarrativeLanguage::Renpy => "Ren'Py",
        }
    }
}

impl fmt::Display for NarrativeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Options a genre declares to the prompt layer
#[derive(Debug, Clone, Copy)]
pub struct Genre {
    pub game_type: GameType,
    pub ui_frameworks: &'static [UiFramework],
    pub narrative_languages: &'static [NarrativeLanguage],
    /// Whether the "which devices" question is asked
    pub multi_device: bool,
}

pub const GENRES: &[Genre] = &[
    Genre {
        game_type: GameType::VisualNovel,
        ui_frameworks: &[UiFramework::React, UiFramework::Vue, UiFramework::Angular],
        narrative_languages: &[
            NarrativeLanguage::Typescript,
            NarrativeLanguage::Ink,
            NarrativeLanguage::Renpy,
        ],
        multi_device: true,
    },
    Genre {
        game_type: GameType::GameEngine,
        ui_frameworks: &[],
        narrative_languages: &[],
        multi_device: false,
    },
];

/// Look up the catalog entry for a game type
pub fn genre(game_type: GameType) -> &'static Genre {
    GENRES
        .iter()
        .find(|g| g.game_type == game_type)
        .unwrap_or(&GENRES[0])
}

/// Answers as the prompt layer collected them, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGameAnswers {
    pub game_type: GameType,
    pub ui_framework: Option<UiFramework>,
    pub narrative_language: Option<NarrativeLanguage>,
    pub multi_device: Option<bool>,
}

/// Game choices, shaped per genre so that only relevant fields exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSelection {
    VisualNovel {
        ui_framework: UiFramework,
        narrative_language: NarrativeLanguage,
        multi_device: bool,
    },
    GameEngine,
}

impl GameSelection {
    /// Validate raw answers against the genre catalog
    pub fn from_answers(raw: RawGameAnswers) -> Result<Self, SelectionError> {
        let genre = genre(raw.game_type);

        let ui_framework = check_option(
            genre.game_type,
            "UI framework",
            genre.ui_frameworks,
            raw.ui_framework,
        )?;
        let narrative_language = check_option(
            genre.game_type,
            "narrative language",
            genre.narrative_languages,
            raw.narrative_language,
        )?;
        let multi_device = match (genre.multi_device, raw.multi_device) {
            (false, Some(true)) => {
                return Err(SelectionError::Unexpected {
                    genre: genre.game_type,
                    field: "device target",
                    value: "multi-device".to_string(),
                })
            }
            (_, value) => value.unwrap_or(false),
        };

        match (genre.game_type, ui_framework, narrative_language) {
            (GameType::VisualNovel, Some(ui_framework), Some(narrative_language)) => {
                Ok(GameSelection::VisualNovel {
                    ui_framework,
                    narrative_language,
                    multi_device,
                })
            }
            (GameType::GameEngine, None, None) => Ok(GameSelection::GameEngine),
            // check_option already rejected any other shape
            (game_type, _, _) => Err(SelectionError::Missing {
                genre: game_type,
                field: "UI framework",
            }),
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            GameSelection::VisualNovel { .. } => GameType::VisualNovel,
            GameSelection::GameEngine => GameType::GameEngine,
        }
    }

    pub fn multi_device(&self) -> bool {
        matches!(
            self,
            GameSelection::VisualNovel {
                multi_device: true,
                ..
            }
        )
    }
}

/// An empty `declared` list means the question must not have been asked.
fn check_option<T: Copy + PartialEq + fmt::Display>(
    genre: GameType,
    field: &'static str,
    declared: &[T],
    value: Option<T>,
) -> Result<Option<T>, SelectionError> {
    match value {
        None if declared.is_empty() => Ok(None),
        None => Err(SelectionError::Missing { genre, field }),
        Some(v) if declared.is_empty() => Err(SelectionError::Unexpected {
            genre,
            field,
            value: v.to_string(),
        }),
        Some(v) if declared.contains(&v) => Ok(Some(v)),
        Some(v) => Err(SelectionError::NotOffered {
            genre,
            field,
            value: v.to_string(),
        }),
    }
}

/// Free-text project answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub project_name: String,
    pub description: String,
    pub package_name: String,
    /// Target folder as typed, relative to the working directory
    pub target_dir: String,
    /// Reverse-DNS app identifier, only used by multi-device templates
    pub identifier: Option<String>,
}

/// Everything the orchestrator needs from the prompt layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub project: ProjectInfo,
    pub game: GameSelection,
}

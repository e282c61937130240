//! Mapping game selections to template identifiers

use crate::error::ResolutionError;
use crate::selection::{GameSelection, GameType, NarrativeLanguage, UiFramework};

/// Template chosen for a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub template_id: &'static str,
    /// "Getting started" file, relative to the project root
    pub file_to_open: Option<&'static str>,
}

/// Lookup key: one row per supported combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TemplateKey {
    game_type: GameType,
    ui_framework: Option<UiFramework>,
    narrative_language: Option<NarrativeLanguage>,
    multi_device: bool,
}

impl From<&GameSelection> for TemplateKey {
    fn from(selection: &GameSelection) -> Self {
        match *selection {
            GameSelection::VisualNovel {
                ui_framework,
                narrative_language,
                multi_device,
            } => TemplateKey {
                game_type: GameType::VisualNovel,
                ui_framework: Some(ui_framework),
                narrative_language: Some(narrative_language),
                multi_device,
            },
            GameSelection::GameEngine => TemplateKey {
                game_type: GameType::GameEngine,
                ui_framework: None,
                narrative_language: None,
                multi_device: false,
            },
        }
    }
}

struct TemplateEntry {
    key: TemplateKey,
    descriptor: TemplateDescriptor,
}

const fn visual_novel(
    ui_framework: UiFramework,
    narrative_language: NarrativeLanguage,
    multi_device: bool,
    template_id: &'static str,
    file_to_open: &'static str,
) -> TemplateEntry {
    TemplateEntry {
        key: TemplateKey {
            game_type: GameType::VisualNovel,
            ui_framework: Some(ui_framework),
            narrative_language: Some(narrative_language),
            multi_device,
        },
        descriptor: TemplateDescriptor {
            template_id,
            file_to_open: Some(file_to_open),
        },
    }
}

const TEMPLATES: &[TemplateEntry] = &[
    visual_novel(
        UiFramework::React,
        NarrativeLanguage::Typescript,
        false,
        "template-react-vite-muijoy",
        "src/labels/startLabel.ts",
    ),
    visual_novel(
        UiFramework::React,
        NarrativeLanguage::Typescript,
        true,
        "template-react-vite-muijoy-tauri",
        "src/labels/startLabel.ts",
    ),
    visual_novel(
        UiFramework::React,
        NarrativeLanguage::Ink,
        false,
        "template-react-vite-muijoy-ink",
        "src/ink/start.ink",
    ),
    visual_novel(
        UiFramework::React,
        NarrativeLanguage::Ink,
        true,
        "template-react-vite-muijoy-ink-tauri",
        "src/ink/start.ink",
    ),
    TemplateEntry {
        key: TemplateKey {
            game_type: GameType::GameEngine,
            ui_framework: None,
            narrative_language: None,
            multi_device: false,
        },
        descriptor: TemplateDescriptor {
            template_id: "template-game-engine",
            file_to_open: Some("src/index.ts"),
        },
    },
];

/// Resolve a selection to its template. No I/O.
pub fn resolve(selection: &GameSelection) -> Result<TemplateDescriptor, ResolutionError> {
    let key = TemplateKey::from(selection);

    TEMPLATES
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.descriptor.clone())
        .ok_or_else(|| ResolutionError::new(miss_reason(&key)))
}

/// Explain a lookup miss by the first level of the key with no matching row
fn miss_reason(key: &TemplateKey) -> &'static str {
    let genre_rows: Vec<&TemplateKey> = TEMPLATES
        .iter()
        .map(|e| &e.key)
        .filter(|k| k.game_type == key.game_type)
        .collect();
    if genre_rows.is_empty() {
        return ResolutionError::NO_GENRE_TEMPLATE;
    }
    let ui_rows: Vec<&TemplateKey> = genre_rows
        .into_iter()
        .filter(|k| k.ui_framework == key.ui_framework)
        .collect();
    if ui_rows.is_empty() {
        return ResolutionError::NO_UI_TEMPLATE;
    }
    if !ui_rows
        .iter()
        .any(|k| k.narrative_language == key.narrative_language)
    {
        return ResolutionError::NO_NARRATIVE_TEMPLATE;
    }
    ResolutionError::NO_DEVICE_TEMPLATE
}

/// Whether any template exists below a partial choice.
///
/// Lets the prompt layer hide options that can only fail.
pub fn has_templates(
    game_type: GameType,
    ui_framework: Option<UiFramework>,
    narrative_language: Option<NarrativeLanguage>,
) -> bool {
    TEMPLATES.iter().any(|e| {
        e.key.game_type == game_type
            && ui_framework.map_or(true, |ui| e.key.ui_framework == Some(ui))
            && narrative_language.map_or(true, |lang| e.key.narrative_language == Some(lang))
    })
}

/// Whether a multi-device variant exists for a partial choice
pub fn has_multi_device_template(
    game_type: GameType,
    ui_framework: Option<UiFramework>,
    narrative_language: Option<NarrativeLanguage>,
) -> bool {
    TEMPLATES.iter().any(|e| {
        e.key.multi_device
            && e.key.game_type == game_type
            && e.key.ui_framework == ui_framework
            && e.key.narrative_language == narrative_language
    })
}

/// Every template the resolver can produce
pub fn descriptors() -> impl Iterator<Item = &'static TemplateDescriptor> {
    TEMPLATES.iter().map(|e| &e.descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{genre, RawGameAnswers};
    use clap::ValueEnum;

    fn vn(ui: UiFramework, lang: NarrativeLanguage, multi_device: bool) -> GameSelection {
        GameSelection::VisualNovel {
            ui_framework: ui,
            narrative_language: lang,
            multi_device,
        }
    }

    #[test]
    fn test_react_typescript_web() {
        let d = resolve(&vn(UiFramework::React, NarrativeLanguage::Typescript, false)).unwrap();
        assert_eq!(d.template_id, "template-react-vite-muijoy");
        assert_eq!(d.file_to_open, Some("src/labels/startLabel.ts"));
    }

    #[test]
    fn test_react_typescript_multi_device() {
        let d = resolve(&vn(UiFramework::React, NarrativeLanguage::Typescript, true)).unwrap();
        assert_eq!(d.template_id, "template-react-vite-muijoy-tauri");
        assert_eq!(d.file_to_open, Some("src/labels/startLabel.ts"));
    }

    #[test]
    fn test_react_ink() {
        let web = resolve(&vn(UiFramework::React, NarrativeLanguage::Ink, false)).unwrap();
        let tauri = resolve(&vn(UiFramework::React, NarrativeLanguage::Ink, true)).unwrap();
        assert_eq!(web.template_id, "template-react-vite-muijoy-ink");
        assert_eq!(tauri.template_id, "template-react-vite-muijoy-ink-tauri");
        assert_eq!(web.file_to_open, Some("src/ink/start.ink"));
    }

    #[test]
    fn test_game_engine_skips_inner_levels() {
        let d = resolve(&GameSelection::GameEngine).unwrap();
        assert_eq!(d.template_id, "template-game-engine");
        assert_eq!(d.file_to_open, Some("src/index.ts"));
    }

    #[test]
    fn test_vue_has_no_template() {
        let err = resolve(&vn(UiFramework::Vue, NarrativeLanguage::Typescript, false)).unwrap_err();
        assert_eq!(err.reason, ResolutionError::NO_UI_TEMPLATE);
        assert!(err.to_string().contains("UI framework"));
    }

    #[test]
    fn test_renpy_has_no_template() {
        let err = resolve(&vn(UiFramework::React, NarrativeLanguage::Renpy, true)).unwrap_err();
        assert_eq!(err.reason, ResolutionError::NO_NARRATIVE_TEMPLATE);
    }

    #[test]
    fn test_every_declared_combination_resolves_or_fails_loudly() {
        for game_type in GameType::value_variants() {
            let g = genre(*game_type);
            let uis: Vec<Option<UiFramework>> = if g.ui_frameworks.is_empty() {
                vec![None]
            } else {
                g.ui_frameworks.iter().copied().map(Some).collect()
            };
            let langs: Vec<Option<NarrativeLanguage>> = if g.narrative_languages.is_empty() {
                vec![None]
            } else {
                g.narrative_languages.iter().copied().map(Some).collect()
            };
            let devices: &[bool] = if g.multi_device { &[false, true] } else { &[false] };

            for ui in &uis {
                for lang in &langs {
                    for multi_device in devices {
                        let selection = GameSelection::from_answers(RawGameAnswers {
                            game_type: *game_type,
                            ui_framework: *ui,
                            narrative_language: *lang,
                            multi_device: Some(*multi_device),
                        })
                        .unwrap();
                        let in_table = TEMPLATES
                            .iter()
                            .any(|e| e.key == TemplateKey::from(&selection));
                        assert_eq!(resolve(&selection).is_ok(), in_table);
                    }
                }
            }
        }
    }

    #[test]
    fn test_option_filters_follow_table() {
        assert!(has_templates(GameType::VisualNovel, Some(UiFramework::React), None));
        assert!(!has_templates(GameType::VisualNovel, Some(UiFramework::Angular), None));
        assert!(!has_templates(
            GameType::VisualNovel,
            Some(UiFramework::React),
            Some(NarrativeLanguage::Renpy)
        ));
        assert!(has_multi_device_template(
            GameType::VisualNovel,
            Some(UiFramework::React),
            Some(NarrativeLanguage::Ink)
        ));
        assert!(!has_multi_device_template(GameType::GameEngine, None, None));
    }

    #[test]
    fn test_template_ids_are_unique() {
        let ids: Vec<_> = descriptors().map(|d| d.template_id).collect();
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }
}

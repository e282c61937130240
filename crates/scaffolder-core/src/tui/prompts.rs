//! Charm-style CLI prompts using cliclack

use crate::error::{Result as ScaffoldResult, ScaffoldError};
use crate::paths::{
    default_project_name, format_target_dir, is_empty_dir, is_valid_package_name,
    target_dir_from_arg, to_valid_package_name, DEFAULT_DESCRIPTION, DEFAULT_TARGET_DIR,
};
use crate::policy::OverwritePolicy;
use crate::product::ProductConfig;
use crate::runtime::{self, EditorLaunch, GitInit, Ide, PackageManager};
use crate::scaffold::{scaffold, Context, ScaffoldOutcome};
use crate::selection::{
    genre, GameSelection, GameType, NarrativeLanguage, ProjectInfo, RawGameAnswers, Selection,
    UiFramework, GENRES,
};
use crate::templates::resolver::{has_multi_device_template, has_templates};
use crate::templates::substitution::default_identifier;
use crate::templates::{
    resolve, version, ConflictPrompt, TemplateDescriptor, TemplateFetcher, TemplateSource,
};
use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project directory to create, relative to the working directory
    pub directory: Option<String>,

    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    pub game_type: Option<GameType>,
    pub ui_framework: Option<UiFramework>,
    pub narrative_language: Option<NarrativeLanguage>,

    /// Also target desktop and mobile
    pub multi_device: Option<bool>,

    pub identifier: Option<String>,

    /// What to do when the target directory is not empty
    pub overwrite: Option<OverwritePolicy>,

    pub ide: Option<Ide>,

    /// Skip `git init`
    pub no_git: bool,

    /// Install dependencies after scaffolding
    pub install: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Turn a prompt failure into an error, Esc / Ctrl-C becoming cancellation
fn answer<T>(result: std::io::Result<T>) -> Result<T> {
    result.map_err(|e| ScaffoldError::from_prompt(e).into())
}

/// Asks about each conflicting file under [`OverwritePolicy::Ask`]
struct CliclackPrompt;

impl ConflictPrompt for CliclackPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> ScaffoldResult<bool> {
        cliclack::confirm(format!(
            "File {} already exists. Do you want to overwrite it?",
            path.display()
        ))
        .initial_value(false)
        .interact()
        .map_err(ScaffoldError::from_prompt)
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let ctx = Context::from_process();

    // Step 1: Project info and what to do with existing files
    let project = prompt_project_info(&ctx, &args)?;
    let policy = select_overwrite_policy(&ctx, &project.target_dir, &args)?;
    if policy == OverwritePolicy::Cancel {
        return Err(ScaffoldError::Cancelled.into());
    }

    // Step 2: Game choices
    let game = select_game(&args)?;
    let identifier = if game.multi_device() {
        Some(prompt_identifier(&project.package_name, &args)?)
    } else {
        None
    };
    let selection = Selection {
        project: ProjectInfo {
            identifier,
            ..project
        },
        game,
    };
    let template = resolve(&selection.game).map_err(ScaffoldError::from)?;

    // Step 3: Template source
    let mut fetcher = setup_fetcher(config, &args.template_dir)?;
    check_template_available(config, &fetcher, &template, cli_version).await?;

    // Step 4: Create project
    let outcome = create_project(&ctx, &selection, policy, &mut fetcher).await?;

    // Step 5: Post-scaffold actions
    check_runtimes(selection.game.multi_device())?;
    init_git(&outcome.root_folder, &args).await?;
    let package_manager = ctx.package_manager();
    let installed = install_dependencies(&package_manager, &outcome.root_folder, &args).await?;
    open_editor(&outcome, &args).await?;

    // Step 6: Show next steps
    print_next_steps(config, &ctx, &outcome, &package_manager, installed)?;

    Ok(())
}

fn prompt_project_info(ctx: &Context, args: &CreateArgs) -> Result<ProjectInfo> {
    let target_dir = match target_dir_from_arg(args.directory.as_deref()) {
        Some(dir) => {
            cliclack::log::info(format!("Using directory: {}", dir))?;
            dir
        }
        None if args.yes => DEFAULT_TARGET_DIR.to_string(),
        None => {
            let input: String = answer(
                cliclack::input("Project name:")
                    .placeholder(DEFAULT_TARGET_DIR)
                    .default_input(DEFAULT_TARGET_DIR)
                    .validate(|input: &String| {
                        if format_target_dir(input).is_empty() {
                            Err("Project name cannot be empty")
                        } else {
                            Ok(())
                        }
                    })
                    .interact(),
            )?;
            format_target_dir(&input)
        }
    };
    let project_name = default_project_name(&target_dir, &ctx.cwd);

    let description = if args.yes {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        answer(
            cliclack::input("Project description:")
                .placeholder(DEFAULT_DESCRIPTION)
                .default_input(DEFAULT_DESCRIPTION)
                .interact(),
        )?
    };

    let suggested = to_valid_package_name(&project_name);
    let package_name = if args.yes {
        suggested
    } else {
        answer(
            cliclack::input("Package name:")
                .placeholder(&suggested)
                .default_input(&suggested)
                .validate(|input: &String| {
                    if is_valid_package_name(input) {
                        Ok(())
                    } else {
                        Err("Invalid package name. The name can only include URL-friendly characters.")
                    }
                })
                .interact(),
        )?
    };

    Ok(ProjectInfo {
        project_name,
        description,
        package_name,
        target_dir,
        identifier: None,
    })
}

/// Only asked when the destination has something in it besides `.git`
fn select_overwrite_policy(
    ctx: &Context,
    target_dir: &str,
    args: &CreateArgs,
) -> Result<OverwritePolicy> {
    let root = ctx.project_root(target_dir);
    if is_empty_dir(&root)? {
        return Ok(OverwritePolicy::Skip);
    }

    let shown = if target_dir == "." {
        "Current directory".to_string()
    } else {
        format!("Target directory \"{}\"", target_dir)
    };
    cliclack::log::warning(format!("{} is not empty", shown))?;

    if let Some(policy) = args.overwrite {
        cliclack::log::info(format!("Existing files: {}", policy.description()))?;
        return Ok(policy);
    }
    if args.yes {
        cliclack::log::info(format!(
            "Existing files: {} (--yes mode)",
            OverwritePolicy::Skip.description()
        ))?;
        return Ok(OverwritePolicy::Skip);
    }

    let mut select = cliclack::select("Overwrite existing files?");
    for policy in [
        OverwritePolicy::DeleteAll,
        OverwritePolicy::Overwrite,
        OverwritePolicy::Skip,
        OverwritePolicy::Ask,
        OverwritePolicy::Cancel,
    ] {
        select = select.item(policy, policy.display_name(), policy.description());
    }
    answer(select.initial_value(OverwritePolicy::Skip).interact())
}

/// Collect game answers, offering only options that lead to a template.
/// Flags are passed through untouched so invalid ones surface as errors.
fn select_game(args: &CreateArgs) -> Result<GameSelection> {
    let game_type = match args.game_type {
        Some(game_type) => game_type,
        None if args.yes => GameType::VisualNovel,
        None => {
            let mut select = cliclack::select("Select the type of game you want to create:");
            for genre in GENRES.iter().filter(|g| has_templates(g.game_type, None, None)) {
                select = select.item(genre.game_type, genre.game_type.display_name(), "");
            }
            answer(select.interact())?
        }
    };
    let genre = genre(game_type);

    let ui_framework = match args.ui_framework {
        Some(ui) => Some(ui),
        None if genre.ui_frameworks.is_empty() => None,
        None => {
            let offered: Vec<UiFramework> = genre
                .ui_frameworks
                .iter()
                .copied()
                .filter(|ui| has_templates(game_type, Some(*ui), None))
                .collect();
            Some(pick(
                "Select the UI framework you want to use:",
                &offered,
                args.yes,
                ui_label,
            )?)
        }
    };

    let narrative_language = match args.narrative_language {
        Some(lang) => Some(lang),
        None if genre.narrative_languages.is_empty() => None,
        None => {
            let offered: Vec<NarrativeLanguage> = genre
                .narrative_languages
                .iter()
                .copied()
                .filter(|lang| has_templates(game_type, ui_framework, Some(*lang)))
                .collect();
            Some(pick(
                "Select the narrative language you want to use:",
                &offered,
                args.yes,
                narrative_label,
            )?)
        }
    };

    let multi_device = match args.multi_device {
        Some(value) => Some(value),
        None if !genre.multi_device => None,
        None if args.yes => Some(false),
        None if !has_multi_device_template(game_type, ui_framework, narrative_language) => {
            Some(false)
        }
        None => Some(answer(
            cliclack::select("Which devices is the project intended for?")
                .item(false, "Web page", "")
                .item(true, "Web page + Desktop + Mobile (Tauri)", "")
                .interact(),
        )?),
    };

    let selection = GameSelection::from_answers(RawGameAnswers {
        game_type,
        ui_framework,
        narrative_language,
        multi_device,
    })
    .map_err(ScaffoldError::from)?;
    Ok(selection)
}

/// Select among `offered`; the first entry is the non-interactive default
fn pick<T>(prompt: &str, offered: &[T], yes: bool, label: fn(&T) -> String) -> Result<T>
where
    T: Copy + Eq + 'static,
{
    let Some(first) = offered.first().copied() else {
        anyhow::bail!("No templates available for this choice.");
    };
    if yes || offered.len() == 1 {
        cliclack::log::info(format!("{} {}", prompt, label(&first)))?;
        return Ok(first);
    }
    let mut select = cliclack::select(prompt);
    for option in offered {
        select = select.item(*option, label(option), "");
    }
    answer(select.interact())
}

fn ui_label(ui: &UiFramework) -> String {
    let name = style(ui.display_name());
    match ui {
        UiFramework::React => name.cyan(),
        UiFramework::Vue => name.green(),
        UiFramework::Angular => name.red(),
    }
    .to_string()
}

fn narrative_label(lang: &NarrativeLanguage) -> String {
    let name = style(lang.display_name());
    match lang {
        NarrativeLanguage::Typescript => name.cyan(),
        NarrativeLanguage::Ink => name,
        NarrativeLanguage::Renpy => name.red(),
    }
    .to_string()
}

fn prompt_identifier(package_name: &str, args: &CreateArgs) -> Result<String> {
    if let Some(identifier) = &args.identifier {
        return Ok(identifier.clone());
    }
    let suggested = default_identifier(package_name);
    if args.yes {
        return Ok(suggested);
    }
    answer(
        cliclack::input("Project identifier:")
            .placeholder(&suggested)
            .default_input(&suggested)
            .validate(|input: &String| {
                if input.trim().is_empty() {
                    Err("Project identifier cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact(),
    )
}

fn setup_fetcher<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<TemplateFetcher> {
    let fetcher = match template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateFetcher::from_local(path.clone(), config.user_agent())
        }
        None => {
            let fetcher = TemplateFetcher::from_config(config)?;
            let kind = match fetcher.source() {
                TemplateSource::Local(_) => "bundled",
                TemplateSource::Remote(_) => "remote",
            };
            cliclack::log::info(format!(
                "Using {} templates from {}",
                kind,
                fetcher.source().location()
            ))?;
            fetcher
        }
    };

    Ok(fetcher)
}

/// Check the root manifest lists the template and warn on an outdated CLI
async fn check_template_available<C: ProductConfig>(
    config: &C,
    fetcher: &TemplateFetcher,
    template: &TemplateDescriptor,
    cli_version: &str,
) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");

    let root_manifest = match fetcher.fetch_root_manifest().await {
        Ok(manifest) => manifest,
        Err(e) => {
            spinner.stop("Failed to load templates");
            return Err(e);
        }
    };

    if !root_manifest.contains(template.template_id) {
        spinner.stop("Failed to load templates");
        return Err(ScaffoldError::TemplateNotFound {
            id: template.template_id.to_string(),
            location: fetcher.source().location(),
        }
        .into());
    }
    spinner.stop(format!("Template: {}", template.template_id));

    if let Some(template_version) = &root_manifest.version {
        if let Some(warning) =
            version::check_compatibility(cli_version, template_version, config.upgrade_command())
        {
            cliclack::log::warning(format!("Version warning: {}", warning))?;
        }
    }

    Ok(())
}

async fn create_project(
    ctx: &Context,
    selection: &Selection,
    policy: OverwritePolicy,
    fetcher: &mut TemplateFetcher,
) -> Result<ScaffoldOutcome> {
    let root = ctx.project_root(&selection.project.target_dir);
    let mut prompt = CliclackPrompt;

    // The spinner would draw over per-file questions
    if policy == OverwritePolicy::Ask {
        cliclack::log::step(format!("Scaffolding project in {}...", root.display()))?;
        let outcome = scaffold(ctx, selection, policy, fetcher, &mut prompt).await?;
        cliclack::log::success(format!(
            "Created {} files in {}",
            outcome.report.written.len(),
            outcome.root_folder.display()
        ))?;
        return Ok(outcome);
    }

    let spinner = cliclack::spinner();
    spinner.start(format!("Scaffolding project in {}...", root.display()));
    match scaffold(ctx, selection, policy, fetcher, &mut prompt).await {
        Ok(outcome) => {
            spinner.stop(format!(
                "Created {} files in {}",
                outcome.report.written.len(),
                outcome.root_folder.display()
            ));
            if !outcome.report.kept.is_empty() {
                cliclack::log::info(format!(
                    "Kept {} existing files",
                    outcome.report.kept.len()
                ))?;
            }
            Ok(outcome)
        }
        Err(e) => {
            spinner.stop("Failed to create project");
            Err(e)
        }
    }
}

fn check_runtimes(multi_device: bool) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking runtimes...");

    let runtimes = runtime::check_runtimes(multi_device);
    let summary: Vec<String> = runtimes.iter().map(|r| r.summary()).collect();
    spinner.stop(format!("Detected runtimes: {}", summary.join(", ")));

    for missing in runtimes.iter().filter(|r| !r.available) {
        cliclack::log::warning(format!(
            "{} was not found. Install it from {} before running the project.",
            missing.name, missing.install_hint
        ))?;
    }
    Ok(())
}

async fn init_git(root: &Path, args: &CreateArgs) -> Result<()> {
    if args.no_git || runtime::has_git_repository(root) {
        return Ok(());
    }

    let confirm = if args.yes {
        true
    } else {
        answer(
            cliclack::confirm("Do you want to initialize a git repository? (recommended)")
                .initial_value(true)
                .interact(),
        )?
    };
    if !confirm {
        return Ok(());
    }

    match runtime::git_init(root).await {
        Ok(GitInit::Initialized) => cliclack::log::success("Initialized git repository")?,
        Ok(GitInit::AlreadyRepository) => {}
        Err(e) => cliclack::log::warning(format!("Git initialization failed: {:#}", e))?,
    }
    Ok(())
}

/// Returns whether dependencies are now installed
async fn install_dependencies(
    package_manager: &PackageManager,
    root: &Path,
    args: &CreateArgs,
) -> Result<bool> {
    let install = match args.install {
        Some(install) => install,
        None if args.yes => false,
        None => answer(
            cliclack::confirm(format!(
                "Install dependencies with {}?",
                package_manager.install_command()
            ))
            .initial_value(true)
            .interact(),
        )?,
    };
    if !install {
        return Ok(false);
    }

    cliclack::log::step(format!("Running {}...", package_manager.install_command()))?;
    match runtime::install_dependencies(package_manager, root).await {
        Ok(()) => {
            cliclack::log::success("Dependencies installed")?;
            Ok(true)
        }
        Err(e) => {
            cliclack::log::warning(format!("Dependency installation failed: {:#}", e))?;
            Ok(false)
        }
    }
}

async fn open_editor(outcome: &ScaffoldOutcome, args: &CreateArgs) -> Result<()> {
    let ide = match args.ide {
        Some(ide) => ide,
        None if args.yes => return Ok(()),
        None => {
            let mut select = cliclack::select("Which IDE do you want to use?");
            for ide in [Ide::Vscode, Ide::Cursor, Ide::Vscodium, Ide::Other] {
                select = select.item(ide, ide.display_name(), ide.binary().unwrap_or(""));
            }
            answer(select.initial_value(Ide::Vscode).interact())?
        }
    };

    match runtime::open_in_editor(ide, &outcome.root_folder, outcome.file_to_open()).await {
        Ok(EditorLaunch::Opened(binary)) => {
            cliclack::log::info(format!("Opened project with {}", binary))?
        }
        Ok(EditorLaunch::NotInPath(binary)) => cliclack::log::warning(format!(
            "Could not open project using {}, since {} was not in your PATH",
            binary, binary
        ))?,
        Ok(EditorLaunch::SystemHandler) => {}
        Err(e) => cliclack::log::warning(format!("{:#}", e))?,
    }
    Ok(())
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    ctx: &Context,
    outcome: &ScaffoldOutcome,
    package_manager: &PackageManager,
    installed: bool,
) -> Result<()> {
    let cd_path = ctx.cd_path(&outcome.root_folder);
    let steps = config.next_steps(cd_path.as_deref(), package_manager, installed);

    let numbered: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}.  {}", i + 1, step))
        .collect();
    cliclack::note("Next steps", numbered.join("\n"))?;

    cliclack::outro(format!("Done. Docs: {}", config.docs_url()))?;

    Ok(())
}

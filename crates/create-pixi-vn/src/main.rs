//! create-pixi-vn - Project scaffolding for Pixi'VN games

use clap::{Args as ClapArgs, Parser, Subcommand};
use scaffolder_core::runtime::{Ide, PackageManager};
use scaffolder_core::tui::CreateArgs;
use scaffolder_core::{
    is_cancellation, GameType, NarrativeLanguage, OverwritePolicy, ProductConfig, UiFramework,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Templates directory shipped at the repository root and next to release binaries
const TEMPLATES_DIR: &str = "templates";

/// Exit status for a run the user cancelled, same as Ctrl-C
const CANCELLED_EXIT: u8 = 130;

/// Pixi'VN product configuration
#[derive(Clone)]
pub struct PixiVnConfig;

impl ProductConfig for PixiVnConfig {
    fn name(&self) -> &'static str {
        "create-pixi-vn"
    }

    fn display_name(&self) -> &'static str {
        "Pixi'VN"
    }

    fn default_template_url(&self) -> &'static str {
        "https://raw.githubusercontent.com/DRincs-Productions/create-pixi-vn/main/templates"
    }

    fn template_url_env(&self) -> &'static str {
        "PIXI_VN_TEMPLATE_URL"
    }

    fn bundled_template_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(exe_dir.join(TEMPLATES_DIR));
        }
        // Source checkout, for `cargo run` and `cargo install --path`
        dirs.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(TEMPLATES_DIR));
        dirs
    }

    fn docs_url(&self) -> &'static str {
        "https://pixi-vn.web.app"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install create-pixi-vn --force"
    }

    fn next_steps(
        &self,
        cd_path: Option<&Path>,
        package_manager: &PackageManager,
        installed: bool,
    ) -> Vec<String> {
        let mut steps = Vec::new();

        if let Some(dir) = cd_path {
            let dir = dir.display().to_string();
            if dir.contains(' ') {
                steps.push(format!("cd \"{}\"", dir));
            } else {
                steps.push(format!("cd {}", dir));
            }
        }
        if !installed {
            steps.push(package_manager.install_command());
        }
        steps.push(package_manager.start_command());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-pixi-vn")]
#[command(about = "CLI for scaffolding Pixi'VN projects")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CliCreateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build zip files for all templates in the template directory (for development use)
    BuildZips(BuildZipsArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct CliCreateArgs {
    /// Project directory to create
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<String>,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Type of game to create
    #[arg(long = "genre", value_enum)]
    pub genre: Option<GameType>,

    /// UI framework (visual novels only)
    #[arg(long, value_enum)]
    pub ui: Option<UiFramework>,

    /// Narrative language (visual novels only)
    #[arg(long, value_enum)]
    pub narrative: Option<NarrativeLanguage>,

    /// Also build for desktop and mobile with Tauri
    #[arg(long = "multi-device", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub multi_device: Option<bool>,

    /// Reverse-DNS app identifier for multi-device projects
    #[arg(long)]
    pub identifier: Option<String>,

    /// What to do with files already in the target directory
    #[arg(long, value_enum)]
    pub overwrite: Option<OverwritePolicy>,

    /// Editor to open the project in
    #[arg(long, value_enum)]
    pub ide: Option<Ide>,

    /// Do not initialize a git repository
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Install dependencies after scaffolding
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub install: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            directory: args.directory,
            template_dir: args.template_dir,
            game_type: args.genre,
            ui_framework: args.ui,
            narrative_language: args.narrative,
            multi_device: args.multi_device,
            identifier: args.identifier,
            overwrite: args.overwrite,
            ide: args.ide,
            no_git: args.no_git,
            install: args.install,
            yes: args.yes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct BuildZipsArgs {
    /// Local directory containing templates to build zips from (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(i32::from(CANCELLED_EXIT));
    })
    .ok();

    let args = Args::parse();
    let config = PixiVnConfig;

    let result = match args.command {
        Some(Command::BuildZips(build_args)) => {
            scaffolder_core::templates::build_zips(&config, &build_args.template_dir).await
        }
        None => scaffolder_core::run(&config, args.create.into(), CLI_VERSION).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancellation(&e) => {
            let _ = cliclack::outro_cancel("Operation cancelled.");
            ExitCode::from(CANCELLED_EXIT)
        }
        Err(e) => {
            let _ = cliclack::log::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use scaffolder_core::templates::fetcher::build_local_zip;
    use scaffolder_core::templates::{descriptors, TemplateFetcher};

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_create_flags() {
        let args = Args::try_parse_from([
            "create-pixi-vn",
            "my game",
            "--genre",
            "visual-novel",
            "--ui",
            "react",
            "--narrative",
            "ink",
            "--multi-device",
            "--overwrite",
            "delete-all",
            "--no-git",
            "--yes",
        ])
        .unwrap();

        assert!(args.command.is_none());
        let create: CreateArgs = args.create.into();
        assert_eq!(create.directory.as_deref(), Some("my game"));
        assert_eq!(create.game_type, Some(GameType::VisualNovel));
        assert_eq!(create.ui_framework, Some(UiFramework::React));
        assert_eq!(create.narrative_language, Some(NarrativeLanguage::Ink));
        assert_eq!(create.multi_device, Some(true));
        assert_eq!(create.overwrite, Some(OverwritePolicy::DeleteAll));
        assert_eq!(create.install, None);
        assert!(create.no_git);
        assert!(create.yes);
    }

    #[test]
    fn test_parse_explicit_bool_flags() {
        let args =
            Args::try_parse_from(["create-pixi-vn", "--multi-device=false", "--install=true"])
                .unwrap();
        assert_eq!(args.create.multi_device, Some(false));
        assert_eq!(args.create.install, Some(true));
        assert!(args.create.directory.is_none());
    }

    #[test]
    fn test_parse_build_zips() {
        let args =
            Args::try_parse_from(["create-pixi-vn", "build-zips", "--template-dir", "templates"])
                .unwrap();
        match args.command {
            Some(Command::BuildZips(build)) => {
                assert_eq!(build.template_dir, Some(PathBuf::from("templates")))
            }
            None => panic!("expected build-zips"),
        }
    }

    #[tokio::test]
    async fn test_bundled_templates_cover_every_resolvable_template() {
        let dir = PixiVnConfig
            .bundled_template_dirs()
            .into_iter()
            .find(|dir| dir.join("template.yaml").is_file())
            .expect("repository ships templates/template.yaml");

        let manifest = TemplateFetcher::from_local(dir.clone(), "test")
            .fetch_root_manifest()
            .await
            .unwrap();
        let version = manifest.version.as_deref().expect("manifest declares a version");
        assert!(semver::Version::parse(version).is_ok());

        for descriptor in descriptors() {
            let id = descriptor.template_id;
            assert!(manifest.templates.iter().any(|t| t == id), "{id} not in manifest");

            let root = dir.join(id);
            assert!(root.join("package.json").is_file(), "{id} has no package.json");
            if let Some(file) = descriptor.file_to_open {
                assert!(root.join(file).is_file(), "{id} has no {file}");
            }
            assert!(!build_local_zip(&dir, id).unwrap().is_empty());
        }
    }

    #[test]
    fn test_next_steps_npm() {
        let pm = PackageManager::default();
        let steps = PixiVnConfig.next_steps(Some(Path::new("my-game")), &pm, false);
        assert_eq!(steps, vec!["cd my-game", "npm install", "npm run start"]);
    }

    #[test]
    fn test_next_steps_yarn_installed_in_cwd() {
        let pm = PackageManager::from_user_agent(Some("yarn/1.22.19 npm/? node/v20.11.0"));
        let steps = PixiVnConfig.next_steps(None, &pm, true);
        assert_eq!(steps, vec!["yarn dev"]);
    }

    #[test]
    fn test_next_steps_quotes_spaces() {
        let pm = PackageManager::default();
        let steps = PixiVnConfig.next_steps(Some(Path::new("my game")), &pm, true);
        assert_eq!(steps[0], "cd \"my game\"");
    }
}

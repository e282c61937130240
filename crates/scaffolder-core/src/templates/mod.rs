//! Template resolution, fetching, substitution and copying
//!
//! This module provides:
//! - The resolver mapping game selections to template ids
//! - Template fetching from remote zips or local directories
//! - Placeholder substitution for manifest files
//! - The conflict-aware copier
//! - Version compatibility checking

pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod resolver;
pub mod substitution;
pub mod version;

use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub use copier::{ConflictPrompt, Copier, CopyReport, KeepExisting};
pub use fetcher::{TemplateFetcher, TemplateSource};
pub use manifest::RootManifest;
pub use resolver::{descriptors, resolve, TemplateDescriptor};
pub use substitution::{substitute, SubstitutionMap};
pub use version::check_compatibility;

/// Build zip files for all templates in a directory
pub async fn build_zips<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<()> {
    let dir = template_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("templates"));

    if !dir.exists() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    let root_manifest = TemplateFetcher::from_local(dir.clone(), config.user_agent())
        .fetch_root_manifest()
        .await?;

    println!(
        "{}",
        format!("Building {} template zips...", config.display_name())
            .cyan()
            .bold()
    );
    println!();

    for descriptor in resolver::descriptors() {
        if !root_manifest
            .templates
            .iter()
            .any(|id| id == descriptor.template_id)
        {
            eprintln!(
                "{} {} is not listed in the root manifest",
                "Warning:".yellow(),
                descriptor.template_id
            );
        }
    }

    let mut built = 0;
    for template_id in &root_manifest.templates {
        let template_path = dir.join(template_id);
        if !template_path.is_dir() {
            eprintln!(
                "{} Template directory not found: {}",
                "Warning:".yellow(),
                template_path.display()
            );
            continue;
        }

        print!("  {} {}...", "->".blue(), template_id);

        match fetcher::build_local_zip(&dir, template_id) {
            Ok(zip_bytes) => {
                let zip_path = dir.join(format!("{}.zip", template_id));
                tokio::fs::write(&zip_path, &zip_bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", zip_path.display()))?;
                println!(" {} ({} bytes)", "done".green(), zip_bytes.len());
                built += 1;
            }
            Err(e) => {
                println!(" {}", "failed".red());
                eprintln!("    Error: {:#}", e);
            }
        }
    }

    println!();
    println!(
        "{} {} template zip(s) in {}",
        "Built".green().bold(),
        built,
        dir.display()
    );

    Ok(())
}

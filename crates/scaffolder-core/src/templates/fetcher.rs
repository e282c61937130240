//! Template fetching from a remote URL or a local directory
//!
//! Both sources end in a plain directory tree that the copier reads:
//! - Remote: downloads `<base>/<template>.zip` and extracts it into a staging
//!   directory owned by the fetcher
//! - Local: the template is a subdirectory of the given path

use super::copier::is_excluded;
use super::manifest::RootManifest;
use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use url::Url;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const ROOT_MANIFEST: &str = "template.yaml";

/// Directories left out of built zips in addition to the copier's exclusions
const ZIP_SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "target"];

/// Template source - either remote URL or local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Source from the product config.
    ///
    /// Order: the env override URL, then the first bundled directory holding
    /// a root manifest, then the default URL.
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        if let Ok(url_str) = std::env::var(config.template_url_env()) {
            return Self::remote(&url_str);
        }
        if let Some(dir) = config
            .bundled_template_dirs()
            .into_iter()
            .find(|dir| dir.join(ROOT_MANIFEST).is_file())
        {
            return Ok(Self::Local(dir));
        }
        Self::remote(config.default_template_url())
    }

    fn remote(url_str: &str) -> Result<Self> {
        let url =
            Url::parse(url_str).with_context(|| format!("Invalid template URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }

    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    pub fn location(&self) -> String {
        match self {
            TemplateSource::Remote(url) => url.to_string(),
            TemplateSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Resolves template ids to directories on disk
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    /// Extraction area for downloaded templates; removed on drop
    staging: Option<TempDir>,
    extracted: HashMap<String, PathBuf>,
}

impl TemplateFetcher {
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            staging: None,
            extracted: HashMap::new(),
        }
    }

    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Build a URL by appending a path segment, preserving query parameters
    fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(path_segment);
        Ok(url)
    }

    /// Fetch the root manifest. A local directory without one lists its
    /// subdirectories as templates.
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::build_url(base_url, ROOT_MANIFEST)?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| {
                        format!("Failed to fetch root template manifest from {}", url)
                    })?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch root manifest from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                let content = response.text().await?;
                serde_yaml::from_str(&content).context("Failed to parse root manifest")
            }
            TemplateSource::Local(path) => {
                let manifest_path = path.join(ROOT_MANIFEST);
                if manifest_path.exists() {
                    let content = fs::read_to_string(&manifest_path)
                        .await
                        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
                    return serde_yaml::from_str(&content)
                        .with_context(|| format!("Failed to parse {}", manifest_path.display()));
                }
                Self::list_local_templates(path).await
            }
        }
    }

    async fn list_local_templates(path: &Path) -> Result<RootManifest> {
        let mut entries = fs::read_dir(path)
            .await
            .with_context(|| format!("Template directory not found: {}", path.display()))?;
        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                templates.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        templates.sort();
        Ok(RootManifest {
            version: None,
            templates,
        })
    }

    /// Directory holding the template's files, downloading it if needed
    pub async fn template_dir(&mut self, template_id: &str) -> Result<PathBuf> {
        if let Some(dir) = self.extracted.get(template_id) {
            return Ok(dir.clone());
        }

        let dir = match &self.source {
            TemplateSource::Local(path) => {
                let dir = path.join(template_id);
                if !fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
                    return Err(ScaffoldError::TemplateNotFound {
                        id: template_id.to_string(),
                        location: path.display().to_string(),
                    }
                    .into());
                }
                dir
            }
            TemplateSource::Remote(base_url) => {
                let zip_url = Self::build_url(base_url, &format!("{}.zip", template_id))?;
                let response = self
                    .client
                    .get(zip_url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template zip: {}", template_id))?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScaffoldError::TemplateNotFound {
                        id: template_id.to_string(),
                        location: base_url.to_string(),
                    }
                    .into());
                }
                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template '{}' zip from {}: HTTP {}",
                        template_id,
                        zip_url,
                        response.status()
                    );
                }
                let bytes = response.bytes().await?;

                let staging = match &self.staging {
                    Some(staging) => staging.path().to_path_buf(),
                    None => {
                        let staging = TempDir::new()
                            .context("Failed to create template staging directory")?;
                        let path = staging.path().to_path_buf();
                        self.staging = Some(staging);
                        path
                    }
                };
                let dir = staging.join(template_id);
                extract_zip(&bytes, template_id, &dir)?;
                dir
            }
        };

        self.extracted.insert(template_id.to_string(), dir.clone());
        Ok(dir)
    }
}

/// Extract a template zip into `dest`.
///
/// Entries are stored as `<template_id>/<path>`; the prefix is stripped.
/// Entries escaping the archive root are rejected.
pub fn extract_zip(zip_bytes: &[u8], template_id: &str, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .with_context(|| format!("Failed to read zip archive for template '{}'", template_id))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let enclosed = file.enclosed_name().ok_or_else(|| {
            anyhow::anyhow!(
                "Template '{}' zip contains unsafe path: {}",
                template_id,
                file.name()
            )
        })?;
        let relative = match enclosed.strip_prefix(template_id) {
            Ok(rest) => rest.to_path_buf(),
            Err(_) => enclosed.clone(),
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest.join(&relative);
        if file.is_dir() {
            std::fs::create_dir_all(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut out = std::fs::File::create(&out_path)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        std::io::copy(&mut file, &mut out)
            .with_context(|| format!("Failed to extract {}", out_path.display()))?;
    }
    Ok(())
}

/// Zip a local template directory as `<template_id>/<path>` entries
pub fn build_local_zip(templates_root: &Path, template_id: &str) -> Result<Vec<u8>> {
    let template_path = templates_root.join(template_id);

    let mut zip_buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let walker = WalkDir::new(&template_path)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !is_excluded(e.file_name())
                    && !(e.file_type().is_dir()
                        && e.file_name()
                            .to_str()
                            .is_some_and(|n| ZIP_SKIPPED_DIRS.contains(&n)))
            });

        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to walk template directory {}", template_path.display())
            })?;
            let relative = entry
                .path()
                .strip_prefix(&template_path)
                .context("Walked outside the template directory")?;
            let zip_path = format!(
                "{}/{}",
                template_id,
                relative.to_string_lossy().replace('\\', "/")
            );

            if entry.file_type().is_dir() {
                zip.add_directory(zip_path, options)?;
            } else {
                let content = std::fs::read(entry.path())
                    .with_context(|| format!("Failed to read {}", entry.path().display()))?;
                zip.start_file(zip_path, options)?;
                zip.write_all(&content)?;
            }
        }

        zip.finish()?;
    }

    Ok(zip_buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::PackageManager;

    #[derive(Clone)]
    struct BundledConfig(Vec<PathBuf>);

    impl ProductConfig for BundledConfig {
        fn name(&self) -> &'static str {
            "scaffolder-core-test"
        }
        fn display_name(&self) -> &'static str {
            "Test"
        }
        fn default_template_url(&self) -> &'static str {
            "https://example.com/templates"
        }
        fn template_url_env(&self) -> &'static str {
            "SCAFFOLDER_CORE_TEST_TEMPLATE_URL_UNSET"
        }
        fn bundled_template_dirs(&self) -> Vec<PathBuf> {
            self.0.clone()
        }
        fn docs_url(&self) -> &'static str {
            "https://example.com"
        }
        fn upgrade_command(&self) -> &'static str {
            "true"
        }
        fn next_steps(&self, _: Option<&Path>, _: &PackageManager, _: bool) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_source_prefers_bundled_dir_with_manifest() {
        let without_manifest = TempDir::new().unwrap();
        let bundled = TempDir::new().unwrap();
        std::fs::write(bundled.path().join(ROOT_MANIFEST), "templates: []\n").unwrap();

        let config = BundledConfig(vec![
            without_manifest.path().to_path_buf(),
            bundled.path().to_path_buf(),
        ]);
        match TemplateSource::from_config(&config).unwrap() {
            TemplateSource::Local(dir) => assert_eq!(dir, bundled.path()),
            TemplateSource::Remote(url) => panic!("expected bundled templates, got {}", url),
        }
    }

    #[test]
    fn test_source_falls_back_to_default_url() {
        let empty = TempDir::new().unwrap();
        let config = BundledConfig(vec![empty.path().to_path_buf()]);
        match TemplateSource::from_config(&config).unwrap() {
            TemplateSource::Remote(url) => {
                assert_eq!(url.as_str(), "https://example.com/templates")
            }
            TemplateSource::Local(dir) => panic!("unexpected local source {}", dir.display()),
        }
    }

    #[test]
    fn test_build_url_appends_segment() {
        let base = Url::parse("https://example.com/templates").unwrap();
        let url = TemplateFetcher::build_url(&base, "template-game-engine.zip").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/templates/template-game-engine.zip"
        );

        let base = Url::parse("https://example.com/templates/?ref=main").unwrap();
        let url = TemplateFetcher::build_url(&base, "template.yaml").unwrap();
        assert_eq!(url.as_str(), "https://example.com/templates/template.yaml?ref=main");
    }

    #[test]
    fn test_zip_round_trip_skips_excluded() {
        let root = TempDir::new().unwrap();
        let template = root.path().join("template-game-engine");
        std::fs::create_dir_all(template.join("src")).unwrap();
        std::fs::create_dir_all(template.join("node_modules/pixi.js")).unwrap();
        std::fs::write(template.join("src/index.ts"), "start()").unwrap();
        std::fs::write(template.join("package-lock.json"), "{}").unwrap();
        std::fs::write(template.join("node_modules/pixi.js/index.js"), "").unwrap();

        let bytes = build_local_zip(root.path(), "template-game-engine").unwrap();

        let out = TempDir::new().unwrap();
        extract_zip(&bytes, "template-game-engine", out.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.path().join("src/index.ts")).unwrap(),
            "start()"
        );
        assert!(!out.path().join("package-lock.json").exists());
        assert!(!out.path().join("node_modules").exists());
    }

    #[tokio::test]
    async fn test_local_template_dir() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("template-game-engine")).unwrap();

        let mut fetcher = TemplateFetcher::from_local(root.path().to_path_buf(), "test");
        let dir = fetcher.template_dir("template-game-engine").await.unwrap();
        assert_eq!(dir, root.path().join("template-game-engine"));

        let err = fetcher
            .template_dir("template-react-vite-muijoy")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::TemplateNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_manifest_falls_back_to_listing() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("template-game-engine")).unwrap();
        std::fs::create_dir_all(root.path().join("template-react-vite-muijoy")).unwrap();
        std::fs::write(root.path().join("README.md"), "").unwrap();

        let fetcher = TemplateFetcher::from_local(root.path().to_path_buf(), "test");
        let manifest = fetcher.fetch_root_manifest().await.unwrap();
        assert_eq!(
            manifest.templates,
            vec!["template-game-engine", "template-react-vite-muijoy"]
        );

        std::fs::write(
            root.path().join("template.yaml"),
            "version: 0.3.0\ntemplates: [template-game-engine]\n",
        )
        .unwrap();
        let manifest = fetcher.fetch_root_manifest().await.unwrap();
        assert_eq!(manifest.templates, vec!["template-game-engine"]);
        assert_eq!(manifest.version.as_deref(), Some("0.3.0"));
    }
}

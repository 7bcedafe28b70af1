use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::table::SortSpec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub page_size_options: Vec<u32>,
    pub default_page_size: u32,
    pub default_sort: SortSpec,
    pub seed_demo_rows: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size_options: vec![5, 10],
            default_page_size: 10,
            default_sort: SortSpec::default(),
            seed_demo_rows: 40,
        }
    }
}

impl TableSettings {
    pub fn parse(text: &str) -> Result<Self> {
        let settings: TableSettings = toml::from_str(text).context("failed to parse settings")?;
        settings.validated()
    }

    /// Defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(TableSettings::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;
        TableSettings::parse(&text).with_context(|| format!("invalid settings: {}", path.display()))
    }

    fn validated(mut self) -> Result<Self> {
        if self.page_size_options.is_empty() {
            self.page_size_options = TableSettings::default().page_size_options;
        }
        if let Some(zero) = self.page_size_options.iter().find(|size| **size == 0) {
            anyhow::bail!("page_size_options must be positive, got {zero}");
        }
        if self.default_sort.column_id.trim().is_empty() {
            anyhow::bail!("default_sort.column_id must not be empty");
        }
        if !self.page_size_options.contains(&self.default_page_size) {
            self.default_page_size = self.page_size_options[0];
        }
        Ok(self)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "certdesk", "certdesk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_settings_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.toml"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("vouchers.sqlite"))
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

//! Settings loaded from `~/.config/viasplit/config.toml`
//!
//! ```toml
//! [project]
//! name = "Lecture subtitles"
//! creator = "captioning team"
//! data_format_version = "3.1.1"
//!
//! [project.ui]
//! gtimeline_visible_row_count = "6"
//!
//! [store]
//! url = "https://via.example.org"
//!
//! [output]
//! dir = "projects"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::assemble::ProjectTemplate;
use crate::via::Value;

/// Top-level settings file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// `[project]`: overrides for the assembled project fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSettings {
    pub name: Option<String>,
    pub creator: Option<String>,
    pub data_format_version: Option<String>,
    /// Merged over the default UI options
    #[serde(default)]
    pub ui: BTreeMap<String, Value>,
}

/// `[store]`: project store location
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Base URL; projects are uploaded when set
    pub url: Option<String>,
}

/// `[output]`: where project files are written
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Settings {
    /// Load settings
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Self::read(path)
            }
            None => {
                let path = config_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("invalid TOML in {}", path.display()))?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Project template with these settings applied over the defaults
    #[must_use]
    pub fn project_template(&self) -> ProjectTemplate {
        let mut template = ProjectTemplate::default();
        let project = &self.project;

        if let Some(name) = &project.name {
            template.name.clone_from(name);
        }
        if let Some(creator) = &project.creator {
            template.creator.clone_from(creator);
        }
        if let Some(version) = &project.data_format_version {
            template.data_format_version.clone_from(version);
        }
        template
            .ui
            .extend(project.ui.iter().map(|(k, v)| (k.clone(), v.clone())));

        template
    }
}

/// Return the path to the settings file
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("viasplit")
        .join("config.toml")
}

//! Run configuration.
//!
//! Every stage receives an explicit, immutable [`ConvertConfig`] — there is no
//! process-wide mutable state. The config is assembled from CLI flags, with an
//! optional `spaceloom.toml` at the export root overriding the stock defaults
//! for the settings that rarely change per invocation:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! space_name = ""                             # Extra top-level directory ("" = none)
//! asset_dirs = ["images", "attachments", "styles"]
//! pandoc = "pandoc"                           # Or a full path
//! # filter = "tweaks.lua"                     # Optional pandoc Lua filter
//! ```
//!
//! CLI flags win over the file; the file wins over defaults. Unknown keys are
//! rejected to catch typos early.

use crate::types::TargetFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

pub const CONFIG_FILE: &str = "spaceloom.toml";

/// Name of the consolidated asset directory used by formats that flatten
/// assets (Markdown output).
pub const CONSOLIDATED_ASSETS_DIR: &str = "assets";

/// Settings loadable from `spaceloom.toml`.
///
/// Sparse by design: user files override only the values they name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Extra top-level directory every page nests under. Empty = none.
    pub space_name: String,
    /// Asset directory names at the export root, checked in order.
    pub asset_dirs: Vec<String>,
    /// Pandoc executable (name on PATH or full path).
    pub pandoc: String,
    /// Optional pandoc Lua filter applied during conversion.
    pub filter: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            space_name: String::new(),
            asset_dirs: vec![
                "images".to_string(),
                "attachments".to_string(),
                "styles".to_string(),
            ],
            pandoc: "pandoc".to_string(),
            filter: None,
        }
    }
}

impl FileConfig {
    /// Load `spaceloom.toml` from the export root, or defaults if absent.
    pub fn load(export_root: &Path) -> Result<Self, ConfigError> {
        let path = export_root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pandoc.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pandoc executable must not be empty".to_string(),
            ));
        }
        for dir in &self.asset_dirs {
            if dir.is_empty() || dir.contains('/') || dir.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "asset_dirs entries must be plain directory names, got {dir:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable configuration for one conversion run, passed into every stage.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root of the flat HTML export (contains `index.html`).
    pub export_root: PathBuf,
    /// Root of the hierarchical output tree.
    pub output_root: PathBuf,
    pub format: TargetFormat,
    /// Extra top-level directory every page nests under. Empty = none.
    pub space_name: String,
    /// Asset directory names at the export root, checked in order.
    pub asset_dirs: Vec<String>,
    /// Pandoc executable (name on PATH or full path).
    pub pandoc: String,
    /// Optional pandoc Lua filter applied during conversion.
    pub filter: Option<PathBuf>,
    /// Delete intermediate HTML after successful conversion.
    pub cleanup: bool,
}

impl ConvertConfig {
    /// Assemble a run config: file settings from the export root, overridden
    /// by whatever the CLI supplied.
    ///
    /// Fatal if the export root does not exist — nothing downstream can work
    /// without it.
    pub fn assemble(
        export_root: &Path,
        output_root: &Path,
        format: TargetFormat,
        space_name: Option<String>,
        cleanup: bool,
    ) -> Result<Self, ConfigError> {
        if !export_root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "export root does not exist: {}",
                export_root.display()
            )));
        }
        let file = FileConfig::load(export_root)?;
        Ok(Self {
            export_root: export_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            format,
            space_name: space_name.unwrap_or(file.space_name),
            asset_dirs: file.asset_dirs,
            pandoc: file.pandoc,
            filter: file.filter,
            cleanup,
        })
    }

    /// The initial hierarchical base path: `[space_name]` or empty.
    pub fn base_segments(&self) -> Vec<String> {
        if self.space_name.is_empty() {
            Vec::new()
        } else {
            vec![crate::sanitize::sanitize_title(&self.space_name)]
        }
    }

    /// Path of the navigation index document.
    pub fn index_path(&self) -> PathBuf {
        self.export_root.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn assemble(tmp: &TempDir) -> ConvertConfig {
        ConvertConfig::assemble(tmp.path(), Path::new("out"), TargetFormat::Docx, None, false)
            .unwrap()
    }

    #[test]
    fn defaults_when_no_toml() {
        let tmp = TempDir::new().unwrap();
        let config = assemble(&tmp);

        assert_eq!(config.asset_dirs, vec!["images", "attachments", "styles"]);
        assert_eq!(config.pandoc, "pandoc");
        assert!(config.space_name.is_empty());
        assert!(config.base_segments().is_empty());
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "space_name = \"Team Space\"\nasset_dirs = [\"images\"]\n",
        )
        .unwrap();

        let config = assemble(&tmp);
        assert_eq!(config.space_name, "Team Space");
        assert_eq!(config.asset_dirs, vec!["images"]);
        assert_eq!(config.base_segments(), vec!["Team Space"]);
    }

    #[test]
    fn cli_space_name_wins_over_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "space_name = \"From File\"\n").unwrap();

        let config = ConvertConfig::assemble(
            tmp.path(),
            Path::new("out"),
            TargetFormat::Docx,
            Some("From CLI".to_string()),
            false,
        )
        .unwrap();
        assert_eq!(config.space_name, "From CLI");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "not_a_key = true\n").unwrap();

        assert!(matches!(
            FileConfig::load(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn asset_dir_with_separator_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "asset_dirs = [\"nested/dir\"]\n",
        )
        .unwrap();

        assert!(matches!(
            FileConfig::load(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_export_root_is_fatal() {
        let result = ConvertConfig::assemble(
            Path::new("/does/not/exist"),
            Path::new("out"),
            TargetFormat::Docx,
            None,
            false,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn space_name_is_sanitized_in_base() {
        let tmp = TempDir::new().unwrap();
        let config = ConvertConfig::assemble(
            tmp.path(),
            Path::new("out"),
            TargetFormat::Docx,
            Some("Team: Space".to_string()),
            false,
        )
        .unwrap();
        assert_eq!(config.base_segments(), vec!["Team_ Space"]);
    }
}

//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::project::PRICE_TABLE_FILE;
use crate::core::record::DEFAULT_MARKER;
use crate::core::Project;

/// Environment variable overriding the price table path
pub const ENV_PRICE_TABLE: &str = "PARTCOST_PRICE_TABLE";

/// Environment variable overriding the record marker
pub const ENV_MARKER: &str = "PARTCOST_MARKER";

/// partcost configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Price table used for costing
    pub price_table: Option<String>,

    /// Substring identifying part lines in the export
    pub marker: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Root of the project the config was loaded from, if any
    #[serde(skip)]
    project_root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Project settings apply only when a project is given.
    pub fn load_from(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/partcost/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Project config (.partcost/config.yaml)
        if let Some(project) = project {
            let project_path = project.config_dir().join("config.yaml");
            if let Some(project_config) = Self::read_file(&project_path) {
                config.merge(project_config);
            }
            config.project_root = Some(project.root().to_path_buf());
        }

        // Environment variables
        if let Ok(path) = std::env::var(ENV_PRICE_TABLE) {
            config.price_table = Some(path);
        }
        if let Ok(marker) = std::env::var(ENV_MARKER) {
            config.marker = Some(marker);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // A file holding only comments parses as null
        let parsed = serde_yml::from_str::<serde_yml::Value>(&contents).and_then(|value| {
            if value.is_null() {
                Ok(Config::default())
            } else {
                serde_yml::from_value(value)
            }
        });
        match parsed {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable config file"
                );
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partcost")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.price_table.is_some() {
            self.price_table = other.price_table;
        }
        if other.marker.is_some() {
            self.marker = other.marker;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Record marker, falling back to `ADIN`
    pub fn marker(&self) -> &str {
        self.marker
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MARKER)
    }

    /// Resolve the price table path
    ///
    /// An explicit path wins, then the configured one (relative to the project
    /// root when inside a project), then `.partcost/price_table.csv`, then
    /// `price_table.csv` in the working directory.
    pub fn price_table_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Some(configured) = &self.price_table {
            let configured = PathBuf::from(configured);
            return match &self.project_root {
                Some(root) if configured.is_relative() => root.join(configured),
                _ => configured,
            };
        }

        match &self.project_root {
            Some(root) => root.join(crate::core::project::PROJECT_DIR).join(PRICE_TABLE_FILE),
            None => PathBuf::from(PRICE_TABLE_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            marker: Some("ADIN".to_string()),
            default_format: Some("tsv".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            marker: Some("PART".to_string()),
            ..Default::default()
        });
        assert_eq!(base.marker(), "PART");
        assert_eq!(base.default_format.as_deref(), Some("tsv"));
    }

    #[test]
    fn test_marker_default() {
        assert_eq!(Config::default().marker(), "ADIN");
        let empty = Config {
            marker: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.marker(), "ADIN");
    }

    #[test]
    fn test_price_table_resolution_order() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let mut config = Config {
            project_root: Some(project.root().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.price_table_path(None), project.price_table_path());

        config.price_table = Some("prices/table.csv".to_string());
        assert_eq!(
            config.price_table_path(None),
            project.root().join("prices/table.csv")
        );

        let explicit = PathBuf::from("/tmp/other.csv");
        assert_eq!(config.price_table_path(Some(&explicit)), explicit);
    }

    #[test]
    fn test_price_table_outside_project() {
        assert_eq!(
            Config::default().price_table_path(None),
            PathBuf::from("price_table.csv")
        );
    }

    #[test]
    fn test_commented_config_file_is_empty() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let config = Config::read_file(&project.config_dir().join("config.yaml")).unwrap();
        assert!(config.marker.is_none());
        assert!(config.price_table.is_none());
    }

    #[test]
    fn test_project_config_file() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        std::fs::write(
            project.config_dir().join("config.yaml"),
            "marker: PART\ndefault_format: csv\n",
        )
        .unwrap();

        let config = Config::read_file(&project.config_dir().join("config.yaml")).unwrap();
        assert_eq!(config.marker(), "PART");
        assert_eq!(config.default_format.as_deref(), Some("csv"));
    }
}

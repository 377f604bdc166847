//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::price::{PriceTable, PriceTableError};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".partcost";

/// File name of the price table inside the project directory
pub const PRICE_TABLE_FILE: &str = "price_table.csv";

/// Represents a partcost project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .partcost/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create the project structure at the given path
    ///
    /// With `force` an existing project is reinitialised; an existing price
    /// table is kept either way.
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let project_dir = root.join(PROJECT_DIR);
        if project_dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&project_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let project = Self { root };
        let price_table = project.price_table_path();
        if !price_table.exists() {
            PriceTable::default_table().save(&price_table)?;
        }

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# partcost project configuration

# Price table used for costing (relative to the project root)
# price_table: .partcost/price_table.csv

# Substring that marks a line of the parts export as a part
# marker: ADIN

# Default output format (auto, tsv, csv, json, md)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .partcost configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Default location of the project's price table
    pub fn price_table_path(&self) -> PathBuf {
        self.config_dir().join(PRICE_TABLE_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a partcost project (searched from {searched_from:?}). Run 'partcost init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("partcost project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    PriceTable(#[from] PriceTableError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        assert!(project.config_dir().is_dir());
        assert!(project.config_dir().join("config.yaml").exists());
        assert!(project.price_table_path().exists());

        let table = PriceTable::load(&project.price_table_path()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();

        let err = Project::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_force_keeps_price_table() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        std::fs::write(
            project.price_table_path(),
            "Door model,Color category,Color code,Cabinet\nX,Y,Z,1\n",
        )
        .unwrap();

        let project = Project::init(tmp.path(), true).unwrap();
        let table = PriceTable::load(&project.price_table_path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_project_discover_finds_project_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_project_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}

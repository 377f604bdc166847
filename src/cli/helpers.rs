//! Shared helper functions for CLI commands

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Project};

/// Project and configuration a command runs against
pub struct Context {
    pub project: Option<Project>,
    pub config: Config,
}

impl Context {
    /// Discover the project (honouring `--project`) and load configuration
    ///
    /// Outside a project only the global config and environment apply.
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => {
                Some(Project::discover_from(path).map_err(|e| miette::miette!("{}", e))?)
            }
            None => Project::discover().ok(),
        };
        let config = Config::load_from(project.as_ref());
        Ok(Self { project, config })
    }

    /// Resolve `auto` against the configured default format
    pub fn format(&self, requested: OutputFormat) -> OutputFormat {
        resolve_format(requested, self.config.default_format.as_deref())
    }
}

/// Pick the effective output format
///
/// An explicit format wins; `auto` uses the configured default and falls back
/// to tsv when that is unset or unrecognised.
pub fn resolve_format(requested: OutputFormat, configured: Option<&str>) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    configured
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(OutputFormat::Tsv)
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Create a file for writing, creating parent directories as needed
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let file = File::create(path)
        .map_err(|e| miette::miette!("cannot create {}: {}", path.display(), e))?;
    Ok(BufWriter::new(file))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json).into_diagnostic()?;
    Ok(())
}

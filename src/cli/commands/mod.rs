//! CLI command implementations

pub mod completions;
pub mod config;
pub mod cost;
pub mod init;
pub mod price;
pub mod quantities;
pub mod rules;
pub mod summary;

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::{read_records, PipelineError, RowEdit, Session};

/// Input options shared by quantities, summary and cost
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Tab-delimited parts export
    pub file: PathBuf,

    /// Substring marking part lines (default: config, then ADIN)
    #[arg(long)]
    pub marker: Option<String>,

    /// Exclude a row from summary and cost (1-based, repeatable)
    #[arg(long, short = 'x', value_name = "ROW")]
    pub exclude: Vec<usize>,

    /// Change a row before computing, e.g. 3:h=720 (repeatable)
    ///
    /// Fields: type, l, p, h (millimetres), door, category, code.
    #[arg(long, short = 'e', value_name = "ROW:FIELD=VALUE")]
    pub edit: Vec<RowEdit>,
}

/// Read the parts export and build a session with edits applied
///
/// Returns `None` after printing a warning when the file holds no eligible
/// records.
pub(crate) fn load_session(
    input: &InputArgs,
    ctx: &Context,
    global: &GlobalOpts,
) -> Result<Option<Session>> {
    let marker = input.marker.as_deref().unwrap_or_else(|| ctx.config.marker());
    let outcome = read_records(&input.file, marker)
        .map_err(|e| miette::miette!("cannot read {}: {}", input.file.display(), e))?;

    let mut session = match Session::try_from_records(&outcome.records) {
        Ok(session) => session,
        Err(err @ PipelineError::EmptyResult) => {
            if !global.quiet {
                eprintln!("{:?}", miette::Report::new(err));
            }
            return Ok(None);
        }
    };

    if !global.quiet && !session.rejected().is_empty() {
        eprintln!(
            "{} {} record(s) skipped: malformed dimensions",
            style("!").yellow(),
            session.rejected().len()
        );
        for err in session.rejected() {
            eprintln!("  {} {}", style("→").dim(), err);
        }
    }

    let excludes: Vec<RowEdit> = input
        .exclude
        .iter()
        .map(|&row| RowEdit::Exclude { row })
        .collect();
    session.apply_all(input.edit.iter().chain(&excludes))?;

    Ok(Some(session))
}

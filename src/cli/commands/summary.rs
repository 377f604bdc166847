//! `partcost summary` command - quantities per group

use miette::Result;

use crate::cli::commands::{load_session, InputArgs};
use crate::cli::helpers::{print_json, Context};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("type", "TYPE", 16),
    ColumnDef::new("door_model", "DOOR", 12),
    ColumnDef::new("color_category", "CATEGORY", 14),
    ColumnDef::new("color_code", "CODE", 14),
    ColumnDef::new("total_quantity", "QTY", 12),
    ColumnDef::new("member_count", "PARTS", 6),
];

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let Some(session) = load_session(&args.input, &ctx, global)? else {
        return Ok(());
    };
    let summary = session.summary();

    match ctx.format(global.format) {
        OutputFormat::Json => print_json(&summary)?,
        format => {
            let rows: Vec<TableRow> = summary
                .iter()
                .enumerate()
                .map(|(idx, s)| {
                    TableRow::new(idx + 1)
                        .cell("type", CellValue::Type(s.key.type_group.clone()))
                        .cell("door_model", CellValue::Text(s.key.door_model.clone()))
                        .cell("color_category", CellValue::Text(s.key.color_category.clone()))
                        .cell("color_code", CellValue::Text(s.key.color_code.clone()))
                        .cell("total_quantity", CellValue::Float(s.total_quantity, 4))
                        .cell("member_count", CellValue::Number(s.member_count))
                })
                .collect();
            let mut formatter = TableFormatter::new(COLUMNS, "group");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format);
        }
    }

    Ok(())
}

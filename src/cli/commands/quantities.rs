//! `partcost quantities` command - per-part quantities

use miette::Result;

use crate::cli::commands::{load_session, InputArgs};
use crate::cli::helpers::{print_json, Context};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::QuantityRow;

#[derive(clap::Args, Debug)]
pub struct QuantitiesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("type", "TYPE", 24),
    ColumnDef::new("l", "L", 8),
    ColumnDef::new("p", "P", 8),
    ColumnDef::new("h", "H", 8),
    ColumnDef::new("door_model", "DOOR", 12),
    ColumnDef::new("color_category", "CATEGORY", 14),
    ColumnDef::new("color_code", "CODE", 14),
    ColumnDef::new("quantity", "QTY", 10),
    ColumnDef::new("status", "STATUS", 8),
];

pub fn run(args: QuantitiesArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let Some(session) = load_session(&args.input, &ctx, global)? else {
        return Ok(());
    };

    match ctx.format(global.format) {
        OutputFormat::Json => print_json(session.rows())?,
        format => {
            let rows: Vec<TableRow> = session
                .rows()
                .iter()
                .enumerate()
                .map(|(idx, row)| table_row(idx + 1, row))
                .collect();
            let mut formatter = TableFormatter::new(COLUMNS, "part");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format);
        }
    }

    Ok(())
}

fn table_row(number: usize, row: &QuantityRow) -> TableRow {
    let (l, p, h) = row.dimensions.to_millimetres();
    TableRow::new(number)
        .cell("type", CellValue::Type(row.part_type.clone()))
        .cell("l", CellValue::Millimetres(l))
        .cell("p", CellValue::Millimetres(p))
        .cell("h", CellValue::Millimetres(h))
        .cell("door_model", CellValue::Text(row.door_model.clone()))
        .cell("color_category", CellValue::Text(row.color_category.clone()))
        .cell("color_code", CellValue::Text(row.color_code.clone()))
        .cell("quantity", CellValue::Float(row.quantity, 4))
        .cell("status", CellValue::Status(row.status))
}

//! `partcost cost` command - priced groups and grand total

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::cli::commands::{load_session, InputArgs};
use crate::cli::helpers::{create_output, print_json, Context};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CostReport, PriceTable};

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Price table CSV (default: config, then .partcost/price_table.csv)
    #[arg(long, short = 'p')]
    pub price_table: Option<PathBuf>,

    /// Write the cost export CSV to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("type", "TYPE", 16),
    ColumnDef::new("door_model", "DOOR", 12),
    ColumnDef::new("color_category", "CATEGORY", 14),
    ColumnDef::new("color_code", "CODE", 14),
    ColumnDef::new("total_quantity", "QTY", 12),
    ColumnDef::new("unit_price", "UNIT", 12),
    ColumnDef::new("total_price", "TOTAL", 14),
];

pub fn run(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let Some(session) = load_session(&args.input, &ctx, global)? else {
        return Ok(());
    };

    let path = ctx.config.price_table_path(args.price_table.as_deref());
    tracing::debug!(path = %path.display(), "loading price table");
    let prices = PriceTable::load(&path)?;
    let report = session.cost(&prices);

    if let Some(output) = &args.output {
        let mut writer = create_output(output)?;
        report.write_csv(&mut writer).into_diagnostic()?;
        writer.flush().into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Exported {} group(s) to {}",
                style("✓").green(),
                report.rows.len(),
                style(output.display()).cyan()
            );
            println!(
                "  {} Grand total {}",
                style("→").dim(),
                style(format!("{:.2}", report.grand_total)).yellow()
            );
        }
        return Ok(());
    }

    match ctx.format(global.format) {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Csv => {
            let stdout = std::io::stdout();
            report.write_csv(stdout.lock()).into_diagnostic()?;
        }
        OutputFormat::Md => {
            TableFormatter::new(COLUMNS, "group").output(&table_rows(&report), OutputFormat::Md);
            println!();
            println!("**Grand total:** {:.2}", report.grand_total);
        }
        format => {
            TableFormatter::new(COLUMNS, "group")
                .without_summary()
                .output(&table_rows(&report), format);
            println!();
            println!(
                "{} {}",
                style("Grand total:").bold(),
                style(format!("{:.2}", report.grand_total)).yellow()
            );
        }
    }

    Ok(())
}

fn table_rows(report: &CostReport) -> Vec<TableRow> {
    report
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let key = &row.summary.key;
            TableRow::new(idx + 1)
                .cell("type", CellValue::Type(key.type_group.clone()))
                .cell("door_model", CellValue::Text(key.door_model.clone()))
                .cell("color_category", CellValue::Text(key.color_category.clone()))
                .cell("color_code", CellValue::Text(key.color_code.clone()))
                .cell("total_quantity", CellValue::Float(row.summary.total_quantity, 4))
                .cell("unit_price", CellValue::Money(row.unit_price))
                .cell("total_price", CellValue::Money(row.total_price))
        })
        .collect()
}

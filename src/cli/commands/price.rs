//! `partcost price` command - price table management
//!
//! The price table is a CSV file keyed by door model, colour category and
//! colour code, with one column per priced type group.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{print_json, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::price::{COLOR_CATEGORY, COLOR_CODE, DESCRIPTION, DOOR_MODEL};
use crate::core::{PriceEntry, PriceTable};

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    #[command(subcommand)]
    pub command: PriceCommands,

    /// Price table CSV (default: config, then .partcost/price_table.csv)
    #[arg(long, short = 'p', global = true)]
    pub price_table: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum PriceCommands {
    /// Show the price table
    Show,

    /// Add a price row
    Add(AddArgs),

    /// Remove a price row
    Remove(KeyArgs),

    /// Change price cells of an existing row
    Set(SetArgs),

    /// Show the price table path in use
    Path,

    /// Write the default price table
    Init(InitArgs),
}

/// Key fields identifying a price row
#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    /// Door model (e.g. MO1)
    #[arg(long)]
    pub door_model: String,

    /// Colour category (e.g. TYPE)
    #[arg(long)]
    pub color_category: String,

    /// Colour code (e.g. TISAN)
    #[arg(long)]
    pub color_code: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Door model (prompted when omitted)
    #[arg(long)]
    pub door_model: Option<String>,

    /// Colour category (prompted when omitted)
    #[arg(long)]
    pub color_category: Option<String>,

    /// Colour code (prompted when omitted)
    #[arg(long)]
    pub color_code: Option<String>,

    /// Price for one column, e.g. --price Cabinet=1000 (repeatable)
    #[arg(long = "price", value_name = "COLUMN=VALUE", value_parser = parse_price)]
    pub prices: Vec<(String, String)>,

    /// Free text description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Prompt for every field, including prices
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// New price for one column, e.g. --price Wardrobe=1300 (repeatable)
    #[arg(
        long = "price",
        value_name = "COLUMN=VALUE",
        value_parser = parse_price,
        required = true
    )]
    pub prices: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing table
    #[arg(long)]
    pub force: bool,
}

/// Parse `COLUMN=VALUE`; the value must be a number or empty
fn parse_price(s: &str) -> std::result::Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    let column = column.trim();
    let value = value.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    if !value.is_empty() && value.parse::<f64>().map_or(true, |v| !v.is_finite()) {
        return Err(format!("price '{}' is not a number", value));
    }
    Ok((column.to_string(), value.to_string()))
}

/// Run a price subcommand
pub fn run(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let path = ctx.config.price_table_path(args.price_table.as_deref());

    match args.command {
        PriceCommands::Show => run_show(&path, ctx.format(global.format)),
        PriceCommands::Add(add) => run_add(&path, add, global),
        PriceCommands::Remove(key) => run_remove(&path, key, global),
        PriceCommands::Set(set) => run_set(&path, set, global),
        PriceCommands::Path => run_path(&path),
        PriceCommands::Init(init) => run_init(&path, init, global),
    }
}

fn run_show(path: &Path, format: OutputFormat) -> Result<()> {
    let table = PriceTable::load(path)?;

    match format {
        OutputFormat::Json => print_json(table.entries())?,
        OutputFormat::Csv => {
            let stdout = std::io::stdout();
            table.write_to(stdout.lock(), "stdout")?;
        }
        _ => {
            if table.is_empty() {
                println!("No price rows in {}", path.display());
                return Ok(());
            }

            let mut builder = Builder::default();
            let mut header = vec![
                DOOR_MODEL.to_string(),
                COLOR_CATEGORY.to_string(),
                COLOR_CODE.to_string(),
            ];
            header.extend(table.columns().iter().cloned());
            header.push(DESCRIPTION.to_string());
            builder.push_record(header);

            for entry in table.entries() {
                let mut row = vec![
                    entry.door_model.clone(),
                    entry.color_category.clone(),
                    entry.color_code.clone(),
                ];
                row.extend(table.columns().iter().map(|c| entry.cell(c).unwrap_or("").to_string()));
                row.push(entry.description.clone());
                builder.push_record(row);
            }

            println!("{}", builder.build().with(Style::markdown()));
        }
    }

    Ok(())
}

fn run_add(path: &Path, args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut table = PriceTable::load(path)?;

    let missing_key =
        args.door_model.is_none() || args.color_category.is_none() || args.color_code.is_none();
    let prompt = args.interactive || missing_key;
    if prompt && !console::user_attended() {
        return Err(miette::miette!(
            "price row key is incomplete and no terminal is attached; \
             pass --door-model, --color-category and --color-code"
        ));
    }

    let theme = ColorfulTheme::default();
    let ask = |label: &str, given: Option<String>, default: Option<&str>| -> Result<String> {
        if let Some(value) = given {
            return Ok(value);
        }
        let mut input = Input::<String>::with_theme(&theme).with_prompt(label);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().into_diagnostic()
    };

    let door_model = ask(DOOR_MODEL, args.door_model, None)?;
    let color_category = ask(COLOR_CATEGORY, args.color_category, Some("TYPE"))?;
    let color_code = ask(COLOR_CODE, args.color_code, Some("TISAN"))?;

    let mut entry = PriceEntry::new(door_model.trim(), color_category.trim(), color_code.trim());
    for (column, value) in &args.prices {
        entry = entry.with_price(column.as_str(), value.as_str());
    }

    if args.interactive && args.prices.is_empty() {
        for column in table.columns() {
            let value: String = Input::with_theme(&theme)
                .with_prompt(column.as_str())
                .allow_empty(true)
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    parse_price(&format!("{}={}", column, input)).map(|_| ())
                })
                .interact_text()
                .into_diagnostic()?;
            entry = entry.with_price(column.as_str(), value);
        }
    }

    let description = match args.description {
        Some(d) => d,
        None if args.interactive => Input::<String>::with_theme(&theme)
            .with_prompt(DESCRIPTION)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?,
        None => String::new(),
    };
    entry = entry.with_description(description);

    let label = key_label(&entry.door_model, &entry.color_category, &entry.color_code);
    table.add_entry(entry)?;
    table.save(path)?;

    if !global.quiet {
        println!(
            "{} Added price row {} to {}",
            style("✓").green(),
            style(label).cyan(),
            style(path.display()).dim()
        );
    }
    Ok(())
}

fn run_remove(path: &Path, key: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let mut table = PriceTable::load(path)?;
    let removed = table.remove_entry(&key.door_model, &key.color_category, &key.color_code)?;
    table.save(path)?;

    if !global.quiet {
        println!(
            "{} Removed price row {}",
            style("✓").green(),
            style(key_label(
                &removed.door_model,
                &removed.color_category,
                &removed.color_code
            ))
            .cyan()
        );
    }
    Ok(())
}

fn run_set(path: &Path, args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut table = PriceTable::load(path)?;
    let key = &args.key;

    for (column, value) in &args.prices {
        table.set_price(&key.door_model, &key.color_category, &key.color_code, column, value)?;
    }
    table.save(path)?;

    if !global.quiet {
        let label = key_label(&key.door_model, &key.color_category, &key.color_code);
        for (column, value) in &args.prices {
            println!(
                "{} Set {} {} {} {}",
                style("✓").green(),
                style(&label).cyan(),
                style(column).cyan(),
                style("→").dim(),
                style(if value.is_empty() { "(empty)" } else { value.as_str() }).yellow()
            );
        }
    }
    Ok(())
}

fn run_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    if !path.exists() {
        eprintln!(
            "{} {}",
            style("!").yellow(),
            style("(not created, run 'partcost price init')").dim()
        );
    }
    Ok(())
}

fn run_init(path: &Path, args: InitArgs, global: &GlobalOpts) -> Result<()> {
    if path.exists() && !args.force {
        println!(
            "{} Price table already exists at {}",
            style("!").yellow(),
            style(path.display()).cyan()
        );
        println!();
        println!("Use {} to overwrite it", style("partcost price init --force").yellow());
        return Ok(());
    }

    let table = PriceTable::default_table();
    table.save(path)?;

    if !global.quiet {
        println!(
            "{} Wrote default price table ({} rows) to {}",
            style("✓").green(),
            table.len(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}

fn key_label(door_model: &str, color_category: &str, color_code: &str) -> String {
    format!("{}/{}/{}", door_model, color_category, color_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(
            parse_price("Cabinet=1000").unwrap(),
            ("Cabinet".to_string(), "1000".to_string())
        );
        assert_eq!(
            parse_price(" Safhe 60 = 510 ").unwrap(),
            ("Safhe 60".to_string(), "510".to_string())
        );
        assert_eq!(parse_price("Shelf=").unwrap().1, "");
        assert!(parse_price("Cabinet").is_err());
        assert!(parse_price("=10").is_err());
        assert!(parse_price("Cabinet=cheap").is_err());
        assert!(parse_price("Cabinet=NaN").is_err());
    }

    #[test]
    fn test_key_label() {
        assert_eq!(key_label("MO1", "TYPE", "TISAN"), "MO1/TYPE/TISAN");
    }
}

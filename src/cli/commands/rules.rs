//! `partcost rules` command - the quantity formula table

use miette::Result;
use serde_json::json;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, print_json, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::normalize::normalize_type;
use crate::core::{Rule, RULES};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;

    match ctx.format(global.format) {
        OutputFormat::Json => {
            let rules: Vec<_> = RULES
                .iter()
                .enumerate()
                .map(|(idx, rule)| {
                    json!({
                        "order": idx + 1,
                        "prefixes": rule.prefixes,
                        "groups": groups(rule),
                        "formula": rule.formula,
                    })
                })
                .collect();
            print_json(&rules)?;
        }
        OutputFormat::Csv => {
            println!("order,prefixes,groups,formula");
            for (idx, rule) in RULES.iter().enumerate() {
                println!(
                    "{},{},{},{}",
                    idx + 1,
                    escape_csv(&rule.prefixes.join(", ")),
                    escape_csv(&groups(rule).join(", ")),
                    escape_csv(rule.formula)
                );
            }
        }
        _ => {
            let mut builder = Builder::default();
            builder.push_record(["#", "Type prefix", "Group", "Quantity"]);
            for (idx, rule) in RULES.iter().enumerate() {
                builder.push_record([
                    (idx + 1).to_string(),
                    rule.prefixes.join(", "),
                    groups(rule).join(", "),
                    rule.formula.to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
            if !global.quiet {
                println!();
                println!(
                    "Dimensions are in metres. The first matching prefix wins; other types count 0."
                );
            }
        }
    }

    Ok(())
}

/// Type groups the prefixes of a rule collapse to, in prefix order
fn groups(rule: &Rule) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for group in rule.prefixes.iter().map(|p| normalize_type(p)) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

//! `cabest resolve` command - show resolved part sizes

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{fmt3, print_structured, LineArgs, Session};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::estimate::Estimator;
use crate::core::resolver::{CategorySource, ResolvedPart};
use crate::entities::cabinet::Dimensions;

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Show how each part's category was decided
    #[arg(long)]
    pub show_source: bool,
}

#[derive(Serialize)]
struct ResolvedLine<'a> {
    cabinet: &'a str,
    dimensions: &'a Dimensions,
    quantity: u32,
    parts: &'a [ResolvedPart],
}

pub fn run(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::load(global)?;
    let job = args.line.to_job()?;
    let estimator = Estimator::new(&session.catalog, &session.settings);

    let lines = job
        .lines
        .iter()
        .map(|line| estimator.estimate_line(line))
        .collect::<Result<Vec<_>, _>>()?;

    let output: Vec<ResolvedLine> = lines
        .iter()
        .map(|l| ResolvedLine {
            cabinet: &l.cabinet,
            dimensions: &l.dimensions,
            quantity: l.quantity,
            parts: &l.parts,
        })
        .collect();
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    let mut headers = vec!["Cabinet", "Part", "Category", "Width", "Height", "Qty", "Area m²"];
    if args.show_source {
        headers.push("Source");
    }
    let mut table = Table::new(headers);

    for line in &lines {
        for part in &line.parts {
            let mut row = vec![
                line.cabinet.clone(),
                part.name.clone(),
                part.category.to_string(),
                format!("{}", part.width_mm),
                format!("{}", part.height_mm),
                part.quantity.to_string(),
                fmt3(part.area_m2),
            ];
            if args.show_source {
                row.push(source_label(part.category_source).to_string());
            }
            table.push(row);
        }
    }

    print!("{}", table.render(global.format));
    if !global.quiet {
        println!(
            "{} part(s) across {} line(s)",
            style(table.len()).cyan(),
            style(lines.len()).cyan()
        );
    }
    Ok(())
}

fn source_label(source: CategorySource) -> &'static str {
    match source {
        CategorySource::Flag => "flag",
        CategorySource::NamePattern => "name",
        CategorySource::Default => "default",
    }
}

//! `cabest weigh` command - weight breakdown per line

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{fmt2, print_structured, LineArgs, Session};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::estimate::Estimator;
use crate::core::pricing::round2;
use crate::core::weight::WeightBreakdown;
use crate::entities::cabinet::Dimensions;

#[derive(clap::Args, Debug)]
pub struct WeighArgs {
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Serialize)]
struct WeighedLine<'a> {
    cabinet: &'a str,
    dimensions: &'a Dimensions,
    quantity: u32,
    weight: &'a WeightBreakdown,
}

#[derive(Serialize)]
struct WeighOutput<'a> {
    name: &'a str,
    lines: Vec<WeighedLine<'a>>,
    total_kg: f64,
}

pub fn run(args: WeighArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::load(global)?;
    let job = args.line.to_job()?;
    let estimator = Estimator::new(&session.catalog, &session.settings);

    let lines = job
        .lines
        .iter()
        .map(|line| estimator.estimate_line(line))
        .collect::<Result<Vec<_>, _>>()?;
    let total_kg = round2(lines.iter().map(|l| l.weight.total).sum());

    let output = WeighOutput {
        name: &job.name,
        lines: lines
            .iter()
            .map(|l| WeighedLine {
                cabinet: &l.cabinet,
                dimensions: &l.dimensions,
                quantity: l.quantity,
                weight: &l.weight,
            })
            .collect(),
        total_kg,
    };
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    let mut table = Table::new([
        "Cabinet", "Size", "Qty", "Carcass kg", "Doors kg", "Hardware kg", "Each kg", "Total kg",
    ]);
    for line in &lines {
        let w = &line.weight;
        table.push([
            line.cabinet.clone(),
            line.dimensions.to_string(),
            line.quantity.to_string(),
            fmt2(w.carcass),
            fmt2(w.doors),
            fmt2(w.hardware),
            fmt2(w.unit_total),
            fmt2(w.total),
        ]);
    }
    print!("{}", table.render(global.format));

    if !global.quiet {
        println!();
        println!(
            "{} {} kg",
            style("Total weight:").bold(),
            style(fmt2(total_kg)).green().bold()
        );
    }
    Ok(())
}

//! `cabest price` command - cost breakdown per line and job total

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{fmt2, print_structured, LineArgs, Session};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::estimate::{Estimator, LineEstimate};
use crate::core::hardware::{HardwareResolution, PriceSource};
use crate::core::pricing::{round2, CostBreakdown};
use crate::entities::cabinet::Dimensions;
use crate::entities::rates::RateSet;

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Also list hardware units and unit costs
    #[arg(long)]
    pub hardware: bool,
}

#[derive(Serialize)]
struct PricedLine<'a> {
    cabinet: &'a str,
    dimensions: &'a Dimensions,
    quantity: u32,
    rates: &'a RateSet,
    hardware: &'a HardwareResolution,
    cost: &'a CostBreakdown,
}

#[derive(Serialize)]
struct PriceOutput<'a> {
    name: &'a str,
    lines: Vec<PricedLine<'a>>,
    total: f64,
}

pub fn run(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::load(global)?;
    let job = args.line.to_job()?;
    let estimator = Estimator::new(&session.catalog, &session.settings);

    let lines = job
        .lines
        .iter()
        .map(|line| estimator.estimate_line(line))
        .collect::<Result<Vec<_>, _>>()?;
    let total = round2(lines.iter().map(|l| l.cost.total).sum());

    let output = PriceOutput {
        name: &job.name,
        lines: lines
            .iter()
            .map(|l| PricedLine {
                cabinet: &l.cabinet,
                dimensions: &l.dimensions,
                quantity: l.quantity,
                rates: &l.rates,
                hardware: &l.hardware,
                cost: &l.cost,
            })
            .collect(),
        total,
    };
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    let mut table = Table::new([
        "Cabinet", "Size", "Qty", "Carcass", "Doors", "Surcharge", "Hardware", "Subtotal",
        "Wastage", "GST", "Total",
    ]);
    for line in &lines {
        let c = &line.cost;
        table.push([
            line.cabinet.clone(),
            line.dimensions.to_string(),
            line.quantity.to_string(),
            fmt2(c.carcass),
            fmt2(c.doors),
            fmt2(c.surcharges),
            fmt2(c.hardware),
            fmt2(c.subtotal),
            fmt2(c.wastage),
            fmt2(c.gst),
            fmt2(c.total),
        ]);
    }
    print!("{}", table.render(global.format));

    if args.hardware {
        println!();
        print!("{}", hardware_table(&lines).render(global.format));
    }

    if !global.quiet {
        println!();
        println!(
            "{} {} ({} line(s))",
            style("Total:").bold(),
            style(fmt2(total)).green().bold(),
            lines.len()
        );
    }
    Ok(())
}

fn hardware_table(lines: &[LineEstimate]) -> Table {
    let mut table = Table::new(["Cabinet", "Hardware", "Scope", "Units", "Unit cost", "Cost", "Price"]);
    for line in lines {
        for hw in &line.hardware.lines {
            let source = match hw.price_source {
                PriceSource::Catalog => "catalog",
                PriceSource::Default => "default",
            };
            table.push([
                line.cabinet.clone(),
                hw.name.clone(),
                hw.unit_scope.to_string(),
                hw.units.to_string(),
                fmt2(hw.unit_cost),
                fmt2(hw.cost),
                source.to_string(),
            ]);
        }
    }
    table
}

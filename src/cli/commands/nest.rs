//! `cabest nest` command - sheet count, stack height and shipping packages

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{fmt2, fmt3, print_structured, truncate_str, LineArgs, Session};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::estimate::Estimator;
use crate::core::nesting::{NestingPlan, ShippingPackage};

#[derive(clap::Args, Debug)]
pub struct NestArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Sheet width in mm (overrides config)
    #[arg(long)]
    pub sheet_width: Option<f64>,

    /// Sheet height in mm (overrides config)
    #[arg(long)]
    pub sheet_height: Option<f64>,

    /// Target fill fraction per sheet, 0-1 (overrides config)
    #[arg(long)]
    pub efficiency: Option<f64>,

    /// List the parts placed on each sheet
    #[arg(long)]
    pub parts: bool,
}

#[derive(Serialize)]
struct NestOutput<'a> {
    #[serde(flatten)]
    plan: &'a NestingPlan,
    packages: &'a [ShippingPackage],
}

pub fn run(args: NestArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::load(global)?;
    let sheet = &mut session.settings.sheet;
    if let Some(w) = args.sheet_width {
        sheet.width_mm = w;
    }
    if let Some(h) = args.sheet_height {
        sheet.height_mm = h;
    }
    if let Some(e) = args.efficiency {
        sheet.target_efficiency = e;
    }

    let job = args.line.to_job()?;
    let estimate = Estimator::new(&session.catalog, &session.settings).estimate_job(&job)?;
    let plan = &estimate.nesting;

    let output = NestOutput {
        plan,
        packages: &estimate.packages,
    };
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    let mut sheets = Table::new(["Sheet", "Parts", "Area m²", "Fill %", "Stack mm", "Weight kg"]);
    for s in &plan.sheets {
        sheets.push([
            s.sheet_number.to_string(),
            s.parts.len().to_string(),
            fmt3(s.area_used_m2),
            format!("{:.1}", s.efficiency_pct()),
            format!("{}", s.stack_height_mm),
            fmt2(s.total_weight_kg),
        ]);
    }
    print!("{}", sheets.render(global.format));

    if args.parts {
        let mut placed = Table::new(["Sheet", "Line", "Part", "Width", "Height", "Area m²"]);
        for s in &plan.sheets {
            for p in &s.parts {
                placed.push([
                    s.sheet_number.to_string(),
                    (p.line + 1).to_string(),
                    truncate_str(&p.name, 24),
                    format!("{}", p.width_mm),
                    format!("{}", p.height_mm),
                    fmt3(p.area_m2),
                ]);
            }
        }
        println!();
        print!("{}", placed.render(global.format));
    }

    let mut packages = Table::new(["Package", "L mm", "W mm", "H mm", "Weight kg", "Parts"]);
    for p in &estimate.packages {
        packages.push([
            p.package_number.to_string(),
            format!("{}", p.length_mm),
            format!("{}", p.width_mm),
            format!("{}", p.height_mm),
            fmt2(p.weight_kg),
            p.part_count.to_string(),
        ]);
    }
    println!();
    print!("{}", packages.render(global.format));

    if !plan.excluded.is_empty() {
        println!();
        for e in &plan.excluded {
            println!(
                "{} {} x{} ({} x {} mm) not nested: {}",
                style("!").yellow(),
                style(&e.name).cyan(),
                e.quantity,
                e.width_mm,
                e.height_mm,
                e.reason
            );
        }
    }

    if !global.quiet {
        println!();
        println!(
            "{} sheet(s) of {} x {} mm at {:.0}% target, {} part(s) placed, {} excluded",
            style(plan.sheets.len()).cyan(),
            plan.sheet.width_mm,
            plan.sheet.height_mm,
            plan.sheet.target_efficiency * 100.0,
            plan.placed_instances(),
            plan.excluded_instances()
        );
    }
    Ok(())
}

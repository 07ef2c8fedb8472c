//! `cabest export` command - flat CSV of parts and hardware

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::cli::helpers::{LineArgs, Session};
use crate::cli::GlobalOpts;
use crate::core::estimate::Estimator;
use crate::core::export::write_csv;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::load(global)?;
    let job = args.line.to_job()?;
    let estimator = Estimator::new(&session.catalog, &session.settings);

    let lines = job
        .lines
        .iter()
        .map(|line| estimator.estimate_line(line))
        .collect::<Result<Vec<_>, _>>()?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            write_csv(BufWriter::new(file), &lines)?;
            if !global.quiet {
                println!(
                    "{} Exported {} line(s) to {}",
                    style("✓").green(),
                    lines.len(),
                    style(path.display()).cyan()
                );
            }
        }
        None => write_csv(io::stdout().lock(), &lines)?,
    }
    Ok(())
}

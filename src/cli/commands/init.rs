//! `cabest init` command - Initialize a new catalog project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Overwrite the sample files even if .cabest/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized cabinet catalog at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            if global.quiet {
                return Ok(());
            }
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Price the sample base cabinet",
                style("cabest price base-600").yellow()
            );
            println!(
                "  {} Estimate the sample job",
                style("cabest price --job jobs/sample.yaml").yellow()
            );
            println!(
                "  {} Plan sheets and packages",
                style("cabest nest --job jobs/sample.yaml").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("cabest init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [
        ".cabest/",
        ".cabest/config.yaml",
        "cabinets/",
        "cabinets/base-600.yaml",
        "cabinets/wall-600.yaml",
        "catalog/",
        "catalog/rates.yaml",
        "catalog/hardware.yaml",
        "jobs/",
        "jobs/sample.yaml",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}

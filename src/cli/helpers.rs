//! Shared helper functions for CLI commands
//!
//! Project/catalog loading, line selection arguments and structured output
//! used by the estimating commands.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::estimate::Catalog;
use crate::core::loader::{load_catalog, load_job};
use crate::core::project::Project;
use crate::core::settings::EstimatorSettings;
use crate::entities::job::{Job, LineItem, Selection};

/// Which cabinets to estimate: a job file, or a single cabinet with overrides
#[derive(clap::Args, Debug, Clone)]
pub struct LineArgs {
    /// Cabinet type id (e.g. base-600)
    #[arg(required_unless_present = "job", conflicts_with = "job")]
    pub cabinet: Option<String>,

    /// Job file with one or more line items
    #[arg(long, short = 'j')]
    pub job: Option<PathBuf>,

    /// Number of cabinets
    #[arg(long, short = 'n', default_value = "1")]
    pub qty: u32,

    /// Width override in mm
    #[arg(long, short = 'W')]
    pub width: Option<f64>,

    /// Height override in mm
    #[arg(long, short = 'H')]
    pub height: Option<f64>,

    /// Depth override in mm
    #[arg(long, short = 'D')]
    pub depth: Option<f64>,

    /// Carcass material
    #[arg(long)]
    pub material: Option<String>,

    /// Door finish
    #[arg(long)]
    pub finish: Option<String>,

    /// Door style
    #[arg(long)]
    pub door_style: Option<String>,

    /// Color (may add a surcharge)
    #[arg(long)]
    pub color: Option<String>,

    /// Hardware brand
    #[arg(long)]
    pub brand: Option<String>,
}

impl LineArgs {
    /// The job described by these arguments
    pub fn to_job(&self) -> Result<Job> {
        if let Some(path) = &self.job {
            return Ok(load_job(path)?);
        }

        let cabinet = self
            .cabinet
            .clone()
            .ok_or_else(|| miette::miette!("Specify a cabinet type or --job"))?;

        let mut line = LineItem::new(cabinet.clone(), self.qty);
        line.width = self.width;
        line.height = self.height;
        line.depth = self.depth;
        line.selection = Selection {
            material: self.material.clone(),
            finish: self.finish.clone(),
            door_style: self.door_style.clone(),
            color: self.color.clone(),
            hardware_brand: self.brand.clone(),
        };

        Ok(Job {
            name: cabinet,
            lines: vec![line],
        })
    }
}

/// Project, catalog and settings for one command invocation
pub struct Session {
    pub project: Project,
    pub catalog: Catalog,
    pub settings: EstimatorSettings,
}

impl Session {
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let project = open_project(global)?;
        let config = Config::load(Some(&project))?;
        let settings = config.estimator_settings()?;
        let catalog = load_catalog(&project)?;

        log::debug!(
            "Loaded {} cabinet types from {}",
            catalog.cabinets.len(),
            project.root().display()
        );

        Ok(Self {
            project,
            catalog,
            settings,
        })
    }
}

/// Open the project named by `--project`, or discover it from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Print `value` as JSON or YAML; returns false for table formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Format a number with 2 decimals
pub fn fmt2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a number with 3 decimals
pub fn fmt3(value: f64) -> String {
    format!("{:.3}", value)
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_args() -> LineArgs {
        LineArgs {
            cabinet: Some("base-600".to_string()),
            job: None,
            qty: 3,
            width: Some(450.0),
            height: None,
            depth: None,
            material: Some("MDF".to_string()),
            finish: None,
            door_style: None,
            color: None,
            brand: Some("Blum".to_string()),
        }
    }

    #[test]
    fn test_line_args_to_job() {
        let job = line_args().to_job().unwrap();
        assert_eq!(job.lines.len(), 1);
        let line = &job.lines[0];
        assert_eq!(line.cabinet, "base-600");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.width, Some(450.0));
        assert_eq!(line.selection.material.as_deref(), Some("MDF"));
        assert_eq!(line.selection.hardware_brand.as_deref(), Some("Blum"));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(fmt2(38.88), "38.88");
        assert_eq!(fmt2(5.0), "5.00");
        assert_eq!(fmt3(0.8640001), "0.864");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }
}

//! Project discovery and structure
//!
//! A catalog project is a directory holding `.cabest/config.yaml`, cabinet
//! type files under `cabinets/`, rate and hardware catalogs under `catalog/`
//! and job files under `jobs/`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory that identifies a project root
pub const PROJECT_DIR: &str = ".cabest";

/// Represents a cabinet catalog project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .cabest/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                log::debug!("Found project at {}", current.display());
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project with a sample catalog at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_structure(root)
    }

    /// Initialize even if .cabest/ exists, overwriting the sample files
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root)
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };

        for dir in [
            project.cabest_dir(),
            project.cabinets_dir(),
            project.catalog_dir(),
            project.jobs_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        let files = [
            (project.config_path(), DEFAULT_CONFIG),
            (project.rates_path(), SAMPLE_RATES),
            (project.hardware_path(), SAMPLE_HARDWARE),
            (project.cabinets_dir().join("base-600.yaml"), SAMPLE_BASE_CABINET),
            (project.cabinets_dir().join("wall-600.yaml"), SAMPLE_WALL_CABINET),
            (project.jobs_dir().join("sample.yaml"), SAMPLE_JOB),
        ];
        for (path, contents) in files {
            std::fs::write(&path, contents).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(project)
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .cabest configuration directory
    pub fn cabest_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.cabest_dir().join("config.yaml")
    }

    /// Directory of cabinet type files, one per file
    pub fn cabinets_dir(&self) -> PathBuf {
        self.root.join("cabinets")
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join("catalog")
    }

    pub fn rates_path(&self) -> PathBuf {
        self.catalog_dir().join("rates.yaml")
    }

    pub fn hardware_path(&self) -> PathBuf {
        self.catalog_dir().join("hardware.yaml")
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    /// Iterate all cabinet type files, sorted by path
    pub fn iter_cabinet_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.cabinets_dir())
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map_or(false, |ext| ext == "yaml" || ext == "yml")
            })
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a cabinet catalog project (searched from {searched_from:?}). Run 'cabest init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

const DEFAULT_CONFIG: &str = r#"# Cabinet estimator project configuration
# Every key is optional; built-in defaults are shown.

# wastage_factor: 0.10
# gst_rate: 0.18
# hardware_markup_pct: 0
# hardware_discount_pct: 0

# Fail on malformed part formulas instead of using 0
# strict_formulas: false

# default_material_rate: 45.0
# default_hardware_unit_cost: 5.0
# default_carcass_density: 13.5

# sheet_width_mm: 2440
# sheet_height_mm: 1220
# target_efficiency: 0.85
# package_padding_mm: 50
# package_padding_kg: 2.0
"#;

const SAMPLE_RATES: &str = r#"# Rates per square metre
materials:
  HMR: 45.0
  MDF: 38.0
  Plywood: 62.0
finishes:
  Laminate: 20.0
  Acrylic: 55.0
  PU: 85.0
door_styles:
  Flat:
    rate_per_sqm: 0.0
    density: 12.0
  Shaker:
    rate_per_sqm: 30.0
    density: 14.0
    weight_factor: 1.1
colors:
  Standard: 0.0
  Metallic: 5.0
"#;

const SAMPLE_HARDWARE: &str = r#"# Hardware unit costs by brand, keyed by requirement id
default_brand: Hettich
brands:
  Hettich:
    hinge: 4.5
    runner: 22.0
    leg: 1.2
    handle: 3.0
  Blum:
    hinge: 7.8
    runner: 35.0
"#;

const SAMPLE_BASE_CABINET: &str = r#"id: base-600
name: Base 600
category: base
default_width: 600
default_height: 720
default_depth: 560
door_count: 2
drawer_count: 0
parts:
  - name: Side
    width_formula: depth
    height_formula: height
    quantity: 2
  - name: Bottom
    width_formula: width - 36
    height_formula: depth
  - name: Back
    width_formula: width
    height_formula: height
    thickness_mm: 6
    density: 4.5
  - name: Shelf
    width_formula: width - 36
    height_formula: depth - 20
    is_door: false
  - name: Door
    width_formula: width / 2 - 3
    height_formula: height - 4
    quantity: 2
    is_door: true
  - name: Leg
    width_formula: "100"
    height_formula: "100"
    quantity: 4
    is_hardware: true
hardware:
  - id: hinge
    name: Soft-close hinge
    unit_scope: per_door
    units_per_scope: 2
  - id: handle
    unit_scope: per_door
  - id: leg
    unit_scope: per_cabinet
    units_per_scope: 4
"#;

const SAMPLE_WALL_CABINET: &str = r#"id: wall-600
name: Wall 600
category: wall
default_width: 600
default_height: 720
default_depth: 320
door_count: 2
parts:
  - name: Side
    width_formula: depth
    height_formula: height
    quantity: 2
  - name: Bottom
    width_formula: width - 36
    height_formula: depth
    quantity: 2
  - name: Back
    width_formula: width
    height_formula: height
    thickness_mm: 6
    density: 4.5
  - name: Door
    width_formula: width / 2 - 3
    height_formula: height - 4
    quantity: 2
    is_door: true
hardware:
  - id: hinge
    unit_scope: per_door
    units_per_scope: 2
  - id: handle
    unit_scope: per_door
"#;

const SAMPLE_JOB: &str = r#"name: Sample kitchen
lines:
  - cabinet: base-600
    quantity: 3
    material: HMR
    finish: Laminate
    door_style: Shaker
  - cabinet: wall-600
    quantity: 2
    width: 800
    finish: Acrylic
    color: Metallic
    hardware_brand: Blum
"#;

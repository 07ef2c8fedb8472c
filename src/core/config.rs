//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first: built-in defaults, the global user config
//! (`<config dir>/cabest/config.yaml`), the project config
//! (`.cabest/config.yaml`) and `CABEST_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::nesting::{PackagePadding, SheetSpec};
use crate::core::project::Project;
use crate::core::resolver::FormulaMode;
use crate::core::settings::{in_range, non_negative, EstimatorSettings, GlobalSettings, SettingsError};

/// Wastage applied on top of the material subtotal
pub const DEFAULT_WASTAGE_FACTOR: f64 = 0.10;
/// Goods and services tax
pub const DEFAULT_GST_RATE: f64 = 0.18;
/// HMR board rate per m², the default carcass material
pub const DEFAULT_MATERIAL_RATE_PER_SQM: f64 = 45.0;
pub const DEFAULT_FINISH_RATE_PER_SQM: f64 = 0.0;
pub const DEFAULT_DOOR_STYLE_RATE_PER_SQM: f64 = 0.0;
pub const DEFAULT_COLOR_SURCHARGE_PER_SQM: f64 = 0.0;
/// Unit cost for hardware missing from the brand catalog
pub const DEFAULT_HARDWARE_UNIT_COST: f64 = 5.0;
/// 18mm HMR board, kg/m²
pub const DEFAULT_CARCASS_DENSITY: f64 = 13.5;
pub const DEFAULT_SHEET_WIDTH_MM: f64 = 2440.0;
pub const DEFAULT_SHEET_HEIGHT_MM: f64 = 1220.0;
pub const DEFAULT_TARGET_EFFICIENCY: f64 = 0.85;
pub const DEFAULT_PACKAGE_PADDING_MM: f64 = 50.0;
pub const DEFAULT_PACKAGE_PADDING_KG: f64 = 2.0;

/// Cabinet estimator configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fraction added for offcuts and breakage (0.10 = 10%)
    pub wastage_factor: Option<f64>,

    /// Tax rate applied to the subtotal with wastage (0.18 = 18%)
    pub gst_rate: Option<f64>,

    /// Markup applied to hardware cost, in percent
    pub hardware_markup_pct: Option<f64>,

    /// Discount applied to hardware cost after markup, in percent
    pub hardware_discount_pct: Option<f64>,

    /// Fail on malformed part formulas instead of using 0
    pub strict_formulas: Option<bool>,

    /// Carcass rate per m² when the material is missing from the catalog
    pub default_material_rate: Option<f64>,

    /// Hardware unit cost when the brand catalog has no entry
    pub default_hardware_unit_cost: Option<f64>,

    /// Carcass areal density in kg/m²
    pub default_carcass_density: Option<f64>,

    pub sheet_width_mm: Option<f64>,
    pub sheet_height_mm: Option<f64>,

    /// Fraction of a sheet filled before a new sheet is started
    pub target_efficiency: Option<f64>,

    /// Height allowance added to each shipping package
    pub package_padding_mm: Option<f64>,

    /// Weight allowance added to each shipping package
    pub package_padding_kg: Option<f64>,
}

macro_rules! merge_fields {
    ($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
        $(
            if $other.$field.is_some() {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Result<Self, SettingsError> {
        // 1. Built-in defaults (applied in `estimator_settings`)
        let mut config = Config::default();

        // 2. Global user config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::from_file(&global_path)?);
            }
        }

        // 3. Project config
        if let Some(project) = project {
            let project_config_path = project.config_path();
            if project_config_path.exists() {
                config.merge(Self::from_file(&project_config_path)?);
            }
        }

        // 4. Environment variables
        config.apply_env(|var| std::env::var(var).ok())?;

        Ok(config)
    }

    /// Parse a single config file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;
        serde_yml::from_str::<Config>(&contents).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cabest")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        merge_fields!(
            self,
            other,
            wastage_factor,
            gst_rate,
            hardware_markup_pct,
            hardware_discount_pct,
            strict_formulas,
            default_material_rate,
            default_hardware_unit_cost,
            default_carcass_density,
            sheet_width_mm,
            sheet_height_mm,
            target_efficiency,
            package_padding_mm,
            package_padding_kg,
        );
    }

    /// Apply `CABEST_*` overrides read through `lookup`
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        let number = |var: &str| -> Result<Option<f64>, SettingsError> {
            match lookup(var) {
                Some(value) => value
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| SettingsError::InvalidEnv {
                        var: var.to_string(),
                        value,
                    }),
                None => Ok(None),
            }
        };

        if let Some(v) = number("CABEST_WASTAGE_FACTOR")? {
            self.wastage_factor = Some(v);
        }
        if let Some(v) = number("CABEST_GST_RATE")? {
            self.gst_rate = Some(v);
        }
        if let Some(v) = number("CABEST_HARDWARE_MARKUP_PCT")? {
            self.hardware_markup_pct = Some(v);
        }
        if let Some(v) = number("CABEST_HARDWARE_DISCOUNT_PCT")? {
            self.hardware_discount_pct = Some(v);
        }
        if let Some(value) = lookup("CABEST_STRICT_FORMULAS") {
            let strict = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(SettingsError::InvalidEnv {
                        var: "CABEST_STRICT_FORMULAS".to_string(),
                        value,
                    })
                }
            };
            self.strict_formulas = Some(strict);
        }

        Ok(())
    }

    /// Validate and build the typed settings, filling gaps with defaults
    pub fn estimator_settings(&self) -> Result<EstimatorSettings, SettingsError> {
        let global = GlobalSettings::new(
            self.wastage_factor.unwrap_or(DEFAULT_WASTAGE_FACTOR),
            self.gst_rate.unwrap_or(DEFAULT_GST_RATE),
            self.hardware_markup_pct.unwrap_or(0.0),
            self.hardware_discount_pct.unwrap_or(0.0),
        )?;

        let default_material_rate = self
            .default_material_rate
            .unwrap_or(DEFAULT_MATERIAL_RATE_PER_SQM);
        non_negative("default_material_rate", default_material_rate)?;

        let default_hardware_unit_cost = self
            .default_hardware_unit_cost
            .unwrap_or(DEFAULT_HARDWARE_UNIT_COST);
        non_negative("default_hardware_unit_cost", default_hardware_unit_cost)?;

        let default_carcass_density = self
            .default_carcass_density
            .unwrap_or(DEFAULT_CARCASS_DENSITY);
        non_negative("default_carcass_density", default_carcass_density)?;

        let sheet = SheetSpec {
            width_mm: self.sheet_width_mm.unwrap_or(DEFAULT_SHEET_WIDTH_MM),
            height_mm: self.sheet_height_mm.unwrap_or(DEFAULT_SHEET_HEIGHT_MM),
            target_efficiency: self.target_efficiency.unwrap_or(DEFAULT_TARGET_EFFICIENCY),
        };
        in_range("sheet_width_mm", sheet.width_mm, f64::MIN_POSITIVE, f64::MAX)?;
        in_range("sheet_height_mm", sheet.height_mm, f64::MIN_POSITIVE, f64::MAX)?;
        in_range("target_efficiency", sheet.target_efficiency, f64::MIN_POSITIVE, 1.0)?;

        let packaging = PackagePadding {
            height_mm: self.package_padding_mm.unwrap_or(DEFAULT_PACKAGE_PADDING_MM),
            weight_kg: self.package_padding_kg.unwrap_or(DEFAULT_PACKAGE_PADDING_KG),
        };
        non_negative("package_padding_mm", packaging.height_mm)?;
        non_negative("package_padding_kg", packaging.weight_kg)?;

        let formula_mode = if self.strict_formulas.unwrap_or(false) {
            FormulaMode::Strict
        } else {
            FormulaMode::Lenient
        };

        Ok(EstimatorSettings {
            global,
            formula_mode,
            default_material_rate,
            default_hardware_unit_cost,
            default_carcass_density,
            sheet,
            packaging,
        })
    }
}

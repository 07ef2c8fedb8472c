//! Typed, validated pricing settings
//!
//! Settings are built once per request (usually from [`crate::core::Config`])
//! and passed into the engine by reference; nothing in the engine reads them
//! from a global.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::{
    DEFAULT_CARCASS_DENSITY, DEFAULT_GST_RATE, DEFAULT_HARDWARE_UNIT_COST,
    DEFAULT_MATERIAL_RATE_PER_SQM, DEFAULT_WASTAGE_FACTOR,
};
use crate::core::nesting::{PackagePadding, SheetSpec};
use crate::core::resolver::FormulaMode;

/// Errors from building or loading settings
#[derive(Debug, Error, Diagnostic)]
#[diagnostic(code(cabest::config))]
pub enum SettingsError {
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be a finite number (got {value})")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be between {min} and {max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: String, value: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Process-wide pricing adjustments
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalSettings {
    wastage_factor: f64,
    gst_rate: f64,
    hardware_markup_pct: f64,
    hardware_discount_pct: f64,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            wastage_factor: DEFAULT_WASTAGE_FACTOR,
            gst_rate: DEFAULT_GST_RATE,
            hardware_markup_pct: 0.0,
            hardware_discount_pct: 0.0,
        }
    }
}

impl GlobalSettings {
    /// Validate and build settings
    ///
    /// Rates and percentages must be non-negative and the discount may not
    /// exceed 100%.
    pub fn new(
        wastage_factor: f64,
        gst_rate: f64,
        hardware_markup_pct: f64,
        hardware_discount_pct: f64,
    ) -> Result<Self, SettingsError> {
        non_negative("wastage_factor", wastage_factor)?;
        non_negative("gst_rate", gst_rate)?;
        non_negative("hardware_markup_pct", hardware_markup_pct)?;
        in_range("hardware_discount_pct", hardware_discount_pct, 0.0, 100.0)?;

        Ok(Self {
            wastage_factor,
            gst_rate,
            hardware_markup_pct,
            hardware_discount_pct,
        })
    }

    pub fn wastage_factor(&self) -> f64 {
        self.wastage_factor
    }

    pub fn gst_rate(&self) -> f64 {
        self.gst_rate
    }

    pub fn hardware_markup_pct(&self) -> f64 {
        self.hardware_markup_pct
    }

    pub fn hardware_discount_pct(&self) -> f64 {
        self.hardware_discount_pct
    }

    /// Apply hardware markup, then discount
    pub fn adjust_hardware_cost(&self, raw: f64) -> f64 {
        raw * (1.0 + self.hardware_markup_pct / 100.0) * (1.0 - self.hardware_discount_pct / 100.0)
    }
}

/// Everything the estimator needs besides reference data
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorSettings {
    pub global: GlobalSettings,
    pub formula_mode: FormulaMode,
    /// Carcass rate used when a line names no known material
    pub default_material_rate: f64,
    /// Hardware unit cost used when the brand catalog has no entry
    pub default_hardware_unit_cost: f64,
    /// Carcass areal density (kg/m²) when neither part nor cabinet sets one
    pub default_carcass_density: f64,
    pub sheet: SheetSpec,
    pub packaging: PackagePadding,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            global: GlobalSettings::default(),
            formula_mode: FormulaMode::default(),
            default_material_rate: DEFAULT_MATERIAL_RATE_PER_SQM,
            default_hardware_unit_cost: DEFAULT_HARDWARE_UNIT_COST,
            default_carcass_density: DEFAULT_CARCASS_DENSITY,
            sheet: SheetSpec::default(),
            packaging: PackagePadding::default(),
        }
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(SettingsError::NotFinite { name, value });
    }
    Ok(())
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), SettingsError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(SettingsError::Negative { name, value });
    }
    Ok(())
}

pub(crate) fn in_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), SettingsError> {
    finite(name, value)?;
    if value < min || value > max {
        return Err(SettingsError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

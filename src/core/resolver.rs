//! Part dimension resolution
//!
//! Turns a cabinet type's part templates and a concrete set of dimensions into
//! [`ResolvedPart`]s with numeric sizes, quantities, areas and a single
//! [`PartCategory`]. The category is decided here, once, and every downstream
//! calculator reads it from the resolved part.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::formula::{self, Bindings, FormulaError};
use crate::core::weight::DEFAULT_DOOR_DENSITY;
use crate::entities::cabinet::{Dimensions, Part};
use crate::entities::rates::DoorStyle;

/// Board thickness assumed when a part does not set one
pub const DEFAULT_PART_THICKNESS_MM: f64 = 18.0;

/// Name fragments that mark an unflagged part as carcass
const CARCASS_NAME_PATTERNS: [&str; 3] = ["back", "bottom", "side"];

/// Cost/weight bucket of a resolved part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
    Carcass,
    Door,
    Hardware,
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartCategory::Carcass => write!(f, "carcass"),
            PartCategory::Door => write!(f, "door"),
            PartCategory::Hardware => write!(f, "hardware"),
        }
    }
}

/// How a part's category was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// `is_door` / `is_hardware` set on the part
    Flag,
    /// Unflagged part whose name matched a carcass pattern
    NamePattern,
    /// Unflagged part with no matching name
    Default,
}

impl PartCategory {
    /// Classify a part template
    ///
    /// `is_hardware` wins over `is_door`; flagged parts that are neither are
    /// carcass. Unflagged parts are carcass, recorded as a name-pattern match
    /// when the name contains "back", "bottom" or "side".
    pub fn classify(part: &Part) -> (PartCategory, CategorySource) {
        if part.is_hardware == Some(true) {
            return (PartCategory::Hardware, CategorySource::Flag);
        }
        if part.is_door == Some(true) {
            return (PartCategory::Door, CategorySource::Flag);
        }
        if !part.is_legacy() {
            return (PartCategory::Carcass, CategorySource::Flag);
        }

        let name = part.name.to_lowercase();
        if CARCASS_NAME_PATTERNS.iter().any(|p| name.contains(p)) {
            (PartCategory::Carcass, CategorySource::NamePattern)
        } else {
            log::debug!("Part '{}' has no category flags, treating as carcass", part.name);
            (PartCategory::Carcass, CategorySource::Default)
        }
    }
}

/// What to do with a formula that fails to evaluate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaMode {
    /// Use 0 and log a warning
    #[default]
    Lenient,
    /// Fail the resolution
    Strict,
}

/// Errors from part resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("part '{part}': invalid {field} formula '{formula}'")]
    Formula {
        part: String,
        field: &'static str,
        formula: String,
        #[source]
        source: FormulaError,
    },

    #[error("part '{part}': {field} resolves to a negative value ({value})")]
    NegativeDimension {
        part: String,
        field: &'static str,
        value: f64,
    },

    #[error("part '{part}': {per_cabinet} piece(s) x {cabinets} cabinet(s) is too many")]
    QuantityOverflow {
        part: String,
        per_cabinet: u32,
        cabinets: u32,
    },
}

/// Options that do not come from the part templates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub mode: FormulaMode,
    /// Areal density (kg/m²) for carcass parts that do not set their own
    pub carcass_density: f64,
    /// Areal density (kg/m²) of every door part
    pub door_density: f64,
    pub door_weight_factor: f64,
}

impl ResolveOptions {
    pub fn new(mode: FormulaMode, carcass_density: f64) -> Self {
        Self {
            mode,
            carcass_density,
            door_density: DEFAULT_DOOR_DENSITY,
            door_weight_factor: 1.0,
        }
    }

    /// Take door density and weight factor from the selected door style
    pub fn with_door_style(mut self, style: Option<&DoorStyle>) -> Self {
        self.door_density = style.and_then(|s| s.density).unwrap_or(DEFAULT_DOOR_DENSITY);
        self.door_weight_factor = style.and_then(|s| s.weight_factor).unwrap_or(1.0);
        self
    }
}

/// A part with concrete geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPart {
    pub name: String,
    pub category: PartCategory,
    pub category_source: CategorySource,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Pieces per cabinet
    pub unit_quantity: u32,
    /// Pieces across all cabinets of the line
    pub quantity: u32,
    /// Total area across `quantity` pieces
    pub area_m2: f64,
    pub thickness_mm: f64,
    /// Areal density in kg/m²; door parts carry the door style's
    pub density: f64,
    pub weight_multiplier: f64,
}

impl ResolvedPart {
    /// Area of a single piece
    pub fn instance_area_m2(&self) -> f64 {
        (self.width_mm / 1000.0) * (self.height_mm / 1000.0)
    }

    /// Area of the pieces belonging to one cabinet
    pub fn unit_area_m2(&self) -> f64 {
        self.instance_area_m2() * self.unit_quantity as f64
    }

    /// Effective kg per m², shared by the weight calculator and nesting
    pub fn areal_weight(&self) -> f64 {
        self.density * self.weight_multiplier
    }
}

/// Variables visible to part formulas
pub fn bindings(dims: &Dimensions, qty: u32) -> Bindings {
    let mut b = Bindings::new();
    b.insert("width".to_string(), dims.width);
    b.insert("height".to_string(), dims.height);
    b.insert("depth".to_string(), dims.depth);
    b.insert("qty".to_string(), qty as f64);
    b.insert("left_width".to_string(), dims.left_width.unwrap_or(dims.width));
    b.insert("right_width".to_string(), dims.right_width.unwrap_or(dims.width));
    b.insert("left_depth".to_string(), dims.left_depth.unwrap_or(dims.depth));
    b.insert("right_depth".to_string(), dims.right_depth.unwrap_or(dims.depth));
    b
}

/// Resolve every part of a cabinet for `qty` cabinets of size `dims`
pub fn resolve(
    parts: &[Part],
    dims: &Dimensions,
    qty: u32,
    options: &ResolveOptions,
) -> Result<Vec<ResolvedPart>, ResolveError> {
    let vars = bindings(dims, qty);
    parts
        .iter()
        .map(|part| resolve_part(part, &vars, qty, options))
        .collect()
}

fn resolve_part(
    part: &Part,
    vars: &Bindings,
    qty: u32,
    options: &ResolveOptions,
) -> Result<ResolvedPart, ResolveError> {
    let width_mm = eval_dimension(part, "width", &part.width_formula, vars, options.mode)?;
    let height_mm = eval_dimension(part, "height", &part.height_formula, vars, options.mode)?;
    let (category, category_source) = PartCategory::classify(part);

    let quantity = part
        .quantity
        .checked_mul(qty)
        .ok_or_else(|| ResolveError::QuantityOverflow {
            part: part.name.clone(),
            per_cabinet: part.quantity,
            cabinets: qty,
        })?;
    let area_m2 = (width_mm / 1000.0) * (height_mm / 1000.0) * quantity as f64;

    let (density, weight_multiplier) = match category {
        PartCategory::Door => (options.door_density, options.door_weight_factor),
        _ => (
            part.density.unwrap_or(options.carcass_density),
            part.weight_multiplier.unwrap_or(1.0),
        ),
    };

    Ok(ResolvedPart {
        name: part.name.clone(),
        category,
        category_source,
        width_mm,
        height_mm,
        unit_quantity: part.quantity,
        quantity,
        area_m2,
        thickness_mm: part.thickness_mm.unwrap_or(DEFAULT_PART_THICKNESS_MM),
        density,
        weight_multiplier,
    })
}

fn eval_dimension(
    part: &Part,
    field: &'static str,
    source: &str,
    vars: &Bindings,
    mode: FormulaMode,
) -> Result<f64, ResolveError> {
    let value = match mode {
        FormulaMode::Lenient => formula::evaluate(source, vars),
        FormulaMode::Strict => {
            formula::try_evaluate(source, vars).map_err(|e| ResolveError::Formula {
                part: part.name.clone(),
                field,
                formula: source.to_string(),
                source: e,
            })?
        }
    };

    if value < 0.0 {
        return Err(ResolveError::NegativeDimension {
            part: part.name.clone(),
            field,
            value,
        });
    }
    Ok(value)
}

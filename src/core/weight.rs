//! Weight calculation
//!
//! Mirrors the cost pipeline with areal density (kg/m²) in place of rate.
//! Each resolved part already carries its effective density (door parts the
//! door style's); nesting weighs sheets with the same figure.
//! Component weights are computed for one cabinet and multiplied by the line
//! quantity once, at the end.

use serde::Serialize;
use thiserror::Error;

use crate::core::resolver::{PartCategory, ResolvedPart};
use crate::entities::cabinet::Dimensions;

/// Door areal density when the door style does not set one, kg/m²
pub const DEFAULT_DOOR_DENSITY: f64 = 12.0;

/// Hardware weight of a reference-size cabinet per hardware part, kg
pub const BASE_HARDWARE_WEIGHT_KG: f64 = 2.5;

/// Face area of the reference cabinet (600 × 720 mm), m²
pub const REFERENCE_CABINET_AREA_M2: f64 = 0.600 * 0.720;

/// Errors from weight calculation
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("computed weight {total:.2} kg is negative; check part densities")]
    NegativeTotal { total: f64 },

    #[error("computed weight is not a finite number")]
    NonFinite,
}

/// Line weight in kg, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightBreakdown {
    /// Carcass weight of one cabinet
    pub carcass: f64,
    /// Door weight of one cabinet
    pub doors: f64,
    /// Estimated hardware weight of one cabinet
    pub hardware: f64,
    /// Weight of one cabinet
    pub unit_total: f64,
    pub quantity: u32,
    /// Weight of the whole line
    pub total: f64,
}

/// Hardware weight estimate for one cabinet
///
/// Scales the base weight by the cabinet's face area relative to a
/// 600 × 720 mm cabinet and by the number of hardware parts. This is an
/// estimate, not a measured value.
pub fn hardware_weight_estimate(dims: &Dimensions, hardware_part_quantity: u32) -> f64 {
    BASE_HARDWARE_WEIGHT_KG * (dims.face_area_m2() / REFERENCE_CABINET_AREA_M2)
        * hardware_part_quantity as f64
}

/// Weigh `qty` cabinets built from `parts`
pub fn weigh(
    parts: &[ResolvedPart],
    dims: &Dimensions,
    qty: u32,
) -> Result<WeightBreakdown, WeightError> {
    let mut carcass = 0.0;
    let mut doors = 0.0;
    let mut hardware_parts: u32 = 0;

    for part in parts {
        match part.category {
            PartCategory::Carcass => {
                carcass += part.unit_area_m2() * part.areal_weight();
            }
            PartCategory::Door => {
                doors += part.unit_area_m2() * part.areal_weight();
            }
            PartCategory::Hardware => {
                hardware_parts = hardware_parts.saturating_add(part.unit_quantity);
            }
        }
    }

    let hardware = hardware_weight_estimate(dims, hardware_parts);
    let unit_total = carcass + doors + hardware;
    let total = unit_total * qty as f64;

    if !total.is_finite() {
        return Err(WeightError::NonFinite);
    }
    if total < 0.0 || unit_total < 0.0 {
        return Err(WeightError::NegativeTotal { total });
    }

    let round = |v: f64| (v * 100.0).round() / 100.0;
    Ok(WeightBreakdown {
        carcass: round(carcass),
        doors: round(doors),
        hardware: round(hardware),
        unit_total: round(unit_total),
        quantity: qty,
        total: round(total),
    })
}

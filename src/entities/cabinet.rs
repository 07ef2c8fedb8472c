//! Cabinet type entity - parametric cabinet definitions with their parts
//!
//! A cabinet type is immutable reference data: default dimensions, door and
//! drawer counts, the parts it is built from (with width/height formulas) and
//! the hardware it needs.

use serde::{Deserialize, Serialize};

use crate::entities::hardware::HardwareRequirement;

/// Cabinet category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinetCategory {
    Base,
    Wall,
    Tall,
    Corner,
    DrawerUnit,
}

impl Default for CabinetCategory {
    fn default() -> Self {
        CabinetCategory::Base
    }
}

impl std::fmt::Display for CabinetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CabinetCategory::Base => write!(f, "base"),
            CabinetCategory::Wall => write!(f, "wall"),
            CabinetCategory::Tall => write!(f, "tall"),
            CabinetCategory::Corner => write!(f, "corner"),
            CabinetCategory::DrawerUnit => write!(f, "drawer_unit"),
        }
    }
}

impl std::str::FromStr for CabinetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base" => Ok(CabinetCategory::Base),
            "wall" => Ok(CabinetCategory::Wall),
            "tall" => Ok(CabinetCategory::Tall),
            "corner" => Ok(CabinetCategory::Corner),
            "drawer_unit" | "drawer-unit" => Ok(CabinetCategory::DrawerUnit),
            _ => Err(format!(
                "Invalid category: {}. Use base, wall, tall, corner, or drawer_unit",
                s
            )),
        }
    }
}

/// A part template belonging to a cabinet type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part name (e.g. "Side", "Back", "Door")
    pub name: String,

    /// Width formula in mm, e.g. `depth - 18`
    pub width_formula: String,

    /// Height formula in mm, e.g. `height`
    pub height_formula: String,

    /// Pieces per cabinet
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Door or drawer front
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_door: Option<bool>,

    /// Hardware item listed as a part (hinge plate, rail, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hardware: Option<bool>,

    /// Board thickness in mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<f64>,

    /// Areal density override in kg/m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    /// Multiplier applied to this part's weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_multiplier: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

impl Part {
    /// Create a part with the given formulas and quantity and no flags set
    pub fn new(
        name: impl Into<String>,
        width_formula: impl Into<String>,
        height_formula: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            width_formula: width_formula.into(),
            height_formula: height_formula.into(),
            quantity,
            is_door: None,
            is_hardware: None,
            thickness_mm: None,
            density: None,
            weight_multiplier: None,
        }
    }

    /// Mark as a door part
    pub fn door(mut self) -> Self {
        self.is_door = Some(true);
        self.is_hardware = Some(false);
        self
    }

    /// Mark as a hardware part
    pub fn hardware(mut self) -> Self {
        self.is_hardware = Some(true);
        self
    }

    /// True when neither flag was given (pre-flag catalog data)
    pub fn is_legacy(&self) -> bool {
        self.is_door.is_none() && self.is_hardware.is_none()
    }
}

/// Concrete cabinet dimensions in mm
///
/// The corner variants are only meaningful for corner cabinets; when absent
/// they fall back to `width`/`depth`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_depth: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_depth: Option<f64>,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            left_width: None,
            right_width: None,
            left_depth: None,
            right_depth: None,
        }
    }

    /// Front face area in m²
    pub fn face_area_m2(&self) -> f64 {
        (self.width / 1000.0) * (self.height / 1000.0)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Cabinet type - reference data for one configurable cabinet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetType {
    /// Catalog identifier used by job files (e.g. "base-600")
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub category: CabinetCategory,

    /// Default width in mm
    pub default_width: f64,

    /// Default height in mm
    pub default_height: f64,

    /// Default depth in mm
    pub default_depth: f64,

    #[serde(default)]
    pub door_count: u32,

    #[serde(default)]
    pub drawer_count: u32,

    /// Carcass areal density override in kg/m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_density: Option<f64>,

    #[serde(default)]
    pub parts: Vec<Part>,

    #[serde(default)]
    pub hardware: Vec<HardwareRequirement>,
}

impl CabinetType {
    /// Default dimensions with no corner overrides
    pub fn default_dimensions(&self) -> Dimensions {
        Dimensions::new(self.default_width, self.default_height, self.default_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_YAML: &str = r#"
id: base-600
name: Base 600
category: base
default_width: 600
default_height: 720
default_depth: 560
door_count: 2
parts:
  - name: Side
    width_formula: depth
    height_formula: height
    quantity: 2
  - name: Door
    width_formula: width / 2 - 3
    height_formula: height - 4
    quantity: 2
    is_door: true
hardware:
  - id: hinge
    name: Soft-close hinge
    unit_scope: per_door
    units_per_scope: 2
"#;

    #[test]
    fn test_cabinet_from_yaml() {
        let cab: CabinetType = serde_yml::from_str(BASE_YAML).unwrap();
        assert_eq!(cab.id, "base-600");
        assert_eq!(cab.category, CabinetCategory::Base);
        assert_eq!(cab.door_count, 2);
        assert_eq!(cab.drawer_count, 0);
        assert_eq!(cab.parts.len(), 2);
        assert!(cab.parts[0].is_legacy());
        assert_eq!(cab.parts[1].is_door, Some(true));
        assert_eq!(cab.hardware.len(), 1);
    }

    #[test]
    fn test_part_quantity_defaults_to_one() {
        let part: Part =
            serde_yml::from_str("name: Top\nwidth_formula: width\nheight_formula: depth\n").unwrap();
        assert_eq!(part.quantity, 1);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Drawer-Unit".parse::<CabinetCategory>().unwrap(),
            CabinetCategory::DrawerUnit
        );
        assert!("island".parse::<CabinetCategory>().is_err());
    }

    #[test]
    fn test_dimensions_display_and_area() {
        let dims = Dimensions::new(600.0, 720.0, 560.0);
        assert_eq!(dims.to_string(), "600x720x560");
        assert!((dims.face_area_m2() - 0.432).abs() < 1e-12);
    }
}

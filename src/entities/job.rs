//! Job entity - the line items a customer configured

use serde::{Deserialize, Serialize};

use crate::entities::cabinet::{CabinetType, Dimensions};

/// Material, finish and hardware choices for one line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Carcass material (key into `materials`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Hardware brand (key into the hardware catalog)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_brand: Option<String>,
}

/// One configured cabinet line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Cabinet type id
    pub cabinet: String,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Width override in mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_depth: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_depth: Option<f64>,

    #[serde(flatten)]
    pub selection: Selection,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// A line for `cabinet` at its default size
    pub fn new(cabinet: impl Into<String>, quantity: u32) -> Self {
        Self {
            cabinet: cabinet.into(),
            quantity,
            width: None,
            height: None,
            depth: None,
            left_width: None,
            right_width: None,
            left_depth: None,
            right_depth: None,
            selection: Selection::default(),
        }
    }

    /// Overrides merged over the cabinet type's defaults
    pub fn dimensions(&self, cabinet: &CabinetType) -> Dimensions {
        Dimensions {
            width: self.width.unwrap_or(cabinet.default_width),
            height: self.height.unwrap_or(cabinet.default_height),
            depth: self.depth.unwrap_or(cabinet.default_depth),
            left_width: self.left_width,
            right_width: self.right_width,
            left_depth: self.left_depth,
            right_depth: self.right_depth,
        }
    }
}

/// A job file: a named list of line items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub lines: Vec<LineItem>,
}

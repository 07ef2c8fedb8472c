//! Hardware requirement and brand catalog types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counting basis for a hardware requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitScope {
    PerCabinet,
    PerDoor,
    PerDrawer,
    Custom,
}

impl Default for UnitScope {
    fn default() -> Self {
        UnitScope::PerCabinet
    }
}

impl std::fmt::Display for UnitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitScope::PerCabinet => write!(f, "per_cabinet"),
            UnitScope::PerDoor => write!(f, "per_door"),
            UnitScope::PerDrawer => write!(f, "per_drawer"),
            UnitScope::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for UnitScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "per_cabinet" => Ok(UnitScope::PerCabinet),
            "per_door" => Ok(UnitScope::PerDoor),
            "per_drawer" => Ok(UnitScope::PerDrawer),
            "custom" => Ok(UnitScope::Custom),
            _ => Err(format!(
                "Invalid unit scope: {}. Use per_cabinet, per_door, per_drawer, or custom",
                s
            )),
        }
    }
}

/// Abstract hardware rule attached to a cabinet type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareRequirement {
    /// Key into the brand catalog
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub unit_scope: UnitScope,

    #[serde(default = "default_units_per_scope")]
    pub units_per_scope: u32,
}

fn default_units_per_scope() -> u32 {
    1
}

impl HardwareRequirement {
    pub fn new(id: impl Into<String>, unit_scope: UnitScope, units_per_scope: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            unit_scope,
            units_per_scope,
        }
    }
}

/// Unit costs keyed by requirement id
pub type UnitCostTable = BTreeMap<String, f64>;

/// Brand-specific hardware unit costs (`catalog/hardware.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareCatalog {
    /// Brand used when a line item names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_brand: Option<String>,

    #[serde(default)]
    pub brands: BTreeMap<String, UnitCostTable>,
}

impl HardwareCatalog {
    /// Unit cost table for a brand, or for the default brand when `brand` is None
    pub fn brand(&self, brand: Option<&str>) -> Option<&UnitCostTable> {
        let name = brand.or(self.default_brand.as_deref())?;
        self.brands
            .get(name)
            .or_else(|| {
                self.brands
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
    }
}

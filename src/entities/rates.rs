//! Rate catalog - per-square-metre rates for materials, finishes, door styles and colors

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::{
    DEFAULT_COLOR_SURCHARGE_PER_SQM, DEFAULT_DOOR_STYLE_RATE_PER_SQM, DEFAULT_FINISH_RATE_PER_SQM,
};
use crate::entities::job::Selection;

/// Door style pricing and weight properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoorStyle {
    /// Rate per m² of door area
    #[serde(default)]
    pub rate_per_sqm: f64,

    /// Areal density in kg/m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    /// Multiplier applied to door weight (glass inserts, solid wood, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_factor: Option<f64>,
}

/// Rates applied to one line item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    pub material_rate_per_sqm: f64,
    pub finish_rate_per_sqm: f64,
    pub door_style_rate_per_sqm: f64,
    pub color_surcharge_per_sqm: f64,
}

impl RateSet {
    /// Combined per-m² rate for door parts
    pub fn door_rate_per_sqm(&self) -> f64 {
        self.finish_rate_per_sqm + self.door_style_rate_per_sqm + self.color_surcharge_per_sqm
    }
}

/// All rates known to a catalog project (`catalog/rates.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateCatalog {
    /// Carcass material rate per m² by name
    #[serde(default)]
    pub materials: BTreeMap<String, f64>,

    /// Finish rate per m² by name
    #[serde(default)]
    pub finishes: BTreeMap<String, f64>,

    #[serde(default)]
    pub door_styles: BTreeMap<String, DoorStyle>,

    /// Color surcharge per m² by name
    #[serde(default)]
    pub colors: BTreeMap<String, f64>,
}

impl RateCatalog {
    /// Look up a door style by name
    pub fn door_style(&self, name: Option<&str>) -> Option<&DoorStyle> {
        name.and_then(|n| lookup(&self.door_styles, n))
    }

    /// Build the rate set for a selection
    ///
    /// Missing or unknown entries fall back to the named defaults and are
    /// logged; the carcass material fallback is supplied by configuration.
    pub fn rate_set(&self, selection: &Selection, default_material_rate: f64) -> RateSet {
        let material_rate_per_sqm = resolve_rate(
            "material",
            selection.material.as_deref(),
            |n| lookup(&self.materials, n).copied(),
            default_material_rate,
        );
        let finish_rate_per_sqm = resolve_rate(
            "finish",
            selection.finish.as_deref(),
            |n| lookup(&self.finishes, n).copied(),
            DEFAULT_FINISH_RATE_PER_SQM,
        );
        let door_style_rate_per_sqm = resolve_rate(
            "door style",
            selection.door_style.as_deref(),
            |n| self.door_style(Some(n)).map(|s| s.rate_per_sqm),
            DEFAULT_DOOR_STYLE_RATE_PER_SQM,
        );
        let color_surcharge_per_sqm = resolve_rate(
            "color",
            selection.color.as_deref(),
            |n| lookup(&self.colors, n).copied(),
            DEFAULT_COLOR_SURCHARGE_PER_SQM,
        );

        RateSet {
            material_rate_per_sqm,
            finish_rate_per_sqm,
            door_style_rate_per_sqm,
            color_surcharge_per_sqm,
        }
    }
}

fn resolve_rate(
    kind: &str,
    name: Option<&str>,
    find: impl Fn(&str) -> Option<f64>,
    default: f64,
) -> f64 {
    match name {
        Some(n) => find(n).unwrap_or_else(|| {
            log::warn!("No {} rate for '{}', using default {:.2}/m²", kind, n, default);
            default
        }),
        None => {
            log::debug!("No {} selected, using default {:.2}/m²", kind, default);
            default
        }
    }
}

/// Exact key match first, then case-insensitive
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RateCatalog {
        serde_yml::from_str(
            r#"
materials:
  HMR: 45.0
  MDF: 38.0
finishes:
  laminate: 20.0
door_styles:
  shaker:
    rate_per_sqm: 30.0
    density: 14.0
colors:
  white: 5.0
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_rate_set_from_selection() {
        let selection = Selection {
            material: Some("hmr".to_string()),
            finish: Some("laminate".to_string()),
            door_style: Some("Shaker".to_string()),
            color: Some("white".to_string()),
            hardware_brand: None,
        };

        let rates = catalog().rate_set(&selection, 99.0);
        assert_eq!(rates.material_rate_per_sqm, 45.0);
        assert_eq!(rates.finish_rate_per_sqm, 20.0);
        assert_eq!(rates.door_style_rate_per_sqm, 30.0);
        assert_eq!(rates.color_surcharge_per_sqm, 5.0);
        assert_eq!(rates.door_rate_per_sqm(), 55.0);
    }

    #[test]
    fn test_rate_set_falls_back_to_defaults() {
        let selection = Selection {
            material: Some("plywood".to_string()),
            ..Default::default()
        };

        let rates = catalog().rate_set(&selection, 45.0);
        assert_eq!(rates.material_rate_per_sqm, 45.0);
        assert_eq!(rates.finish_rate_per_sqm, DEFAULT_FINISH_RATE_PER_SQM);
        assert_eq!(rates.door_style_rate_per_sqm, DEFAULT_DOOR_STYLE_RATE_PER_SQM);
        assert_eq!(rates.color_surcharge_per_sqm, DEFAULT_COLOR_SURCHARGE_PER_SQM);
    }

    #[test]
    fn test_door_style_lookup() {
        let cat = catalog();
        assert_eq!(cat.door_style(Some("shaker")).unwrap().density, Some(14.0));
        assert!(cat.door_style(Some("slab")).is_none());
        assert!(cat.door_style(None).is_none());
    }
}

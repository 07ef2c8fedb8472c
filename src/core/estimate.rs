//! Estimator pipeline
//!
//! Runs one line item through resolution, hardware, pricing and weight, and a
//! whole job through every line plus a shared nesting plan.

use miette::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::hardware::{resolve_hardware, HardwareError, HardwareResolution};
use crate::core::nesting::{nest_lines, NestingError, NestingPlan, ShippingPackage};
use crate::core::pricing::{price, round2, CostBreakdown, PricingError};
use crate::core::resolver::{resolve, ResolveError, ResolveOptions, ResolvedPart};
use crate::core::settings::EstimatorSettings;
use crate::core::weight::{weigh, WeightBreakdown, WeightError};
use crate::entities::cabinet::{CabinetType, Dimensions};
use crate::entities::hardware::HardwareCatalog;
use crate::entities::job::{Job, LineItem};
use crate::entities::rates::{RateCatalog, RateSet};

/// Errors from estimating a line or job
#[derive(Debug, Error, Diagnostic)]
pub enum EstimateError {
    #[error("unknown cabinet type '{0}'")]
    UnknownCabinet(String),

    #[error("line for '{cabinet}' has quantity 0")]
    ZeroQuantity { cabinet: String },

    #[error("line for '{cabinet}': {field} must be a non-negative number (got {value})")]
    InvalidDimension {
        cabinet: String,
        field: &'static str,
        value: f64,
    },

    #[error("cabinet '{cabinet}'")]
    Resolve {
        cabinet: String,
        #[source]
        source: ResolveError,
    },

    #[error("cabinet '{cabinet}'")]
    Hardware {
        cabinet: String,
        #[source]
        source: HardwareError,
    },

    #[error("cabinet '{cabinet}'")]
    Pricing {
        cabinet: String,
        #[source]
        source: PricingError,
    },

    #[error("cabinet '{cabinet}'")]
    Weight {
        cabinet: String,
        #[source]
        source: WeightError,
    },

    #[error(transparent)]
    Nesting(#[from] NestingError),
}

/// Reference data: cabinet types, rates and hardware prices
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub cabinets: BTreeMap<String, CabinetType>,
    pub rates: RateCatalog,
    pub hardware: HardwareCatalog,
}

impl Catalog {
    pub fn cabinet(&self, id: &str) -> Option<&CabinetType> {
        self.cabinets.get(id)
    }

    /// Add a cabinet type, returning the one it replaced
    pub fn insert_cabinet(&mut self, cabinet: CabinetType) -> Option<CabinetType> {
        self.cabinets.insert(cabinet.id.clone(), cabinet)
    }
}

/// A fully estimated line item
#[derive(Debug, Clone, Serialize)]
pub struct LineEstimate {
    pub cabinet: String,
    pub cabinet_name: String,
    pub dimensions: Dimensions,
    pub quantity: u32,
    pub rates: RateSet,
    pub parts: Vec<ResolvedPart>,
    pub hardware: HardwareResolution,
    pub cost: CostBreakdown,
    pub weight: WeightBreakdown,
}

/// A fully estimated job
#[derive(Debug, Clone, Serialize)]
pub struct JobEstimate {
    pub name: String,
    pub lines: Vec<LineEstimate>,
    /// Sum of the rounded line totals
    pub total_cost: f64,
    pub total_weight_kg: f64,
    pub nesting: NestingPlan,
    pub packages: Vec<ShippingPackage>,
}

/// Estimator over borrowed reference data and settings
pub struct Estimator<'a> {
    catalog: &'a Catalog,
    settings: &'a EstimatorSettings,
}

impl<'a> Estimator<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a EstimatorSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &EstimatorSettings {
        self.settings
    }

    /// Estimate cost and weight of one line item
    pub fn estimate_line(&self, line: &LineItem) -> Result<LineEstimate, EstimateError> {
        let cabinet = self
            .catalog
            .cabinet(&line.cabinet)
            .ok_or_else(|| EstimateError::UnknownCabinet(line.cabinet.clone()))?;

        if line.quantity == 0 {
            return Err(EstimateError::ZeroQuantity {
                cabinet: cabinet.id.clone(),
            });
        }

        let dims = line.dimensions(cabinet);
        check_dimensions(&cabinet.id, &dims)?;
        let qty = line.quantity;

        log::debug!("Estimating {} x {} at {}", qty, cabinet.id, dims);

        let door_style = self
            .catalog
            .rates
            .door_style(line.selection.door_style.as_deref());
        let options = ResolveOptions::new(
            self.settings.formula_mode,
            cabinet
                .material_density
                .unwrap_or(self.settings.default_carcass_density),
        )
        .with_door_style(door_style);
        let parts =
            resolve(&cabinet.parts, &dims, qty, &options).map_err(|source| EstimateError::Resolve {
                cabinet: cabinet.id.clone(),
                source,
            })?;

        let brand = line.selection.hardware_brand.as_deref();
        let unit_costs = self.catalog.hardware.brand(brand);
        if let (Some(name), None) = (brand, unit_costs) {
            log::warn!("Unknown hardware brand '{}', using default unit costs", name);
        }
        let hardware = resolve_hardware(
            &cabinet.hardware,
            cabinet.door_count,
            cabinet.drawer_count,
            qty,
            unit_costs,
            self.settings.default_hardware_unit_cost,
        )
        .map_err(|source| EstimateError::Hardware {
            cabinet: cabinet.id.clone(),
            source,
        })?;

        let rates = self
            .catalog
            .rates
            .rate_set(&line.selection, self.settings.default_material_rate);

        let global = &self.settings.global;
        let cost = price(&parts, &rates, hardware.adjusted_cost(global), global).map_err(
            |source| EstimateError::Pricing {
                cabinet: cabinet.id.clone(),
                source,
            },
        )?;

        let weight = weigh(&parts, &dims, qty).map_err(|source| {
            EstimateError::Weight {
                cabinet: cabinet.id.clone(),
                source,
            }
        })?;

        Ok(LineEstimate {
            cabinet: cabinet.id.clone(),
            cabinet_name: cabinet.name.clone(),
            dimensions: dims,
            quantity: qty,
            rates,
            parts,
            hardware,
            cost,
            weight,
        })
    }

    /// Estimate every line of a job and nest all of their parts
    pub fn estimate_job(&self, job: &Job) -> Result<JobEstimate, EstimateError> {
        let lines = job
            .lines
            .iter()
            .map(|line| self.estimate_line(line))
            .collect::<Result<Vec<_>, _>>()?;

        let parts: Vec<&[ResolvedPart]> = lines.iter().map(|l| l.parts.as_slice()).collect();
        let nesting = nest_lines(&parts, &self.settings.sheet)?;
        let packages = nesting.packages(&self.settings.packaging);

        let total_cost = round2(lines.iter().map(|l| l.cost.total).sum());
        let total_weight_kg = round2(lines.iter().map(|l| l.weight.total).sum());

        log::debug!(
            "Job '{}': {} lines, {} sheets, total {:.2}",
            job.name,
            lines.len(),
            nesting.sheets.len(),
            total_cost
        );

        Ok(JobEstimate {
            name: job.name.clone(),
            lines,
            total_cost,
            total_weight_kg,
            nesting,
            packages,
        })
    }
}

fn check_dimensions(cabinet: &str, dims: &Dimensions) -> Result<(), EstimateError> {
    let fields = [
        ("width", Some(dims.width)),
        ("height", Some(dims.height)),
        ("depth", Some(dims.depth)),
        ("left_width", dims.left_width),
        ("right_width", dims.right_width),
        ("left_depth", dims.left_depth),
        ("right_depth", dims.right_depth),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimateError::InvalidDimension {
                    cabinet: cabinet.to_string(),
                    field,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nesting::{ExclusionReason, SheetSpec};
    use crate::core::resolver::{FormulaMode, PartCategory};
    use crate::core::settings::GlobalSettings;
    use crate::entities::cabinet::{CabinetCategory, Part};
    use crate::entities::hardware::{HardwareRequirement, UnitScope};
    use crate::entities::rates::DoorStyle;

    fn base_cabinet() -> CabinetType {
        CabinetType {
            id: "base-600".to_string(),
            name: "Base 600".to_string(),
            category: CabinetCategory::Base,
            default_width: 600.0,
            default_height: 720.0,
            default_depth: 560.0,
            door_count: 2,
            drawer_count: 0,
            material_density: None,
            parts: vec![
                Part::new("Back", "width", "height", 2),
                Part::new("Door", "width / 2", "height", 2).door(),
            ],
            hardware: vec![HardwareRequirement::new("hinge", UnitScope::PerDoor, 2)],
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.insert_cabinet(base_cabinet());
        catalog.rates.materials.insert("HMR".to_string(), 45.0);
        catalog.rates.finishes.insert("Laminate".to_string(), 20.0);
        catalog.rates.door_styles.insert(
            "Shaker".to_string(),
            DoorStyle {
                rate_per_sqm: 30.0,
                density: Some(14.0),
                weight_factor: None,
            },
        );
        catalog
            .hardware
            .brands
            .insert("Hettich".to_string(), [("hinge".to_string(), 4.0)].into());
        catalog
    }

    fn settings() -> EstimatorSettings {
        EstimatorSettings {
            global: GlobalSettings::new(0.0, 0.0, 0.0, 0.0).unwrap(),
            ..EstimatorSettings::default()
        }
    }

    #[test]
    fn test_estimate_line() {
        let catalog = catalog();
        let settings = settings();
        let estimator = Estimator::new(&catalog, &settings);

        let mut line = LineItem::new("base-600", 3);
        line.selection.material = Some("HMR".to_string());
        line.selection.finish = Some("Laminate".to_string());
        line.selection.door_style = Some("Shaker".to_string());
        line.selection.hardware_brand = Some("Hettich".to_string());

        let est = estimator.estimate_line(&line).unwrap();
        assert_eq!(est.quantity, 3);
        assert_eq!(est.parts.len(), 2);

        // 12 hinges at 4.0
        assert_eq!(est.hardware.total_units(), 12);
        assert_eq!(est.cost.hardware, 48.0);

        // backs: 0.864 m² × 3 × 45; doors: 0.432 m² × 3 × 50
        assert_eq!(est.cost.carcass, 116.64);
        assert_eq!(est.cost.doors, 64.8);
        assert_eq!(est.cost.total, 229.44);

        // per cabinet: 0.864 × 13.5 + 0.432 × 14
        assert!((est.weight.unit_total - 17.71).abs() < 1e-9);
        assert_eq!(est.weight.quantity, 3);
    }

    #[test]
    fn test_sheet_weight_matches_line_weight() {
        let mut catalog = catalog();
        let mut cabinet = base_cabinet();
        cabinet.id = "doors-only".to_string();
        cabinet.parts = vec![Part::new("Door", "width / 2", "height", 2).door()];
        cabinet.hardware.clear();
        catalog.insert_cabinet(cabinet);

        let settings = settings();
        let mut line = LineItem::new("doors-only", 2);
        line.selection.door_style = Some("Shaker".to_string());
        let job = Job {
            name: "Doors".to_string(),
            lines: vec![line],
        };

        let est = Estimator::new(&catalog, &settings).estimate_job(&job).unwrap();
        // 4 doors of 0.216 m² at the Shaker 14 kg/m²
        assert_eq!(est.lines[0].weight.doors, 6.05);
        assert!((est.nesting.total_weight_kg() - 12.096).abs() < 1e-9);
        assert!((est.nesting.total_weight_kg() - est.lines[0].weight.total).abs() < 0.01);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let catalog = catalog();
        let settings = settings();
        let estimator = Estimator::new(&catalog, &settings);

        let mut line = LineItem::new("base-600", 1);
        line.width = Some(1000.0);
        line.height = Some(1000.0);
        line.selection.material = Some("Teak".to_string());

        let est = estimator.estimate_line(&line).unwrap();
        assert_eq!(est.dimensions.width, 1000.0);
        assert_eq!(est.rates.material_rate_per_sqm, settings.default_material_rate);
        // no brand: 4 hinges at the default unit cost
        assert_eq!(est.cost.hardware, 4.0 * settings.default_hardware_unit_cost);
    }

    #[test]
    fn test_unknown_cabinet_and_zero_quantity() {
        let catalog = catalog();
        let settings = settings();
        let estimator = Estimator::new(&catalog, &settings);

        assert!(matches!(
            estimator.estimate_line(&LineItem::new("wall-300", 1)),
            Err(EstimateError::UnknownCabinet(id)) if id == "wall-300"
        ));
        assert!(matches!(
            estimator.estimate_line(&LineItem::new("base-600", 0)),
            Err(EstimateError::ZeroQuantity { .. })
        ));
    }

    #[test]
    fn test_negative_override_is_rejected() {
        let catalog = catalog();
        let settings = settings();
        let estimator = Estimator::new(&catalog, &settings);

        let mut line = LineItem::new("base-600", 1);
        line.depth = Some(-10.0);
        assert!(matches!(
            estimator.estimate_line(&line),
            Err(EstimateError::InvalidDimension { field: "depth", .. })
        ));
    }

    #[test]
    fn test_strict_mode_surfaces_formula_errors() {
        let mut catalog = catalog();
        let mut cabinet = base_cabinet();
        cabinet.id = "broken".to_string();
        cabinet.parts = vec![Part::new("Side", "depth *", "height", 2)];
        catalog.insert_cabinet(cabinet);

        let mut settings = settings();
        let line = LineItem::new("broken", 1);

        let lenient = Estimator::new(&catalog, &settings).estimate_line(&line).unwrap();
        assert_eq!(lenient.cost.carcass, 0.0);

        settings.formula_mode = FormulaMode::Strict;
        assert!(matches!(
            Estimator::new(&catalog, &settings).estimate_line(&line),
            Err(EstimateError::Resolve { .. })
        ));
    }

    #[test]
    fn test_oversize_part_is_priced_but_not_nested() {
        let mut catalog = catalog();
        let mut cabinet = base_cabinet();
        cabinet.id = "tall-worktop".to_string();
        cabinet.hardware.clear();
        cabinet.parts = vec![
            Part::new("Side", "depth", "height", 2),
            Part::new("Worktop", "3000", "depth", 1),
        ];
        catalog.insert_cabinet(cabinet);

        let settings = EstimatorSettings {
            sheet: SheetSpec {
                width_mm: 2440.0,
                height_mm: 1220.0,
                target_efficiency: 0.85,
            },
            ..settings()
        };
        let estimator = Estimator::new(&catalog, &settings);
        let job = Job {
            name: "Kitchen".to_string(),
            lines: vec![LineItem::new("tall-worktop", 1)],
        };

        let est = estimator.estimate_job(&job).unwrap();
        let line = &est.lines[0];

        // worktop 3.0 × 0.56 m² is in the carcass area
        assert!((line.cost.carcass_area_m2 - (2.0 * 0.56 * 0.72 + 3.0 * 0.56)).abs() < 1e-3);

        assert!(est
            .nesting
            .sheets
            .iter()
            .all(|s| s.parts.iter().all(|p| p.name != "Worktop")));
        assert_eq!(est.nesting.excluded[0].name, "Worktop");
        assert_eq!(est.nesting.excluded[0].reason, ExclusionReason::ExceedsSheet);
    }

    #[test]
    fn test_estimate_job_totals() {
        let catalog = catalog();
        let settings = settings();
        let estimator = Estimator::new(&catalog, &settings);

        let job = Job {
            name: "Kitchen".to_string(),
            lines: vec![LineItem::new("base-600", 1), LineItem::new("base-600", 2)],
        };
        let est = estimator.estimate_job(&job).unwrap();

        assert_eq!(est.lines.len(), 2);
        let sum: f64 = est.lines.iter().map(|l| l.cost.total).sum();
        assert!((est.total_cost - sum).abs() < 1e-9);
        assert_eq!(est.packages.len(), est.nesting.sheets.len());
        assert!(!est.nesting.sheets.is_empty());

        let placed_lines: Vec<usize> = est
            .nesting
            .sheets
            .iter()
            .flat_map(|s| s.parts.iter().map(|p| p.line))
            .collect();
        assert!(placed_lines.windows(2).all(|w| w[0] <= w[1]));
        assert!(est
            .nesting
            .sheets
            .iter()
            .flat_map(|s| &s.parts)
            .all(|p| p.category != PartCategory::Hardware));
    }
}

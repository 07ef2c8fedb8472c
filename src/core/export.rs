//! Flat CSV export of estimated lines
//!
//! One row per resolved part, then one `hardware` row per hardware
//! requirement. Part rows carry the per-m² rate of their category; hardware
//! parts are not area priced and show 0.

use miette::Diagnostic;
use serde::Serialize;
use std::io;
use thiserror::Error;

use crate::core::estimate::LineEstimate;
use crate::core::pricing::round2;
use crate::core::resolver::{PartCategory, ResolvedPart};
use crate::entities::rates::RateSet;

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One exported row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub cabinet_type: String,
    pub dimensions: String,
    pub quantity: u32,
    pub part_name: String,
    pub part_width: f64,
    pub part_height: f64,
    pub part_quantity: u32,
    pub area: f64,
    pub category: String,
    pub unit_cost: f64,
    pub total_cost: f64,
}

/// Per-m² rate applied to a category
pub fn category_rate(rates: &RateSet, category: PartCategory) -> f64 {
    match category {
        PartCategory::Carcass => rates.material_rate_per_sqm,
        PartCategory::Door => rates.door_rate_per_sqm(),
        PartCategory::Hardware => 0.0,
    }
}

fn part_row(line: &LineEstimate, part: &ResolvedPart) -> ExportRow {
    let unit_cost = category_rate(&line.rates, part.category);
    ExportRow {
        cabinet_type: line.cabinet.clone(),
        dimensions: line.dimensions.to_string(),
        quantity: line.quantity,
        part_name: part.name.clone(),
        part_width: part.width_mm,
        part_height: part.height_mm,
        part_quantity: part.quantity,
        area: round3(part.area_m2),
        category: part.category.to_string(),
        unit_cost,
        total_cost: round2(part.area_m2 * unit_cost),
    }
}

/// Rows for a set of line estimates, in line order
pub fn rows(lines: &[LineEstimate]) -> Vec<ExportRow> {
    let mut out = Vec::new();
    for line in lines {
        out.extend(line.parts.iter().map(|p| part_row(line, p)));
        out.extend(line.hardware.lines.iter().map(|hw| ExportRow {
            cabinet_type: line.cabinet.clone(),
            dimensions: line.dimensions.to_string(),
            quantity: line.quantity,
            part_name: hw.name.clone(),
            part_width: 0.0,
            part_height: 0.0,
            part_quantity: hw.units,
            area: 0.0,
            category: "hardware".to_string(),
            unit_cost: hw.unit_cost,
            total_cost: round2(hw.cost),
        }));
    }
    out
}

/// Write rows as CSV with a header
pub fn write_csv<W: io::Write>(writer: W, lines: &[LineEstimate]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows(lines) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimate::{Catalog, Estimator};
    use crate::core::settings::EstimatorSettings;
    use crate::entities::cabinet::{CabinetCategory, CabinetType, Part};
    use crate::entities::hardware::{HardwareRequirement, UnitScope};
    use crate::entities::job::LineItem;

    fn line() -> LineEstimate {
        let mut catalog = Catalog::default();
        catalog.insert_cabinet(CabinetType {
            id: "wall-300".to_string(),
            name: "Wall 300".to_string(),
            category: CabinetCategory::Wall,
            default_width: 300.0,
            default_height: 720.0,
            default_depth: 320.0,
            door_count: 1,
            drawer_count: 0,
            material_density: None,
            parts: vec![
                Part::new("Side", "depth", "height", 2),
                Part::new("Door", "width", "height", 1).door(),
                Part::new("Rail", "width", "20", 1).hardware(),
            ],
            hardware: vec![HardwareRequirement::new("hinge", UnitScope::PerDoor, 2)],
        });
        catalog.rates.finishes.insert("Matt".to_string(), 12.0);

        let settings = EstimatorSettings::default();
        let mut item = LineItem::new("wall-300", 2);
        item.selection.finish = Some("Matt".to_string());
        Estimator::new(&catalog, &settings).estimate_line(&item).unwrap()
    }

    #[test]
    fn test_rows() {
        let rows = rows(&[line()]);
        assert_eq!(rows.len(), 4);

        let side = &rows[0];
        assert_eq!(side.cabinet_type, "wall-300");
        assert_eq!(side.dimensions, "300x720x320");
        assert_eq!(side.quantity, 2);
        assert_eq!(side.part_quantity, 4);
        assert_eq!(side.category, "carcass");
        assert_eq!(side.unit_cost, 45.0);

        let door = &rows[1];
        assert_eq!(door.category, "door");
        assert_eq!(door.unit_cost, 12.0);

        let rail = &rows[2];
        assert_eq!(rail.category, "hardware");
        assert_eq!(rail.unit_cost, 0.0);
        assert_eq!(rail.total_cost, 0.0);

        let hinge = &rows[3];
        assert_eq!(hinge.part_name, "hinge");
        assert_eq!(hinge.part_quantity, 4);
        assert_eq!(hinge.unit_cost, 5.0);
        assert_eq!(hinge.total_cost, 20.0);
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[line()]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "cabinet_type,dimensions,quantity,part_name,part_width,part_height,part_quantity,area,category,unit_cost,total_cost"
        );
        assert!(lines.next().unwrap().starts_with("wall-300,300x720x320,2,Side,320.0,720.0,4,"));
        assert_eq!(text.lines().count(), 5);
    }
}

//! Cost calculation
//!
//! Carcass parts are priced at the material rate, door parts at finish +
//! door style + color surcharge, hardware is added as a lump sum. Wastage
//! and GST are applied to the subtotal in that order. Sums are carried at
//! full precision; only the reported fields are rounded to 2 decimals.

use serde::Serialize;
use thiserror::Error;

use crate::core::resolver::{PartCategory, ResolvedPart};
use crate::core::settings::GlobalSettings;
use crate::entities::rates::RateSet;

/// Errors from pricing
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("computed total {total:.2} is negative; check rates and hardware costs")]
    NegativeTotal { total: f64 },

    #[error("computed total is not a finite number")]
    NonFinite,
}

/// Priced line, every field rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub carcass_area_m2: f64,
    pub door_area_m2: f64,
    /// Carcass area × material rate
    pub carcass: f64,
    /// Door area × (finish + door style)
    pub doors: f64,
    /// Door area × color surcharge
    pub surcharges: f64,
    pub hardware: f64,
    pub subtotal: f64,
    pub wastage: f64,
    pub gst: f64,
    pub total: f64,
}

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of `area_m2` over parts of one category
pub fn category_area(parts: &[ResolvedPart], category: PartCategory) -> f64 {
    parts
        .iter()
        .filter(|p| p.category == category)
        .map(|p| p.area_m2)
        .sum()
}

/// Price a set of resolved parts
pub fn price(
    parts: &[ResolvedPart],
    rates: &RateSet,
    hardware_cost: f64,
    settings: &GlobalSettings,
) -> Result<CostBreakdown, PricingError> {
    let carcass_area = category_area(parts, PartCategory::Carcass);
    let door_area = category_area(parts, PartCategory::Door);

    let carcass = carcass_area * rates.material_rate_per_sqm;
    let doors = door_area * (rates.finish_rate_per_sqm + rates.door_style_rate_per_sqm);
    let surcharges = door_area * rates.color_surcharge_per_sqm;

    let subtotal = carcass + doors + surcharges + hardware_cost;
    let subtotal_with_wastage = subtotal * (1.0 + settings.wastage_factor());
    let total = subtotal_with_wastage * (1.0 + settings.gst_rate());

    if !total.is_finite() {
        return Err(PricingError::NonFinite);
    }
    if total < 0.0 {
        return Err(PricingError::NegativeTotal { total });
    }

    log::debug!(
        "Priced {} parts: carcass {:.4} door {:.4} hardware {:.4} total {:.4}",
        parts.len(),
        carcass,
        doors + surcharges,
        hardware_cost,
        total
    );

    Ok(CostBreakdown {
        carcass_area_m2: (carcass_area * 1000.0).round() / 1000.0,
        door_area_m2: (door_area * 1000.0).round() / 1000.0,
        carcass: round2(carcass),
        doors: round2(doors),
        surcharges: round2(surcharges),
        hardware: round2(hardware_cost),
        subtotal: round2(subtotal),
        wastage: round2(subtotal_with_wastage - subtotal),
        gst: round2(total - subtotal_with_wastage),
        total: round2(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::CategorySource;

    fn part(name: &str, category: PartCategory, w: f64, h: f64, qty: u32) -> ResolvedPart {
        ResolvedPart {
            name: name.to_string(),
            category,
            category_source: CategorySource::Flag,
            width_mm: w,
            height_mm: h,
            unit_quantity: qty,
            quantity: qty,
            area_m2: (w / 1000.0) * (h / 1000.0) * qty as f64,
            thickness_mm: 18.0,
            density: 13.5,
            weight_multiplier: 1.0,
        }
    }

    fn rates() -> RateSet {
        RateSet {
            material_rate_per_sqm: 45.0,
            finish_rate_per_sqm: 20.0,
            door_style_rate_per_sqm: 30.0,
            color_surcharge_per_sqm: 5.0,
        }
    }

    fn no_adjustments() -> GlobalSettings {
        GlobalSettings::new(0.0, 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_back_panels_worked_example() {
        let parts = vec![part("Back", PartCategory::Carcass, 600.0, 720.0, 2)];
        let cost = price(&parts, &rates(), 0.0, &no_adjustments()).unwrap();

        assert_eq!(cost.carcass, 38.88);
        assert_eq!(cost.total, 38.88);
        assert_eq!(cost.carcass_area_m2, 0.864);
    }

    #[test]
    fn test_door_rate_split() {
        let parts = vec![part("Door", PartCategory::Door, 500.0, 700.0, 2)];
        let cost = price(&parts, &rates(), 0.0, &no_adjustments()).unwrap();

        // 0.7 m² × 50 and 0.7 m² × 5
        assert_eq!(cost.doors, 35.0);
        assert_eq!(cost.surcharges, 3.5);
        assert_eq!(cost.carcass, 0.0);
        assert_eq!(cost.total, 38.5);
    }

    #[test]
    fn test_hardware_parts_are_not_area_priced() {
        let parts = vec![part("Rail", PartCategory::Hardware, 500.0, 50.0, 4)];
        let cost = price(&parts, &rates(), 12.0, &no_adjustments()).unwrap();
        assert_eq!(cost.carcass, 0.0);
        assert_eq!(cost.doors, 0.0);
        assert_eq!(cost.hardware, 12.0);
        assert_eq!(cost.total, 12.0);
    }

    #[test]
    fn test_wastage_then_gst() {
        let parts = vec![part("Side", PartCategory::Carcass, 1000.0, 1000.0, 2)];
        let settings = GlobalSettings::new(0.10, 0.18, 0.0, 0.0).unwrap();
        let cost = price(&parts, &rates(), 10.0, &settings).unwrap();

        // subtotal 100, with wastage 110, with gst 129.80
        assert_eq!(cost.subtotal, 100.0);
        assert_eq!(cost.wastage, 10.0);
        assert_eq!(cost.gst, 19.8);
        assert_eq!(cost.total, 129.8);
    }

    #[test]
    fn test_total_covers_components() {
        let parts = vec![
            part("Side", PartCategory::Carcass, 560.0, 720.0, 2),
            part("Bottom", PartCategory::Carcass, 564.0, 560.0, 1),
            part("Door", PartCategory::Door, 297.0, 716.0, 2),
        ];

        for (wastage, gst) in [(0.0, 0.0), (0.05, 0.0), (0.0, 0.18), (0.1, 0.18), (0.5, 0.28)] {
            let settings = GlobalSettings::new(wastage, gst, 0.0, 0.0).unwrap();
            let cost = price(&parts, &rates(), 37.5, &settings).unwrap();
            assert!(cost.total >= cost.carcass + cost.doors + cost.surcharges + cost.hardware - 0.01);
            assert!(cost.total >= 0.0);
        }
    }

    #[test]
    fn test_negative_total_is_an_error() {
        let parts = vec![part("Back", PartCategory::Carcass, 600.0, 720.0, 1)];
        let err = price(&parts, &rates(), -100.0, &no_adjustments()).unwrap_err();
        assert!(matches!(err, PricingError::NegativeTotal { .. }));
    }

    #[test]
    fn test_empty_parts() {
        let cost = price(&[], &rates(), 0.0, &GlobalSettings::default()).unwrap();
        assert_eq!(cost.total, 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(38.880000000000003), 38.88);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}

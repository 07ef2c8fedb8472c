//! Hardware requirement resolution
//!
//! Converts per-cabinet, per-door and per-drawer hardware rules into unit
//! counts and a cost for a line of `qty` cabinets.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::settings::GlobalSettings;
use crate::entities::hardware::{HardwareRequirement, UnitCostTable, UnitScope};

/// Errors from hardware resolution
#[derive(Debug, Error, PartialEq)]
pub enum HardwareError {
    #[error("hardware '{requirement}': unit count for {cabinets} cabinet(s) is too large")]
    QuantityOverflow { requirement: String, cabinets: u32 },
}

/// Where a hardware unit cost came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Catalog,
    Default,
}

/// One requirement's resolved units and cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareLine {
    pub requirement_id: String,
    pub name: String,
    pub unit_scope: UnitScope,
    pub units: u32,
    pub unit_cost: f64,
    pub cost: f64,
    pub price_source: PriceSource,
}

/// All hardware for a line item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HardwareResolution {
    pub lines: Vec<HardwareLine>,
    /// Σ units × unit cost, before markup and discount
    pub total_cost: f64,
}

impl HardwareResolution {
    /// Units needed, keyed by requirement id
    pub fn units_by_requirement(&self) -> BTreeMap<String, u64> {
        let mut units = BTreeMap::new();
        for line in &self.lines {
            *units.entry(line.requirement_id.clone()).or_insert(0) += u64::from(line.units);
        }
        units
    }

    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.units)).sum()
    }

    /// Cost after the configured hardware markup and discount
    pub fn adjusted_cost(&self, settings: &GlobalSettings) -> f64 {
        settings.adjust_hardware_cost(self.total_cost)
    }
}

/// How many scope units a requirement counts per cabinet
pub fn scope_count(scope: UnitScope, door_count: u32, drawer_count: u32) -> u32 {
    match scope {
        UnitScope::PerCabinet | UnitScope::Custom => 1,
        UnitScope::PerDoor => door_count,
        UnitScope::PerDrawer => drawer_count,
    }
}

/// Resolve hardware requirements for `qty` cabinets
///
/// Unit costs come from `catalog` by requirement id; requirements missing
/// from it (or every requirement when there is no catalog) are priced at
/// `fallback_unit_cost`.
pub fn resolve_hardware(
    requirements: &[HardwareRequirement],
    door_count: u32,
    drawer_count: u32,
    qty: u32,
    catalog: Option<&UnitCostTable>,
    fallback_unit_cost: f64,
) -> Result<HardwareResolution, HardwareError> {
    let mut resolution = HardwareResolution::default();

    for req in requirements {
        let units = req
            .units_per_scope
            .checked_mul(scope_count(req.unit_scope, door_count, drawer_count))
            .and_then(|n| n.checked_mul(qty))
            .ok_or_else(|| HardwareError::QuantityOverflow {
                requirement: req.id.clone(),
                cabinets: qty,
            })?;

        let (unit_cost, price_source) = match catalog.and_then(|c| c.get(&req.id)) {
            Some(cost) => (*cost, PriceSource::Catalog),
            None => {
                log::warn!(
                    "No catalog price for hardware '{}', using default {:.2}",
                    req.id,
                    fallback_unit_cost
                );
                (fallback_unit_cost, PriceSource::Default)
            }
        };

        let cost = units as f64 * unit_cost;
        resolution.total_cost += cost;
        resolution.lines.push(HardwareLine {
            requirement_id: req.id.clone(),
            name: if req.name.is_empty() {
                req.id.clone()
            } else {
                req.name.clone()
            },
            unit_scope: req.unit_scope,
            units,
            unit_cost,
            cost,
            price_source,
        });
    }

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, f64)]) -> UnitCostTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_per_door_units() {
        let reqs = vec![HardwareRequirement::new("hinge", UnitScope::PerDoor, 2)];
        let res = resolve_hardware(&reqs, 2, 0, 3, None, 5.0).unwrap();
        assert_eq!(res.lines[0].units, 12);
        assert_eq!(res.units_by_requirement()["hinge"], 12);
    }

    #[test]
    fn test_unit_overflow_is_an_error() {
        let reqs = vec![HardwareRequirement::new("hinge", UnitScope::PerDoor, 70_000)];
        let err = resolve_hardware(&reqs, 2, 0, 70_000, None, 5.0).unwrap_err();
        assert_eq!(
            err,
            HardwareError::QuantityOverflow {
                requirement: "hinge".to_string(),
                cabinets: 70_000,
            }
        );
    }

    #[test]
    fn test_scope_counts() {
        assert_eq!(scope_count(UnitScope::PerCabinet, 2, 3), 1);
        assert_eq!(scope_count(UnitScope::Custom, 2, 3), 1);
        assert_eq!(scope_count(UnitScope::PerDoor, 2, 3), 2);
        assert_eq!(scope_count(UnitScope::PerDrawer, 2, 3), 3);
    }

    #[test]
    fn test_catalog_and_fallback_pricing() {
        let reqs = vec![
            HardwareRequirement::new("hinge", UnitScope::PerDoor, 2),
            HardwareRequirement::new("runner", UnitScope::PerDrawer, 1),
            HardwareRequirement::new("leg", UnitScope::PerCabinet, 4),
        ];
        let catalog = table(&[("hinge", 4.5), ("runner", 22.0)]);

        let res = resolve_hardware(&reqs, 2, 3, 1, Some(&catalog), 1.25).unwrap();

        assert_eq!(res.lines[0].cost, 18.0);
        assert_eq!(res.lines[0].price_source, PriceSource::Catalog);
        assert_eq!(res.lines[1].cost, 66.0);
        assert_eq!(res.lines[2].units, 4);
        assert_eq!(res.lines[2].unit_cost, 1.25);
        assert_eq!(res.lines[2].price_source, PriceSource::Default);
        assert!((res.total_cost - 89.0).abs() < 1e-9);
        assert_eq!(res.total_units(), 11);
    }

    #[test]
    fn test_no_doors_means_no_hinges() {
        let reqs = vec![HardwareRequirement::new("hinge", UnitScope::PerDoor, 2)];
        let res = resolve_hardware(&reqs, 0, 0, 5, None, 5.0).unwrap();
        assert_eq!(res.lines[0].units, 0);
        assert_eq!(res.total_cost, 0.0);
    }

    #[test]
    fn test_adjusted_cost() {
        let reqs = vec![HardwareRequirement::new("handle", UnitScope::PerCabinet, 1)];
        let res = resolve_hardware(&reqs, 0, 0, 10, Some(&table(&[("handle", 10.0)])), 0.0).unwrap();
        let settings = GlobalSettings::new(0.0, 0.0, 50.0, 20.0).unwrap();
        // 100 * 1.5 * 0.8
        assert!((res.adjusted_cost(&settings) - 120.0).abs() < 1e-9);
    }
}

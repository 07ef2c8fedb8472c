//! Sheet nesting estimate for packaging
//!
//! A single greedy pass over part instances in input order: each instance
//! goes on the current sheet until the sheet's used area would exceed
//! `target_efficiency` of the sheet area, then a new sheet is started.
//! Instances are deliberately not sorted by size. This estimates sheet count,
//! stack height and weight for shipping; it does not produce cut layouts.
//!
//! Parts larger than the sheet (and hardware parts) are excluded from the
//! plan with a recorded reason. Exclusion only affects packaging; those parts
//! are still priced and weighed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::{
    DEFAULT_PACKAGE_PADDING_KG, DEFAULT_PACKAGE_PADDING_MM, DEFAULT_SHEET_HEIGHT_MM,
    DEFAULT_SHEET_WIDTH_MM, DEFAULT_TARGET_EFFICIENCY,
};
use crate::core::resolver::{PartCategory, ResolvedPart};

/// Errors from nesting
#[derive(Debug, Error, PartialEq)]
pub enum NestingError {
    #[error("sheet size must be positive (got {width_mm} x {height_mm} mm)")]
    InvalidSheet { width_mm: f64, height_mm: f64 },

    #[error("target efficiency must be in (0, 1] (got {0})")]
    InvalidEfficiency(f64),
}

/// Stock sheet size and fill target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Fraction of the sheet area filled before starting a new sheet
    pub target_efficiency: f64,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            width_mm: DEFAULT_SHEET_WIDTH_MM,
            height_mm: DEFAULT_SHEET_HEIGHT_MM,
            target_efficiency: DEFAULT_TARGET_EFFICIENCY,
        }
    }
}

impl SheetSpec {
    pub fn area_m2(&self) -> f64 {
        (self.width_mm / 1000.0) * (self.height_mm / 1000.0)
    }

    pub fn validate(&self) -> Result<(), NestingError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(positive(self.width_mm) && positive(self.height_mm)) {
            return Err(NestingError::InvalidSheet {
                width_mm: self.width_mm,
                height_mm: self.height_mm,
            });
        }
        if !(self.target_efficiency > 0.0 && self.target_efficiency <= 1.0) {
            return Err(NestingError::InvalidEfficiency(self.target_efficiency));
        }
        Ok(())
    }

    fn fits(&self, part: &ResolvedPart) -> bool {
        part.width_mm <= self.width_mm && part.height_mm <= self.height_mm
    }
}

/// Allowance added to every shipping package
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackagePadding {
    pub height_mm: f64,
    pub weight_kg: f64,
}

impl Default for PackagePadding {
    fn default() -> Self {
        Self {
            height_mm: DEFAULT_PACKAGE_PADDING_MM,
            weight_kg: DEFAULT_PACKAGE_PADDING_KG,
        }
    }
}

/// One part instance placed on a sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPart {
    /// Index of the line item the part belongs to
    pub line: usize,
    pub name: String,
    pub category: PartCategory,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    pub area_m2: f64,
}

/// A filled stock sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    /// 1-based
    pub sheet_number: usize,
    pub parts: Vec<PlacedPart>,
    pub area_used_m2: f64,
    /// `area_used_m2 / sheet area`
    pub efficiency: f64,
    /// Thickest part on the sheet; parts are stacked, not summed
    pub stack_height_mm: f64,
    pub total_weight_kg: f64,
}

impl SheetLayout {
    fn new(sheet_number: usize) -> Self {
        Self {
            sheet_number,
            parts: Vec::new(),
            area_used_m2: 0.0,
            efficiency: 0.0,
            stack_height_mm: 0.0,
            total_weight_kg: 0.0,
        }
    }

    pub fn efficiency_pct(&self) -> f64 {
        self.efficiency * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Why parts were left out of the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Wider or taller than the stock sheet
    ExceedsSheet,
    /// Hardware is shipped separately, not on sheets
    NotSheetGoods,
    /// Width or height resolved to 0
    ZeroArea,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::ExceedsSheet => write!(f, "exceeds sheet"),
            ExclusionReason::NotSheetGoods => write!(f, "not sheet goods"),
            ExclusionReason::ZeroArea => write!(f, "zero area"),
        }
    }
}

/// Diagnostic for excluded part instances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedPart {
    pub line: usize,
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Number of instances excluded
    pub quantity: u32,
    pub reason: ExclusionReason,
}

/// Logistics package for one sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingPackage {
    pub package_number: usize,
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub weight_kg: f64,
    pub part_count: usize,
}

/// Result of nesting: sheets in order plus exclusion diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestingPlan {
    pub sheet: SheetSpec,
    pub sheets: Vec<SheetLayout>,
    pub excluded: Vec<ExcludedPart>,
}

impl NestingPlan {
    /// Instances placed on any sheet
    pub fn placed_instances(&self) -> usize {
        self.sheets.iter().map(|s| s.parts.len()).sum()
    }

    /// Instances left out of the plan
    pub fn excluded_instances(&self) -> u32 {
        self.excluded.iter().map(|e| e.quantity).sum()
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.sheets.iter().map(|s| s.total_weight_kg).sum()
    }

    /// One package per sheet, padded for protection
    pub fn packages(&self, padding: &PackagePadding) -> Vec<ShippingPackage> {
        self.sheets
            .iter()
            .map(|s| ShippingPackage {
                package_number: s.sheet_number,
                length_mm: self.sheet.width_mm,
                width_mm: self.sheet.height_mm,
                height_mm: s.stack_height_mm + padding.height_mm,
                weight_kg: s.total_weight_kg + padding.weight_kg,
                part_count: s.parts.len(),
            })
            .collect()
    }
}

/// Nest the parts of a single line
pub fn nest(parts: &[ResolvedPart], sheet: &SheetSpec) -> Result<NestingPlan, NestingError> {
    nest_tagged(parts.iter().map(|p| (0, p)), sheet)
}

/// Nest several lines' parts, line by line in order
pub fn nest_lines(
    lines: &[&[ResolvedPart]],
    sheet: &SheetSpec,
) -> Result<NestingPlan, NestingError> {
    nest_tagged(
        lines
            .iter()
            .enumerate()
            .flat_map(|(i, parts)| parts.iter().map(move |p| (i, p))),
        sheet,
    )
}

fn nest_tagged<'a>(
    parts: impl IntoIterator<Item = (usize, &'a ResolvedPart)>,
    sheet: &SheetSpec,
) -> Result<NestingPlan, NestingError> {
    sheet.validate()?;

    let sheet_area = sheet.area_m2();
    let threshold = sheet_area * sheet.target_efficiency;

    let mut sheets = Vec::new();
    let mut excluded = Vec::new();
    let mut current = SheetLayout::new(1);

    let close = |layout: &mut SheetLayout| {
        layout.efficiency = layout.area_used_m2 / sheet_area;
        log::debug!(
            "Closed sheet {} with {} parts at {:.1}%",
            layout.sheet_number,
            layout.parts.len(),
            layout.efficiency_pct()
        );
    };

    for (line, part) in parts {
        if part.quantity == 0 {
            continue;
        }

        let reason = if part.category == PartCategory::Hardware {
            Some(ExclusionReason::NotSheetGoods)
        } else if part.instance_area_m2() <= 0.0 {
            Some(ExclusionReason::ZeroArea)
        } else if !sheet.fits(part) {
            Some(ExclusionReason::ExceedsSheet)
        } else {
            None
        };

        if let Some(reason) = reason {
            match reason {
                ExclusionReason::ExceedsSheet => log::warn!(
                    "Part '{}' ({} x {} mm) does not fit a {} x {} mm sheet; excluded from nesting",
                    part.name,
                    part.width_mm,
                    part.height_mm,
                    sheet.width_mm,
                    sheet.height_mm
                ),
                ExclusionReason::ZeroArea => log::warn!(
                    "Part '{}' resolved to {} x {} mm; excluded from nesting",
                    part.name,
                    part.width_mm,
                    part.height_mm
                ),
                ExclusionReason::NotSheetGoods => {}
            }
            excluded.push(ExcludedPart {
                line,
                name: part.name.clone(),
                width_mm: part.width_mm,
                height_mm: part.height_mm,
                quantity: part.quantity,
                reason,
            });
            continue;
        }

        let area = part.instance_area_m2();
        let weight = area * part.areal_weight();
        for _ in 0..part.quantity {
            if !current.is_empty() && current.area_used_m2 + area > threshold {
                let next = SheetLayout::new(current.sheet_number + 1);
                let mut full = std::mem::replace(&mut current, next);
                close(&mut full);
                sheets.push(full);
            }

            current.parts.push(PlacedPart {
                line,
                name: part.name.clone(),
                category: part.category,
                width_mm: part.width_mm,
                height_mm: part.height_mm,
                thickness_mm: part.thickness_mm,
                area_m2: area,
            });
            current.area_used_m2 += area;
            current.stack_height_mm = current.stack_height_mm.max(part.thickness_mm);
            current.total_weight_kg += weight;
        }
    }

    if !current.is_empty() {
        close(&mut current);
        sheets.push(current);
    }

    Ok(NestingPlan {
        sheet: *sheet,
        sheets,
        excluded,
    })
}

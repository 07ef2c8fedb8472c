//! Core module - the estimating engine and project plumbing
//!
//! The calculators run in this order for each line item: [`resolver`] turns
//! part formulas into sized, categorized parts; [`hardware`] counts and
//! prices hardware; [`pricing`] and [`weight`] produce the breakdowns; and
//! [`nesting`] packs all parts of a job onto stock sheets for shipping.
//! [`estimate`] wires them together.

pub mod config;
pub mod estimate;
pub mod export;
pub mod formula;
pub mod hardware;
pub mod loader;
pub mod nesting;
pub mod pricing;
pub mod project;
pub mod resolver;
pub mod settings;
pub mod weight;

pub use config::Config;
pub use estimate::{Catalog, EstimateError, Estimator, JobEstimate, LineEstimate};
pub use formula::{evaluate, try_evaluate, Formula, FormulaError};
pub use hardware::{resolve_hardware, HardwareResolution};
pub use loader::CatalogError;
pub use nesting::{nest, NestingError, NestingPlan, SheetLayout, SheetSpec, ShippingPackage};
pub use pricing::{price, CostBreakdown, PricingError};
pub use project::{Project, ProjectError};
pub use resolver::{resolve, FormulaMode, PartCategory, ResolveError, ResolvedPart};
pub use settings::{EstimatorSettings, GlobalSettings, SettingsError};
pub use weight::{weigh, WeightBreakdown, WeightError};

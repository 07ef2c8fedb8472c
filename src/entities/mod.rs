//! Entity type definitions
//!
//! Reference data supplied by the catalog project and the job being quoted:
//!
//! - [`CabinetType`] - parametric cabinet with its [`Part`]s and hardware
//! - [`HardwareRequirement`] / [`HardwareCatalog`] - hardware rules and brand unit costs
//! - [`RateCatalog`] / [`RateSet`] - per-m² material, finish, door style and color rates
//! - [`Job`] / [`LineItem`] - the configured cabinets to estimate

pub mod cabinet;
pub mod hardware;
pub mod job;
pub mod rates;

pub use cabinet::{CabinetCategory, CabinetType, Dimensions, Part};
pub use hardware::{HardwareCatalog, HardwareRequirement, UnitScope};
pub use job::{Job, LineItem, Selection};
pub use rates::{DoorStyle, RateCatalog, RateSet};

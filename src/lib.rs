//! cabest: cabinet cost, weight and sheet-nesting estimator
//!
//! Prices and weighs parametric kitchen cabinets from part formulas and a
//! rate catalog, and estimates how many stock sheets a job ships on.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;

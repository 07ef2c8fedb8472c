//! CLI command implementations

pub mod completions;
pub mod eval;
pub mod export;
pub mod init;
pub mod nest;
pub mod price;
pub mod resolve;
pub mod weigh;

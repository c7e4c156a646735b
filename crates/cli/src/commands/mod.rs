//! CLI command implementations.

pub mod kiosks;
pub mod products;
pub mod table;

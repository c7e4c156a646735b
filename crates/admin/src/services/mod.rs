//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `products` - Product catalogue, stock and visibility mutations
//! - `kiosks` - Kiosk list and CRUD

pub mod kiosks;
pub mod products;

pub use kiosks::KioskService;
pub use products::ProductService;

//! Kiosk Admin Core - Shared types library.
//!
//! This crate provides the types and pure logic used across the kiosk admin
//! components:
//! - `admin` - HTTP store client, product cache, services and view state
//! - `cli` - Command-line front end for staff
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here can be tested synchronously.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, products, kiosks and form drafts
//! - [`sort`] - Multi-criterion product ordering and the toggle rules
//! - [`columns`] - Per-table column widths and the paired resize rule

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod columns;
pub mod sort;
pub mod types;

pub use columns::{ColumnWidths, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH};
pub use sort::{
    SortConfiguration, SortCriterion, SortDirection, SortEngine, SortError, SortField,
};
pub use types::*;

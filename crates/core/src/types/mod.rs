//! Core types for the kiosk admin.
//!
//! This module provides type-safe wrappers and records for the domain
//! concepts the admin API exchanges.

pub mod draft;
pub mod id;
pub mod kiosk;
pub mod product;

pub use draft::{KioskDraft, MAX_NAME_LENGTH, ProductDraft, ValidationError, ValidationErrors};
pub use id::*;
pub use kiosk::Kiosk;
pub use product::{Product, VisibilityTier};

//! Product records as served by the admin API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product in the catalogue, optionally scoped to a kiosk.
///
/// `active` and `quantity_in_stock` only carry meaning when the product was
/// loaded through a kiosk's inventory endpoint. The global product list
/// omits the quantity, which deserializes to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility flag for the selected kiosk.
    #[serde(default, alias = "isActive", alias = "visible")]
    pub active: bool,
    #[serde(default)]
    pub quantity_in_stock: u32,
    /// Image reference (URL or upload path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Whether customers at the kiosk can see this product.
    ///
    /// The active flag alone is never enough: a product without stock is
    /// hidden regardless.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.active && self.is_in_stock()
    }

    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.quantity_in_stock > 0
    }

    /// Three-level visibility priority used by the default ordering and by
    /// the `visibility` sort field.
    #[must_use]
    pub const fn visibility_tier(&self) -> VisibilityTier {
        if !self.is_in_stock() {
            VisibilityTier::OutOfStock
        } else if self.active {
            VisibilityTier::Visible
        } else {
            VisibilityTier::Hidden
        }
    }
}

/// Visibility priority of a product at a kiosk, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityTier {
    /// Active and in stock.
    Visible = 0,
    /// In stock but switched off for the kiosk.
    Hidden = 1,
    /// No stock, whatever the active flag says.
    OutOfStock = 2,
}

impl VisibilityTier {
    /// Numeric priority (0, 1 or 2).
    #[must_use]
    pub const fn priority(self) -> u8 {
        self as u8
    }

    /// Short label for tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::OutOfStock => "out of stock",
        }
    }
}

impl std::fmt::Display for VisibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

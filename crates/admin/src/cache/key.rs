//! Cache keys: which product collection a table shows.

use std::fmt;
use std::str::FromStr;

use kiosk_admin_core::KioskId;
use serde::{Deserialize, Serialize};

/// Which product collection a table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Global catalogue.
    #[default]
    Products,
    /// One kiosk's stock levels and visibility.
    Inventory,
}

impl Section {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "inventory" => Ok(Self::Inventory),
            _ => Err(format!("invalid section: {s}")),
        }
    }
}

/// `(kiosk, section)` pair identifying one cached product list.
///
/// The inventory section always carries a kiosk; the catalogue may carry the
/// selected kiosk too, so that switching kiosks yields a distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    kiosk: Option<KioskId>,
    section: Section,
}

impl CacheKey {
    /// Key for the global catalogue.
    #[must_use]
    pub const fn products(kiosk: Option<KioskId>) -> Self {
        Self {
            kiosk,
            section: Section::Products,
        }
    }

    /// Key for one kiosk's inventory.
    #[must_use]
    pub const fn inventory(kiosk: KioskId) -> Self {
        Self {
            kiosk: Some(kiosk),
            section: Section::Inventory,
        }
    }

    /// Build a key from parts.
    ///
    /// Returns `None` for the inventory section without a kiosk.
    #[must_use]
    pub const fn new(kiosk: Option<KioskId>, section: Section) -> Option<Self> {
        match (section, kiosk) {
            (Section::Inventory, None) => None,
            _ => Some(Self { kiosk, section }),
        }
    }

    #[must_use]
    pub const fn kiosk(&self) -> Option<KioskId> {
        self.kiosk
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kiosk {
            Some(kiosk) => write!(f, "{}@{kiosk}", self.section),
            None => write!(f, "{}", self.section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_requires_kiosk() {
        assert!(CacheKey::new(None, Section::Inventory).is_none());
        assert_eq!(
            CacheKey::new(Some(KioskId::new(3)), Section::Inventory),
            Some(CacheKey::inventory(KioskId::new(3)))
        );
        assert_eq!(
            CacheKey::new(None, Section::Products),
            Some(CacheKey::products(None))
        );
    }

    #[test]
    fn test_keys_differ_per_kiosk() {
        assert_ne!(
            CacheKey::inventory(KioskId::new(1)),
            CacheKey::inventory(KioskId::new(2))
        );
        assert_ne!(
            CacheKey::products(Some(KioskId::new(1))),
            CacheKey::inventory(KioskId::new(1))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKey::inventory(KioskId::new(4)).to_string(), "inventory@4");
        assert_eq!(CacheKey::products(None).to_string(), "products");
    }
}

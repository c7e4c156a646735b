//! Kiosk (point-of-sale location) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::KioskId;

/// A physical point-of-sale location with its own inventory.
///
/// Kiosks are never removed: deleting one through the API flips
/// `is_active` to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kiosk {
    pub id: KioskId,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

impl Kiosk {
    /// Label used in kiosk pickers, e.g. `Lobby (Main Station)`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.location.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.location)
        }
    }
}

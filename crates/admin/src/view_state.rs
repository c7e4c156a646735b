//! Per-kiosk table state: sort criteria and column widths.
//!
//! Every kiosk (and the catalogue view with no kiosk selected) has its own
//! [`KioskView`], created on first selection. Switching kiosks parks the
//! current view and restores or creates the other one; nothing carries over.
//! State lives for the session only.

use std::collections::HashMap;
use std::sync::Arc;

use kiosk_admin_core::{ColumnWidths, KioskId, Product, SortConfiguration, SortEngine, SortField};
use tracing::debug;

/// Table state of one kiosk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KioskView {
    pub sort: SortConfiguration,
    pub widths: ColumnWidths,
}

/// Routes sort clicks and column drags to the active kiosk's view.
#[derive(Debug)]
pub struct ViewState {
    engine: Arc<SortEngine>,
    active: Option<KioskId>,
    current: KioskView,
    parked: HashMap<Option<KioskId>, KioskView>,
}

impl ViewState {
    /// Start on the catalogue view with no kiosk selected.
    #[must_use]
    pub fn new(engine: Arc<SortEngine>) -> Self {
        Self {
            engine,
            active: None,
            current: KioskView::default(),
            parked: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn active_kiosk(&self) -> Option<KioskId> {
        self.active
    }

    /// Make `kiosk` the active one. Returns `false` if it already was.
    pub fn select_kiosk(&mut self, kiosk: Option<KioskId>) -> bool {
        if kiosk == self.active {
            return false;
        }
        let next = self.parked.remove(&kiosk).unwrap_or_default();
        let previous = std::mem::replace(&mut self.current, next);
        self.parked.insert(self.active, previous);
        debug!(from = ?self.active, to = ?kiosk, "Switched table view");
        self.active = kiosk;
        true
    }

    #[must_use]
    pub const fn view(&self) -> &KioskView {
        &self.current
    }

    #[must_use]
    pub const fn sort(&self) -> &SortConfiguration {
        &self.current.sort
    }

    #[must_use]
    pub const fn widths(&self) -> &ColumnWidths {
        &self.current.widths
    }

    /// Column header click: add the field ascending, or flip its direction.
    pub fn set_sort(&mut self, field: SortField) {
        self.current.sort.toggle(field);
        debug!(kiosk = ?self.active, sort = %self.current.sort, "Sort changed");
    }

    /// Replace the active kiosk's criteria wholesale.
    pub fn replace_sort(&mut self, sort: SortConfiguration) {
        self.current.sort = sort;
    }

    /// Drop all criteria, back to the default ordering.
    pub fn reset_sort(&mut self) {
        self.current.sort.clear();
    }

    /// Returns `false` if `field` was not a criterion.
    pub fn remove_sort_criterion(&mut self, field: SortField) -> bool {
        self.current.sort.remove(field)
    }

    /// Column border drag; see [`ColumnWidths::resize`].
    pub fn resize_column(&mut self, field: SortField, new_width: u32) {
        self.current.widths.resize(field, new_width);
    }

    /// Products in display order for the active kiosk.
    #[must_use]
    pub fn order(&self, products: &[Product]) -> Vec<Product> {
        self.engine.order(products, &self.current.sort)
    }
}

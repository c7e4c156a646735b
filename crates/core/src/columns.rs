//! Column widths for the product and inventory tables.
//!
//! Widths are pixel values clamped to `[MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH]`.
//! Dragging a column border moves width between that column and its right
//! neighbour, so the pair keeps its combined width unless one of them hits a
//! bound.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sort::SortField;

/// Narrowest allowed column, in pixels.
pub const MIN_COLUMN_WIDTH: u32 = 80;
/// Widest allowed column, in pixels.
pub const MAX_COLUMN_WIDTH: u32 = 500;

const fn clamp_width(width: i64) -> u32 {
    if width < MIN_COLUMN_WIDTH as i64 {
        MIN_COLUMN_WIDTH
    } else if width > MAX_COLUMN_WIDTH as i64 {
        MAX_COLUMN_WIDTH
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let width = width as u32;
        width
    }
}

const fn default_width(field: SortField) -> u32 {
    match field {
        SortField::Name => 300,
        SortField::Price => 120,
        SortField::Quantity | SortField::Visibility => 150,
    }
}

/// Field → width mapping for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWidths {
    widths: BTreeMap<SortField, u32>,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            widths: SortField::ALL
                .into_iter()
                .map(|f| (f, default_width(f)))
                .collect(),
        }
    }
}

impl ColumnWidths {
    /// Current width of a column.
    #[must_use]
    pub fn width(&self, field: SortField) -> u32 {
        self.widths
            .get(&field)
            .copied()
            .unwrap_or_else(|| default_width(field))
    }

    /// Set a single width, clamped, without touching the neighbour.
    pub fn set(&mut self, field: SortField, width: u32) {
        self.widths.insert(field, clamp_width(i64::from(width)));
    }

    /// Sum of all column widths.
    #[must_use]
    pub fn total(&self) -> u32 {
        SortField::ALL.iter().map(|f| self.width(*f)).sum()
    }

    /// Drag `field`'s right border so the column becomes `new_width` pixels.
    ///
    /// The applied change (after clamping) is taken from the next column in
    /// the fixed order, which is clamped too. The last column has no
    /// neighbour and only clamps.
    pub fn resize(&mut self, field: SortField, new_width: u32) {
        let old = self.width(field);
        let applied = clamp_width(i64::from(new_width));
        self.widths.insert(field, applied);

        if let Some(next) = field.next() {
            let delta = i64::from(applied) - i64::from(old);
            let next_width = clamp_width(i64::from(self.width(next)) - delta);
            self.widths.insert(next, next_width);
        }
    }
}

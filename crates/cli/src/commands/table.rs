//! Plain-text tables.
//!
//! Column widths come from the view state in pixels; one character is
//! rendered per ten pixels.

use std::fmt::Write as _;

use kiosk_admin_core::{ColumnWidths, Kiosk, Product, SortConfiguration, SortField};

const PIXELS_PER_CHAR: u32 = 10;
const ID_WIDTH: usize = 6;

fn chars(widths: &ColumnWidths, field: SortField) -> usize {
    usize::try_from(widths.width(field) / PIXELS_PER_CHAR).unwrap_or(usize::MAX)
}

/// Cut `text` to `width` characters, marking the cut with `~`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn header(field: SortField, sort: &SortConfiguration) -> String {
    let title = match field {
        SortField::Name => "Name",
        SortField::Price => "Price",
        SortField::Quantity => "Qty",
        SortField::Visibility => "Visibility",
    };
    match sort.get(field) {
        Some(c) if sort.len() > 1 => format!("{title} {}{}", arrow(c.direction), c.priority + 1),
        Some(c) => format!("{title} {}", arrow(c.direction)),
        None => title.to_string(),
    }
}

const fn arrow(direction: kiosk_admin_core::SortDirection) -> &'static str {
    match direction {
        kiosk_admin_core::SortDirection::Ascending => "^",
        kiosk_admin_core::SortDirection::Descending => "v",
    }
}

/// Render already-ordered products.
pub fn products(rows: &[Product], widths: &ColumnWidths, sort: &SortConfiguration) -> String {
    let name_w = chars(widths, SortField::Name);
    let price_w = chars(widths, SortField::Price);
    let qty_w = chars(widths, SortField::Quantity);
    let vis_w = chars(widths, SortField::Visibility);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>ID_WIDTH$}  {:<name_w$}  {:>price_w$}  {:>qty_w$}  {:<vis_w$}",
        "ID",
        fit(&header(SortField::Name, sort), name_w),
        fit(&header(SortField::Price, sort), price_w),
        fit(&header(SortField::Quantity, sort), qty_w),
        fit(&header(SortField::Visibility, sort), vis_w),
    );
    for p in rows {
        let _ = writeln!(
            out,
            "{:>ID_WIDTH$}  {:<name_w$}  {:>price_w$}  {:>qty_w$}  {:<vis_w$}",
            p.id,
            fit(&p.name, name_w),
            fit(&format!("{:.2}", p.price), price_w),
            p.quantity_in_stock,
            fit(p.visibility_tier().label(), vis_w),
        );
    }
    out
}

pub fn kiosks(kiosks: &[Kiosk]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>ID_WIDTH$}  {:<30}  {:<30}  Status", "ID", "Name", "Location");
    for k in kiosks {
        let _ = writeln!(
            out,
            "{:>ID_WIDTH$}  {:<30}  {:<30}  {}",
            k.id,
            fit(&k.name, 30),
            fit(&k.location, 30),
            if k.is_active { "active" } else { "inactive" },
        );
    }
    out
}

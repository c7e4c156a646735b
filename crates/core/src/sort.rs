//! Multi-criterion ordering for the product and inventory tables.
//!
//! A [`SortConfiguration`] is an ordered list of [`SortCriterion`] values with
//! contiguous priorities starting at 0. [`SortEngine::order`] turns a product
//! list and a configuration into a deterministic total order:
//!
//! - With no criteria the **default ordering** applies: visibility tier
//!   (visible, hidden, out of stock), then name.
//! - Otherwise criteria are compared in priority order and the first
//!   non-equal one decides.
//! - Whatever is still tied is ordered by ascending product id.
//!
//! Names compare with Czech collation at secondary strength, so case is
//! ignored, accents matter, `č` sorts after `c` and `ch` after `h`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Errors raised while building a sort engine or configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// Collation data for the locale could not be loaded.
    #[error("collator unavailable: {0}")]
    Collator(String),
    /// Unknown sortable field name.
    #[error("unknown sort field: {0}")]
    UnknownField(String),
    /// Unknown direction name.
    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),
    /// The same field appears twice in one configuration.
    #[error("duplicate sort field: {0}")]
    DuplicateField(SortField),
    /// Priorities are not unique and contiguous from 0.
    #[error("sort priorities must be contiguous from 0")]
    NonContiguousPriority,
}

/// A sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Price,
    Quantity,
    Visibility,
}

impl SortField {
    /// All fields in their fixed left-to-right column order.
    pub const ALL: [Self; 4] = [Self::Name, Self::Price, Self::Quantity, Self::Visibility];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::Visibility => "visibility",
        }
    }

    /// The column immediately to the right, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Name => Some(Self::Price),
            Self::Price => Some(Self::Quantity),
            Self::Quantity => Some(Self::Visibility),
            Self::Visibility => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "quantity" | "qty" | "stock" => Ok(Self::Quantity),
            "visibility" | "visible" => Ok(Self::Visibility),
            other => Err(SortError::UnknownField(other.to_string())),
        }
    }
}

/// Sort direction for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Apply the direction to an ascending comparison.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(SortError::UnknownDirection(other.to_string())),
        }
    }
}

/// One (field, direction, priority) entry. Lower priority wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: SortField,
    pub direction: SortDirection,
    pub priority: usize,
}

/// Ordered set of sort criteria for one table.
///
/// Criteria are kept in priority order and `criteria[i].priority == i`
/// holds after every operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SortCriterion>", into = "Vec<SortCriterion>")]
pub struct SortConfiguration {
    criteria: Vec<SortCriterion>,
}

impl SortConfiguration {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Build a configuration from criteria in any order.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::DuplicateField`] if a field repeats and
    /// [`SortError::NonContiguousPriority`] unless the priorities are exactly
    /// `0..n`.
    pub fn from_criteria(mut criteria: Vec<SortCriterion>) -> Result<Self, SortError> {
        criteria.sort_by_key(|c| c.priority);
        for (index, criterion) in criteria.iter().enumerate() {
            if criterion.priority != index {
                return Err(SortError::NonContiguousPriority);
            }
            if criteria
                .iter()
                .take(index)
                .any(|c| c.field == criterion.field)
            {
                return Err(SortError::DuplicateField(criterion.field));
            }
        }
        Ok(Self { criteria })
    }

    /// Criteria in ascending priority order.
    #[must_use]
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.criteria.len()
    }

    #[must_use]
    pub fn get(&self, field: SortField) -> Option<&SortCriterion> {
        self.criteria.iter().find(|c| c.field == field)
    }

    /// Click-to-sort on a column header.
    ///
    /// A field that is not yet a criterion is appended ascending with the
    /// next priority. A field already present flips its direction and keeps
    /// its priority.
    pub fn toggle(&mut self, field: SortField) {
        if let Some(criterion) = self.criteria.iter_mut().find(|c| c.field == field) {
            criterion.direction = criterion.direction.toggled();
            return;
        }
        self.criteria.push(SortCriterion {
            field,
            direction: SortDirection::Ascending,
            priority: self.criteria.len(),
        });
    }

    /// Remove a field's criterion and renumber the rest from 0.
    ///
    /// Returns `false` if the field was not a criterion.
    pub fn remove(&mut self, field: SortField) -> bool {
        let before = self.criteria.len();
        self.criteria.retain(|c| c.field != field);
        if self.criteria.len() == before {
            return false;
        }
        for (priority, criterion) in self.criteria.iter_mut().enumerate() {
            criterion.priority = priority;
        }
        true
    }

    /// Drop all criteria, returning to the default ordering.
    pub fn clear(&mut self) {
        self.criteria.clear();
    }
}

impl TryFrom<Vec<SortCriterion>> for SortConfiguration {
    type Error = SortError;

    fn try_from(criteria: Vec<SortCriterion>) -> Result<Self, Self::Error> {
        Self::from_criteria(criteria)
    }
}

impl From<SortConfiguration> for Vec<SortCriterion> {
    fn from(config: SortConfiguration) -> Self {
        config.criteria
    }
}

/// Parses `name:asc,price:desc`. A bare field means ascending.
impl FromStr for SortConfiguration {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut criteria = Vec::new();
        for (priority, part) in s.split(',').filter(|p| !p.trim().is_empty()).enumerate() {
            let (field, direction) = match part.split_once(':') {
                Some((field, direction)) => (field.parse()?, direction.parse()?),
                None => (part.parse()?, SortDirection::Ascending),
            };
            criteria.push(SortCriterion {
                field,
                direction,
                priority,
            });
        }
        Self::from_criteria(criteria)
    }
}

impl fmt::Display for SortConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", c.field, c.direction)?;
        }
        Ok(())
    }
}

/// Orders products for display.
pub struct SortEngine {
    collator: Collator,
}

impl fmt::Debug for SortEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortEngine")
            .field("locale", &"cs")
            .finish_non_exhaustive()
    }
}

impl SortEngine {
    /// Build an engine that compares names with Czech collation.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::Collator`] if the collation data cannot be
    /// loaded.
    pub fn czech() -> Result<Self, SortError> {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        let collator = Collator::try_new(&locale!("cs").into(), options)
            .map_err(|e| SortError::Collator(e.to_string()))?;
        Ok(Self { collator })
    }

    /// Return the products in display order. The input is left untouched.
    #[must_use]
    pub fn order(&self, products: &[Product], config: &SortConfiguration) -> Vec<Product> {
        let mut ordered = products.to_vec();
        ordered.sort_by(|a, b| self.compare(a, b, config));
        ordered
    }

    /// Total comparator behind [`Self::order`].
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product, config: &SortConfiguration) -> Ordering {
        let primary = if config.is_empty() {
            self.compare_default(a, b)
        } else {
            config
                .criteria()
                .iter()
                .map(|c| c.direction.apply(self.compare_field(c.field, a, b)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Locale-aware name comparison.
    #[must_use]
    pub fn compare_names(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }

    fn compare_default(&self, a: &Product, b: &Product) -> Ordering {
        compare_visibility(a, b).then_with(|| self.compare_names(&a.name, &b.name))
    }

    fn compare_field(&self, field: SortField, a: &Product, b: &Product) -> Ordering {
        match field {
            SortField::Name => self.compare_names(&a.name, &b.name),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Quantity => a.quantity_in_stock.cmp(&b.quantity_in_stock),
            SortField::Visibility => compare_visibility(a, b),
        }
    }
}

fn compare_visibility(a: &Product, b: &Product) -> Ordering {
    a.visibility_tier()
        .priority()
        .cmp(&b.visibility_tier().priority())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::ProductId;

    fn product(id: i64, name: &str, price: i64, active: bool, qty: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            description: None,
            active,
            quantity_in_stock: qty,
            image: None,
        }
    }

    fn engine() -> SortEngine {
        SortEngine::czech().unwrap()
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_order_uses_visibility_then_name() {
        let products = vec![
            product(1, "Acai", 10, true, 0),
            product(2, "Zmrzlina", 10, true, 3),
            product(3, "Bageta", 10, false, 2),
            product(4, "Americano", 10, true, 1),
        ];
        let ordered = engine().order(&products, &SortConfiguration::new());
        assert_eq!(names(&ordered), ["Americano", "Zmrzlina", "Bageta", "Acai"]);
    }

    #[test]
    fn test_default_order_visible_before_out_of_stock_regardless_of_name() {
        let products = vec![
            product(1, "A", 1, true, 0),
            product(2, "B", 1, false, 0),
            product(3, "Ž", 1, true, 9),
            product(4, "Y", 1, true, 1),
        ];
        let ordered = engine().order(&products, &SortConfiguration::new());
        let first_out = ordered.iter().position(|p| p.quantity_in_stock == 0).unwrap();
        assert!(ordered.iter().take(first_out).all(Product::is_visible));
        assert!(ordered.iter().skip(first_out).all(|p| p.quantity_in_stock == 0));
    }

    #[test]
    fn test_default_order_scenario_espresso_kafe() {
        let products = vec![
            product(2, "Kafe", 30, false, 3),
            product(1, "Espresso", 45, true, 5),
        ];
        let ordered = engine().order(&products, &SortConfiguration::new());
        assert_eq!(names(&ordered), ["Espresso", "Kafe"]);
    }

    #[test]
    fn test_czech_collation() {
        let engine = engine();
        assert_eq!(engine.compare_names("Cukr", "Čaj"), Ordering::Less);
        assert_eq!(engine.compare_names("Čaj", "Dort"), Ordering::Less);
        assert_eq!(engine.compare_names("hrnek", "chléb"), Ordering::Less);
        assert_eq!(engine.compare_names("chléb", "ibišek"), Ordering::Less);
        assert_eq!(engine.compare_names("espresso", "Espresso"), Ordering::Equal);
        assert_eq!(engine.compare_names("syr", "sýr"), Ordering::Less);
    }

    #[test]
    fn test_name_sort_with_czech_letters() {
        let products = vec![
            product(1, "Dort", 1, true, 1),
            product(2, "Čaj", 1, true, 1),
            product(3, "Cukr", 1, true, 1),
            product(4, "chléb", 1, true, 1),
            product(5, "Hranolky", 1, true, 1),
        ];
        let config: SortConfiguration = "name:asc".parse().unwrap();
        let ordered = engine().order(&products, &config);
        assert_eq!(names(&ordered), ["Cukr", "Čaj", "Dort", "Hranolky", "chléb"]);
    }

    #[test]
    fn test_price_descending_is_non_increasing() {
        let products = vec![
            product(1, "a", 30, true, 1),
            product(2, "b", 120, false, 0),
            product(3, "c", 5, true, 4),
            product(4, "d", 120, true, 2),
            product(5, "e", 60, false, 1),
        ];
        let config: SortConfiguration = "price:desc".parse().unwrap();
        let ordered = engine().order(&products, &config);
        assert!(ordered.windows(2).all(|w| w[0].price >= w[1].price));
    }

    #[test]
    fn test_secondary_criterion_breaks_ties() {
        let products = vec![
            product(1, "Latte", 50, true, 1),
            product(2, "Americano", 50, true, 1),
            product(3, "Čaj", 20, true, 1),
        ];
        let config: SortConfiguration = "price:desc,name:asc".parse().unwrap();
        let ordered = engine().order(&products, &config);
        assert_eq!(names(&ordered), ["Americano", "Latte", "Čaj"]);
    }

    #[test]
    fn test_full_tie_falls_back_to_id() {
        let products = vec![
            product(9, "Same", 10, true, 1),
            product(3, "Same", 10, true, 1),
            product(5, "same", 10, true, 1),
        ];
        let config: SortConfiguration = "price:asc,name:desc".parse().unwrap();
        let ids: Vec<i64> = engine()
            .order(&products, &config)
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, [3, 5, 9]);
    }

    #[test]
    fn test_quantity_and_visibility_fields() {
        let products = vec![
            product(1, "a", 1, false, 7),
            product(2, "b", 1, true, 0),
            product(3, "c", 1, true, 2),
        ];
        let engine = engine();
        let by_qty = engine.order(&products, &"quantity:desc".parse().unwrap());
        assert_eq!(names(&by_qty), ["a", "c", "b"]);
        let by_visibility = engine.order(&products, &"visibility".parse().unwrap());
        assert_eq!(names(&by_visibility), ["c", "a", "b"]);
    }

    #[test]
    fn test_order_does_not_touch_input() {
        let products = vec![product(2, "b", 1, true, 1), product(1, "a", 1, true, 1)];
        let _ = engine().order(&products, &SortConfiguration::new());
        assert_eq!(products[0].id, ProductId::new(2));
    }

    #[test]
    fn test_toggle_appends_then_flips() {
        let mut config = SortConfiguration::new();
        config.toggle(SortField::Price);
        config.toggle(SortField::Name);
        assert_eq!(
            config.get(SortField::Name),
            Some(&SortCriterion {
                field: SortField::Name,
                direction: SortDirection::Ascending,
                priority: 1,
            })
        );

        config.toggle(SortField::Name);
        let name = config.get(SortField::Name).unwrap();
        assert_eq!(name.direction, SortDirection::Descending);
        assert_eq!(name.priority, 1);
    }

    #[test]
    fn test_toggle_twice_restores_direction_and_priority() {
        let mut config: SortConfiguration = "quantity,price:desc".parse().unwrap();
        let before = *config.get(SortField::Price).unwrap();
        config.toggle(SortField::Price);
        config.toggle(SortField::Price);
        assert_eq!(config.get(SortField::Price), Some(&before));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_remove_renumbers_priorities() {
        let mut config: SortConfiguration = "name,price:desc,visibility".parse().unwrap();
        assert!(config.remove(SortField::Name));
        let remaining: Vec<(SortField, usize)> = config
            .criteria()
            .iter()
            .map(|c| (c.field, c.priority))
            .collect();
        assert_eq!(
            remaining,
            [(SortField::Price, 0), (SortField::Visibility, 1)]
        );
        assert_eq!(
            config.get(SortField::Price).unwrap().direction,
            SortDirection::Descending
        );
        assert!(!config.remove(SortField::Quantity));
    }

    #[test]
    fn test_from_criteria_rejects_gaps_and_duplicates() {
        let gap = vec![
            SortCriterion {
                field: SortField::Name,
                direction: SortDirection::Ascending,
                priority: 0,
            },
            SortCriterion {
                field: SortField::Price,
                direction: SortDirection::Ascending,
                priority: 2,
            },
        ];
        assert_eq!(
            SortConfiguration::from_criteria(gap),
            Err(SortError::NonContiguousPriority)
        );
        assert_eq!(
            "name,name:desc".parse::<SortConfiguration>(),
            Err(SortError::DuplicateField(SortField::Name))
        );
    }

    #[test]
    fn test_parse_and_display() {
        let config: SortConfiguration = "Price:DESC, qty".parse().unwrap();
        assert_eq!(config.to_string(), "price:desc,quantity:asc");
        assert!("colour".parse::<SortConfiguration>().is_err());
        assert!("name:up".parse::<SortConfiguration>().is_err());
        assert!("".parse::<SortConfiguration>().unwrap().is_empty());
    }

    #[test]
    fn test_configuration_json_is_validated() {
        let json = r#"[{"field":"price","direction":"descending","priority":1}]"#;
        assert!(serde_json::from_str::<SortConfiguration>(json).is_err());
    }
}

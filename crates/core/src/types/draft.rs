//! Form drafts for creating and updating products and kiosks.
//!
//! Drafts are validated on the client before any network call so that a bad
//! form never reaches the API. Each failure names the offending field so the
//! form can show it inline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Kiosk, Product};

/// Maximum length of a product or kiosk name.
pub const MAX_NAME_LENGTH: usize = 255;

/// A single client-side constraint failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The field is empty (after trimming whitespace).
    #[error("{field} cannot be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// The field is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The numeric field must be strictly positive.
    #[error("{field} must be greater than zero")]
    NotPositive {
        /// Offending field.
        field: &'static str,
    },
}

impl ValidationError {
    /// The form field this error belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } | Self::NotPositive { field } => {
                field
            }
        }
    }
}

/// Every constraint failure found on a draft.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// First error for a given field, for inline display.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn check_name(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::Empty { field });
    } else if trimmed.chars().count() > MAX_NAME_LENGTH {
        errors.push(ValidationError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Body of the create/update product calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl ProductDraft {
    /// Create a draft with only the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            description: None,
            image: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Prefill a draft from an existing product (edit form).
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
        }
    }

    /// Validate the draft and return it with whitespace trimmed and blank
    /// optional fields dropped.
    ///
    /// # Errors
    ///
    /// Returns every failed constraint: empty or overlong name, non-positive
    /// price.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, "name", &self.name);
        if self.price <= Decimal::ZERO {
            errors.push(ValidationError::NotPositive { field: "price" });
        }
        errors.into_result()?;

        Ok(Self {
            name: self.name.trim().to_string(),
            price: self.price,
            description: non_blank(self.description),
            image: non_blank(self.image),
        })
    }

    /// Apply the draft's fields onto an existing product, keeping its id and
    /// kiosk-scoped state.
    #[must_use]
    pub fn apply_to(&self, product: &Product) -> Product {
        Product {
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            image: self.image.clone(),
            ..product.clone()
        }
    }
}

/// Body of the create/update kiosk calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskDraft {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
}

impl KioskDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn from_kiosk(kiosk: &Kiosk) -> Self {
        Self {
            name: kiosk.name.clone(),
            location: kiosk.location.clone(),
            description: kiosk.description.clone(),
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns every failed constraint: empty or overlong name, empty
    /// location.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, "name", &self.name);
        if self.location.trim().is_empty() {
            errors.push(ValidationError::Empty { field: "location" });
        }
        errors.into_result()?;

        Ok(Self {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            description: non_blank(self.description),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ProductId;

    #[test]
    fn test_product_draft_valid_is_trimmed() {
        let draft = ProductDraft::new("  Espresso ", Decimal::new(45, 0)).description("   ");
        let draft = draft.validate().unwrap();
        assert_eq!(draft.name, "Espresso");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_product_draft_collects_all_errors() {
        let err = ProductDraft::new("   ", Decimal::ZERO).validate().unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.for_field("name"),
            Some(&ValidationError::Empty { field: "name" })
        );
        assert_eq!(
            err.for_field("price"),
            Some(&ValidationError::NotPositive { field: "price" })
        );
        assert_eq!(
            err.to_string(),
            "name cannot be empty; price must be greater than zero"
        );
    }

    #[test]
    fn test_product_draft_negative_price() {
        let err = ProductDraft::new("Kafe", Decimal::new(-1, 0))
            .validate()
            .unwrap_err();
        assert!(err.for_field("name").is_none());
        assert!(err.for_field("price").is_some());
    }

    #[test]
    fn test_product_draft_name_too_long() {
        let err = ProductDraft::new("x".repeat(MAX_NAME_LENGTH + 1), Decimal::ONE)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err.for_field("name"),
            Some(ValidationError::TooLong { max: MAX_NAME_LENGTH, .. })
        ));
    }

    #[test]
    fn test_product_draft_serializes_price_as_number() {
        let draft = ProductDraft::new("Kafe", Decimal::new(399, 1));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["price"], serde_json::json!(39.9));
        assert_eq!(json["description"], serde_json::Value::Null);
    }

    #[test]
    fn test_apply_to_keeps_inventory_state() {
        let product = Product {
            id: ProductId::new(9),
            name: "Old".to_string(),
            price: Decimal::ONE,
            description: None,
            active: true,
            quantity_in_stock: 4,
            image: None,
        };
        let updated = ProductDraft::new("New", Decimal::TWO).apply_to(&product);
        assert_eq!(updated.id, ProductId::new(9));
        assert_eq!(updated.name, "New");
        assert_eq!(updated.quantity_in_stock, 4);
        assert!(updated.active);
    }

    #[test]
    fn test_kiosk_draft_requires_location() {
        let err = KioskDraft::new("Lobby", " ").validate().unwrap_err();
        assert_eq!(
            err.for_field("location"),
            Some(&ValidationError::Empty { field: "location" })
        );
        assert!(KioskDraft::new("Lobby", "Hall A").validate().is_ok());
    }
}

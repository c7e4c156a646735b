//! Wire types for the admin REST API.

use kiosk_admin_core::{Kiosk, Product};
use serde::{Deserialize, Serialize};

/// Standard `{success, data, message}` envelope used by the product routes.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `data` of the product list routes.
#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Vec<Product>,
}

/// `data` of the create/update product routes.
#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Product,
}

/// Body of `GET /admin/kiosks`.
#[derive(Debug, Deserialize)]
pub struct KiosksResponse {
    pub kiosks: Vec<Kiosk>,
}

/// Loose confirmation body of the mutation routes.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body; the backend uses either field.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}

/// Body of the stock update call.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub quantity_in_stock: u32,
}

/// Body of the visibility call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VisibilityUpdate {
    pub visible: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_products_envelope() {
        let json = r#"{
            "success": true,
            "data": { "products": [ { "id": 1, "name": "Espresso", "price": 45, "active": true, "quantityInStock": 5 } ] }
        }"#;
        let envelope: Envelope<ProductsData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.success, Some(true));
        assert_eq!(envelope.data.unwrap().products.len(), 1);
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: Envelope<ProductsData> =
            serde_json::from_str(r#"{"success": false, "message": "Kiosk not found"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Kiosk not found"));
    }

    #[test]
    fn test_stock_update_body() {
        let body = serde_json::to_value(StockUpdate {
            quantity_in_stock: 0,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "quantityInStock": 0 }));
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "Bad Request", "message": "Name is required"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Name is required"));
    }
}

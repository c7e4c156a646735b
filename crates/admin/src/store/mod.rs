//! Remote product store: the kiosk backend's admin REST API.
//!
//! [`RemoteStore`] is the seam between the cache/services and the network.
//! [`HttpStore`] implements it over `reqwest`; tests substitute an in-memory
//! implementation.
//!
//! # API Reference
//!
//! | Operation | Method & Path |
//! |---|---|
//! | List products | `GET /admin/products` |
//! | List kiosk inventory | `GET /admin/products/inventory/:kioskId` |
//! | Create product | `POST /admin/products` |
//! | Update product | `PUT /admin/products/:id` |
//! | Delete product | `DELETE /admin/products/:id` |
//! | Update stock | `PUT /admin/products/:productId/inventory/:kioskId` |
//! | Set visibility | `PUT /admin/products/:productId/inventory/:kioskId/visibility` |
//! | List kiosks | `GET /admin/kiosks` |
//! | Create/Update/Deactivate kiosk | `POST/PUT/DELETE /admin/kiosks[/:id]` |

mod http;
pub mod types;

pub use http::HttpStore;

use async_trait::async_trait;
use kiosk_admin_core::{Kiosk, KioskDraft, KioskId, Product, ProductDraft, ProductId};

use crate::error::ClientResult;

/// Operations the admin dashboard performs against the backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Global product catalogue.
    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    /// Products with quantities and visibility scoped to one kiosk.
    async fn list_inventory(&self, kiosk: KioskId) -> ClientResult<Vec<Product>>;

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product>;

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> ClientResult<Product>;

    async fn delete_product(&self, id: ProductId) -> ClientResult<()>;

    /// Set the stock level of a product at a kiosk.
    async fn update_stock(
        &self,
        product: ProductId,
        kiosk: KioskId,
        quantity: u32,
    ) -> ClientResult<()>;

    /// Show or hide a product at a kiosk.
    async fn set_visibility(
        &self,
        product: ProductId,
        kiosk: KioskId,
        visible: bool,
    ) -> ClientResult<()>;

    async fn list_kiosks(&self) -> ClientResult<Vec<Kiosk>>;

    /// Returns the server's confirmation message.
    async fn create_kiosk(&self, draft: &KioskDraft) -> ClientResult<String>;

    /// Returns the server's confirmation message.
    async fn update_kiosk(&self, id: KioskId, draft: &KioskDraft) -> ClientResult<String>;

    /// Logical delete: the kiosk is marked inactive, never removed.
    async fn deactivate_kiosk(&self, id: KioskId) -> ClientResult<String>;
}

//! Integration tests for the kiosk admin client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kiosk-admin-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cache` - Fetch, dedupe and stale-response handling
//! - `products` - Optimistic product, stock and visibility mutations
//! - `kiosks` - Kiosk CRUD and deactivation
//! - `dashboard` - Selection, view state and the revalidation loop
//!
//! Everything runs against [`FakeStore`], an in-memory [`RemoteStore`] that
//! records calls and can be told to fail.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use kiosk_admin::{AdminConfig, ClientError, ClientResult, RemoteStore};
use kiosk_admin_core::{Kiosk, KioskDraft, KioskId, Product, ProductDraft, ProductId};
use rust_decimal::Decimal;
use tokio::sync::watch;

/// One call received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    ListInventory(KioskId),
    CreateProduct(ProductDraft),
    UpdateProduct(ProductId, ProductDraft),
    DeleteProduct(ProductId),
    UpdateStock {
        product: ProductId,
        kiosk: KioskId,
        quantity: u32,
    },
    SetVisibility {
        product: ProductId,
        kiosk: KioskId,
        visible: bool,
    },
    ListKiosks,
    CreateKiosk(KioskDraft),
    UpdateKiosk(KioskId, KioskDraft),
    DeactivateKiosk(KioskId),
}

impl Call {
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::ListProducts => Op::ListProducts,
            Self::ListInventory(_) => Op::ListInventory,
            Self::CreateProduct(_) => Op::CreateProduct,
            Self::UpdateProduct(..) => Op::UpdateProduct,
            Self::DeleteProduct(_) => Op::DeleteProduct,
            Self::UpdateStock { .. } => Op::UpdateStock,
            Self::SetVisibility { .. } => Op::SetVisibility,
            Self::ListKiosks => Op::ListKiosks,
            Self::CreateKiosk(_) => Op::CreateKiosk,
            Self::UpdateKiosk(..) => Op::UpdateKiosk,
            Self::DeactivateKiosk(_) => Op::DeactivateKiosk,
        }
    }
}

/// Store operation, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListProducts,
    ListInventory,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    UpdateStock,
    SetVisibility,
    ListKiosks,
    CreateKiosk,
    UpdateKiosk,
    DeactivateKiosk,
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    kiosks: Vec<Kiosk>,
    calls: Vec<Call>,
    failures: HashMap<Op, ClientError>,
}

/// In-memory admin API.
///
/// Inventory reads return the same product list for every kiosk. Reads can
/// be held with [`FakeStore::hold_reads`] to simulate a slow network.
pub struct FakeStore {
    state: Mutex<FakeState>,
    gate: watch::Sender<bool>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FakeStore {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            state: Mutex::new(FakeState {
                products,
                ..FakeState::default()
            }),
            gate,
        }
    }

    #[must_use]
    pub fn with_kiosks(self, kiosks: Vec<Kiosk>) -> Self {
        self.lock().kiosks = kiosks;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call of `op` fail with `error` until cleared.
    pub fn fail(&self, op: Op, error: ClientError) {
        self.lock().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Replace the server-side product list.
    pub fn set_products(&self, products: Vec<Product>) {
        self.lock().products = products;
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    #[must_use]
    pub fn kiosks(&self) -> Vec<Kiosk> {
        self.lock().kiosks.clone()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn count(&self, op: Op) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Block list reads until [`Self::release_reads`].
    pub fn hold_reads(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_reads(&self) {
        self.gate.send_replace(true);
    }

    /// Wait until at least `n` calls of `op` were received.
    pub async fn wait_for(&self, op: Op, n: usize) {
        while self.count(op) < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, call: Call) -> ClientResult<()> {
        let mut state = self.lock();
        let op = call.op();
        state.calls.push(call);
        state.failures.get(&op).cloned().map_or(Ok(()), Err)
    }

    async fn read_products(&self, call: Call) -> ClientResult<Vec<Product>> {
        let recorded = self.record(call);
        let snapshot = self.products();
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        recorded.map(|()| snapshot)
    }

    fn not_found(what: &str) -> ClientError {
        ClientError::Api {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.read_products(Call::ListProducts).await
    }

    async fn list_inventory(&self, kiosk: KioskId) -> ClientResult<Vec<Product>> {
        self.read_products(Call::ListInventory(kiosk)).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        self.record(Call::CreateProduct(draft.clone()))?;
        let mut state = self.lock();
        let next_id = state
            .products
            .iter()
            .map(|p| p.id.as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        let product = Product {
            id: ProductId::new(next_id),
            name: draft.name.clone(),
            price: draft.price,
            description: draft.description.clone(),
            active: true,
            quantity_in_stock: 0,
            image: draft.image.clone(),
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> ClientResult<Product> {
        self.record(Call::UpdateProduct(id, draft.clone()))?;
        let mut state = self.lock();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::not_found("Product"))?;
        *slot = draft.apply_to(slot);
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        self.record(Call::DeleteProduct(id))?;
        let mut state = self.lock();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(Self::not_found("Product"));
        }
        Ok(())
    }

    async fn update_stock(
        &self,
        product: ProductId,
        kiosk: KioskId,
        quantity: u32,
    ) -> ClientResult<()> {
        self.record(Call::UpdateStock {
            product,
            kiosk,
            quantity,
        })?;
        let mut state = self.lock();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product)
            .ok_or_else(|| Self::not_found("Product"))?;
        slot.quantity_in_stock = quantity;
        Ok(())
    }

    async fn set_visibility(
        &self,
        product: ProductId,
        kiosk: KioskId,
        visible: bool,
    ) -> ClientResult<()> {
        self.record(Call::SetVisibility {
            product,
            kiosk,
            visible,
        })?;
        let mut state = self.lock();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product)
            .ok_or_else(|| Self::not_found("Product"))?;
        slot.active = visible;
        Ok(())
    }

    async fn list_kiosks(&self) -> ClientResult<Vec<Kiosk>> {
        self.record(Call::ListKiosks)?;
        Ok(self.kiosks())
    }

    async fn create_kiosk(&self, draft: &KioskDraft) -> ClientResult<String> {
        self.record(Call::CreateKiosk(draft.clone()))?;
        let mut state = self.lock();
        let next_id = state.kiosks.iter().map(|k| k.id.as_i64()).max().unwrap_or(0) + 1;
        state.kiosks.push(Kiosk {
            id: KioskId::new(next_id),
            name: draft.name.clone(),
            location: draft.location.clone(),
            description: draft.description.clone(),
            is_active: true,
            created_at: None,
            updated_at: None,
        });
        Ok("Kiosk created successfully".to_string())
    }

    async fn update_kiosk(&self, id: KioskId, draft: &KioskDraft) -> ClientResult<String> {
        self.record(Call::UpdateKiosk(id, draft.clone()))?;
        let mut state = self.lock();
        let slot = state
            .kiosks
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| Self::not_found("Kiosk"))?;
        slot.name.clone_from(&draft.name);
        slot.location.clone_from(&draft.location);
        slot.description.clone_from(&draft.description);
        Ok("Kiosk updated successfully".to_string())
    }

    async fn deactivate_kiosk(&self, id: KioskId) -> ClientResult<String> {
        self.record(Call::DeactivateKiosk(id))?;
        let mut state = self.lock();
        let slot = state
            .kiosks
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| Self::not_found("Kiosk"))?;
        slot.is_active = false;
        Ok(String::new())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product with a whole-number price.
#[must_use]
pub fn product(id: i64, name: &str, price: i64, active: bool, quantity: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::new(price, 0),
        description: None,
        active,
        quantity_in_stock: quantity,
        image: None,
    }
}

#[must_use]
pub fn kiosk(id: i64, name: &str, location: &str) -> Kiosk {
    Kiosk {
        id: KioskId::new(id),
        name: name.to_string(),
        location: location.to_string(),
        description: None,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

/// Config pointing nowhere; only the timing fields matter with a fake store.
///
/// # Panics
///
/// Never; the URL is a constant.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> AdminConfig {
    AdminConfig::new(url::Url::parse("http://kiosk.test/api").unwrap())
}

/// A fake store behind the trait object the admin crate expects.
#[must_use]
pub fn shared(store: FakeStore) -> (Arc<FakeStore>, Arc<dyn RemoteStore>) {
    let store = Arc::new(store);
    let dyn_store: Arc<dyn RemoteStore> = store.clone();
    (store, dyn_store)
}

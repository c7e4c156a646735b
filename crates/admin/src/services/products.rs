//! Product and inventory mutations.
//!
//! Each operation applies its change to the [`ProductCache`] first, asks the
//! store to confirm, and either reconciles with a revalidation or undoes the
//! change and notifies the user.

use std::sync::Arc;

use kiosk_admin_core::{KioskId, Product, ProductDraft, ProductId};
use tracing::{info, instrument, warn};

use crate::cache::{Mutation, ProductCache, Section};
use crate::error::ClientResult;
use crate::events::{DashboardEvent, EventBus, Notification};
use crate::store::RemoteStore;

/// Product catalogue and per-kiosk inventory operations.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn RemoteStore>,
    cache: ProductCache,
    bus: EventBus,
}

impl std::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ProductService {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, cache: ProductCache, bus: EventBus) -> Self {
        Self { store, cache, bus }
    }

    /// Create a product.
    ///
    /// The server assigns the id, so the product is added to the cache only
    /// once the store returns it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any request if the draft is invalid, or
    /// the store error if creation fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: ProductDraft) -> ClientResult<Product> {
        let draft = draft.validate()?;

        let created = match self.store.create_product(&draft).await {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Failed to create product");
                self.bus
                    .notify(Notification::error(format!("Failed to create product: {}", e.user_message())));
                return Err(e);
            }
        };

        self.cache.add_optimistic(created.clone());
        info!(id = %created.id, "Product created");
        self.bus
            .notify(Notification::success(format!("Product \"{}\" created", created.name)));
        self.reconcile().await;
        Ok(created)
    }

    /// Update a product's catalogue fields.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any request if the draft is invalid, or
    /// the store error after rolling the cached product back.
    #[instrument(skip(self, draft))]
    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> ClientResult<Product> {
        let draft = draft.validate()?;

        let mutation = self
            .cached(id)
            .and_then(|current| self.cache.update_optimistic(draft.apply_to(&current)));

        match self.store.update_product(id, &draft).await {
            Ok(updated) => {
                self.cache.update_optimistic(updated.clone());
                info!(%id, "Product updated");
                self.bus.notify(Notification::success("Product updated"));
                self.reconcile().await;
                Ok(updated)
            }
            Err(e) => {
                self.undo(mutation.as_ref());
                warn!(%id, error = %e, "Failed to update product, rolled back");
                self.bus
                    .notify(Notification::error(format!("Failed to update product: {}", e.user_message())));
                Err(e)
            }
        }
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the store error after restoring the product in the cache.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let removed = self.cache.remove_optimistic(id);

        match self.store.delete_product(id).await {
            Ok(()) => {
                info!(%id, "Product deleted");
                self.bus.notify(Notification::success("Product deleted"));
                self.reconcile().await;
                Ok(())
            }
            Err(e) => {
                if let Some(Mutation::Removed { product, .. }) = &removed {
                    self.cache.revert(product);
                }
                warn!(%id, error = %e, "Failed to delete product, restored");
                self.bus
                    .notify(Notification::error(format!("Failed to delete product: {}", e.user_message())));
                Err(e)
            }
        }
    }

    /// Set a product's stock level at a kiosk.
    ///
    /// Setting the quantity to zero also hides the product at that kiosk:
    /// exactly one visibility call with `visible: false` follows the stock
    /// update, and `admin-refresh-requested` is published.
    ///
    /// # Errors
    ///
    /// Returns the store error of the stock or visibility call. A failed
    /// stock update is rolled back; a failed visibility call leaves the
    /// stock change in place and revalidates.
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        product: ProductId,
        kiosk: KioskId,
        quantity: u32,
    ) -> ClientResult<()> {
        let hides = quantity == 0;
        let mutation = self.optimistic_inventory(product, kiosk, |p| {
            p.quantity_in_stock = quantity;
            if hides {
                p.active = false;
            }
        });

        if let Err(e) = self.store.update_stock(product, kiosk, quantity).await {
            self.undo(mutation.as_ref());
            warn!(%product, %kiosk, error = %e, "Failed to update stock, rolled back");
            self.bus
                .notify(Notification::error(format!("Failed to update stock: {}", e.user_message())));
            return Err(e);
        }

        if !hides {
            info!(%product, %kiosk, quantity, "Stock updated");
            self.bus.notify(Notification::success("Stock updated"));
            self.reconcile().await;
            return Ok(());
        }

        if let Err(e) = self.store.set_visibility(product, kiosk, false).await {
            warn!(%product, %kiosk, error = %e, "Stock cleared but hiding the product failed");
            self.bus.notify(Notification::error(format!(
                "Stock updated, but the product could not be hidden: {}",
                e.user_message()
            )));
            self.reconcile().await;
            return Err(e);
        }

        info!(%product, %kiosk, "Stock cleared, product hidden");
        self.bus
            .notify(Notification::success("Out of stock, product hidden"));
        self.reconcile().await;
        self.bus.publish(DashboardEvent::AdminRefreshRequested);
        Ok(())
    }

    /// Show or hide a product at a kiosk.
    ///
    /// # Errors
    ///
    /// Returns the store error after rolling the cached product back.
    #[instrument(skip(self))]
    pub async fn set_visibility(
        &self,
        product: ProductId,
        kiosk: KioskId,
        visible: bool,
    ) -> ClientResult<()> {
        let mutation = self.optimistic_inventory(product, kiosk, |p| p.active = visible);

        match self.store.set_visibility(product, kiosk, visible).await {
            Ok(()) => {
                info!(%product, %kiosk, visible, "Visibility updated");
                self.bus.notify(Notification::success(if visible {
                    "Product shown"
                } else {
                    "Product hidden"
                }));
                self.reconcile().await;
                Ok(())
            }
            Err(e) => {
                self.undo(mutation.as_ref());
                warn!(%product, %kiosk, error = %e, "Failed to update visibility, rolled back");
                self.bus.notify(Notification::error(format!(
                    "Failed to update visibility: {}",
                    e.user_message()
                )));
                Err(e)
            }
        }
    }

    fn cached(&self, id: ProductId) -> Option<Product> {
        self.cache.products().iter().find(|p| p.id == id).cloned()
    }

    /// Apply `edit` to the cached product if the cache shows `kiosk`'s
    /// inventory. Other views carry no per-kiosk stock to edit.
    fn optimistic_inventory(
        &self,
        product: ProductId,
        kiosk: KioskId,
        edit: impl FnOnce(&mut Product),
    ) -> Option<Mutation> {
        let key = self.cache.key();
        if key.section() != Section::Inventory || key.kiosk() != Some(kiosk) {
            return None;
        }
        let mut next = self.cached(product)?;
        edit(&mut next);
        self.cache.update_optimistic(next)
    }

    fn undo(&self, mutation: Option<&Mutation>) {
        if let Some(mutation) = mutation {
            self.cache.rollback(mutation);
        }
    }

    async fn reconcile(&self) {
        if let Err(e) = self.cache.revalidate().await {
            warn!(error = %e, "Revalidation after mutation failed");
        }
    }
}

//! Client-side product cache with optimistic mutation and revalidation.
//!
//! One [`ProductCache`] mirrors the product list for the active
//! [`CacheKey`]. The list is held as an `Arc<Vec<Product>>` snapshot that is
//! swapped whole, so a reader (the sort pass) never sees a half-applied
//! change.
//!
//! Fetch results are applied only when they are still relevant:
//! - the key they were requested for is still active,
//! - no newer request for the key has already landed,
//! - no local mutation (or key switch) happened after the request started.
//!
//! Automatic revalidations ([`ProductCache::refresh`]) share one request per
//! key within the dedupe window via `moka`'s coalescing initializer.
//! [`ProductCache::revalidate`] always goes to the network.

mod key;
mod mutation;

pub use key::{CacheKey, Section};
pub use mutation::Mutation;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kiosk_admin_core::{Product, ProductId};
use moka::future::Cache;
use tracing::{debug, info, instrument, warn};

use crate::error::{ClientError, ClientResult};
use crate::revalidation::RefreshTrigger;
use crate::store::RemoteStore;

/// Point-in-time view of the cache for rendering.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub key: CacheKey,
    pub products: Arc<Vec<Product>>,
    /// Last read failure, cleared by the next successful fetch.
    pub error: Option<ClientError>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    /// Whether at least one fetch for this key has succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}

/// Product list cache for the active `(kiosk, section)` key.
#[derive(Clone)]
pub struct ProductCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    store: Arc<dyn RemoteStore>,
    state: RwLock<CacheState>,
    recent: Cache<CacheKey, Arc<Vec<Product>>>,
}

struct CacheState {
    key: CacheKey,
    products: Arc<Vec<Product>>,
    error: Option<ClientError>,
    fetched_at: Option<DateTime<Utc>>,
    /// Sequence number handed to the most recently started request.
    last_started: u64,
    /// Sequence number of the most recently applied response.
    last_applied: u64,
    /// Responses to requests numbered at or below this are discarded.
    discard_through: u64,
}

impl CacheState {
    fn new(key: CacheKey) -> Self {
        Self {
            key,
            products: Arc::new(Vec::new()),
            error: None,
            fetched_at: None,
            last_started: 0,
            last_applied: 0,
            discard_through: 0,
        }
    }

    /// Mark every in-flight request as stale.
    const fn supersede_in_flight(&mut self) {
        self.discard_through = self.last_started;
    }

    /// Copy-on-write edit of the product list.
    fn edit<R>(&mut self, f: impl FnOnce(&mut Vec<Product>) -> R) -> R {
        let mut products = self.products.as_ref().clone();
        let result = f(&mut products);
        self.products = Arc::new(products);
        self.supersede_in_flight();
        result
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("ProductCache")
            .field("key", &state.key)
            .field("products", &state.products.len())
            .field("error", &state.error)
            .finish_non_exhaustive()
    }
}

impl ProductCache {
    /// Create an empty cache for `key`. Nothing is fetched until asked.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, key: CacheKey, dedupe_window: Duration) -> Self {
        let recent = Cache::builder()
            .max_capacity(64)
            .time_to_live(dedupe_window)
            .build();

        Self {
            inner: Arc::new(CacheInner {
                store,
                state: RwLock::new(CacheState::new(key)),
                recent,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The active key.
    #[must_use]
    pub fn key(&self) -> CacheKey {
        self.read().key
    }

    /// Current product list.
    #[must_use]
    pub fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.read().products)
    }

    /// Last read failure, if the most recent fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<ClientError> {
        self.read().error.clone()
    }

    /// Everything a renderer needs, read under one lock.
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.read();
        CacheSnapshot {
            key: state.key,
            products: Arc::clone(&state.products),
            error: state.error.clone(),
            fetched_at: state.fetched_at,
        }
    }

    /// Switch to another key.
    ///
    /// The list is cleared and every in-flight request for the previous key
    /// is discarded when it lands. Shared refresh results are dropped too, so
    /// the first refresh after a switch always reaches the store. Returns
    /// `false` if `key` was already active.
    pub fn set_key(&self, key: CacheKey) -> bool {
        let mut state = self.write();
        if state.key == key {
            return false;
        }
        info!(from = %state.key, to = %key, "Switching product cache key");
        let last_started = state.last_started;
        *state = CacheState::new(key);
        state.last_started = last_started;
        state.last_applied = last_started;
        state.supersede_in_flight();
        self.inner.recent.invalidate_all();
        true
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the active key's list from the store.
    ///
    /// On success the list replaces the cached one and clears the error; on
    /// failure the previous list stays and the error is recorded. Either
    /// outcome is dropped if the response is stale.
    ///
    /// # Errors
    ///
    /// Returns `Network`, `Api` or `Parse` errors from the store.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn fetch(&self) -> ClientResult<Arc<Vec<Product>>> {
        self.load_and_apply().await.0
    }

    /// Force a fresh fetch regardless of how recent the cached list is.
    ///
    /// Used after a confirmed mutation and for the explicit refresh signals.
    /// An applied result also seeds the dedupe window for automatic
    /// refreshes.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn revalidate(&self) -> ClientResult<Arc<Vec<Product>>> {
        let key = self.key();
        let (result, applied) = self.load_and_apply().await;
        let products = result?;
        if applied {
            self.inner.recent.insert(key, Arc::clone(&products)).await;
        }
        Ok(products)
    }

    /// Automatic revalidation (interval, focus, reconnect).
    ///
    /// Concurrent or repeated calls for the same key within the dedupe
    /// window share a single request and all observe its result. A shared
    /// result that was discarded as stale is not kept for later callers.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`]; every joined caller receives the same error.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn refresh(&self, trigger: RefreshTrigger) -> ClientResult<Arc<Vec<Product>>> {
        let key = self.key();
        let discarded = AtomicBool::new(false);
        let result = self
            .inner
            .recent
            .try_get_with(key, async {
                debug!(%trigger, "Revalidating product list");
                let (result, applied) = self.load_and_apply().await;
                if !applied {
                    discarded.store(true, Ordering::Relaxed);
                }
                result
            })
            .await
            .map_err(|e| ClientError::clone(&e));

        if discarded.load(Ordering::Relaxed) {
            self.inner.recent.invalidate(&key).await;
        }
        result
    }

    /// Fetch the active key and apply the result unless it is stale.
    ///
    /// Returns the store result and whether it reached the cache state.
    async fn load_and_apply(&self) -> (ClientResult<Arc<Vec<Product>>>, bool) {
        let (key, seq) = self.begin_request();
        let result = self.load(key).await.map(Arc::new);
        let applied = self.complete_request(key, seq, &result);
        (result, applied)
    }

    async fn load(&self, key: CacheKey) -> ClientResult<Vec<Product>> {
        match (key.section(), key.kiosk()) {
            (Section::Inventory, Some(kiosk)) => self.inner.store.list_inventory(kiosk).await,
            (Section::Inventory, None) => Err(ClientError::InvalidRequest(
                "inventory requires a kiosk".to_string(),
            )),
            (Section::Products, _) => self.inner.store.list_products().await,
        }
    }

    fn begin_request(&self) -> (CacheKey, u64) {
        let mut state = self.write();
        state.last_started += 1;
        (state.key, state.last_started)
    }

    fn complete_request(
        &self,
        key: CacheKey,
        seq: u64,
        result: &ClientResult<Arc<Vec<Product>>>,
    ) -> bool {
        let mut state = self.write();
        if state.key != key {
            debug!(%key, active = %state.key, "Discarding response for inactive key");
            return false;
        }
        if seq <= state.discard_through || seq <= state.last_applied {
            debug!(%key, seq, "Discarding superseded response");
            return false;
        }

        state.last_applied = seq;
        match result {
            Ok(products) => {
                state.products = Arc::clone(products);
                state.error = None;
                state.fetched_at = Some(Utc::now());
                debug!(%key, count = products.len(), "Product list updated");
            }
            Err(e) => {
                warn!(%key, error = %e, "Product list fetch failed, keeping cached list");
                state.error = Some(e.clone());
            }
        }
        true
    }

    // =========================================================================
    // Optimistic mutations
    // =========================================================================

    /// Append a product locally without waiting for the server.
    pub fn add_optimistic(&self, product: Product) -> Mutation {
        let mut state = self.write();
        state.edit(|products| products.push(product.clone()));
        debug!(id = %product.id, "Optimistically added product");
        Mutation::Added(product)
    }

    /// Replace the product with the same id locally.
    ///
    /// Returns `None` (and changes nothing) if the id is not cached.
    pub fn update_optimistic(&self, product: Product) -> Option<Mutation> {
        let mut state = self.write();
        if !state.products.iter().any(|p| p.id == product.id) {
            return None;
        }
        let previous = state.edit(|products| mutation::merge(products, &product))?;
        debug!(id = %product.id, "Optimistically updated product");
        Some(Mutation::Updated {
            previous,
            next: product,
        })
    }

    /// Remove the product with `id` locally.
    ///
    /// Returns `None` (and changes nothing) if the id is not cached.
    pub fn remove_optimistic(&self, id: ProductId) -> Option<Mutation> {
        let mut state = self.write();
        if !state.products.iter().any(|p| p.id == id) {
            return None;
        }
        let (product, index) = state.edit(|products| mutation::remove(products, id))?;
        debug!(%id, "Optimistically removed product");
        Some(Mutation::Removed { product, index })
    }

    /// Re-insert a product whose optimistic delete the server rejected.
    ///
    /// Does nothing if a product with the same id is already cached.
    pub fn revert(&self, product: &Product) {
        let mut state = self.write();
        state.edit(|products| mutation::reinsert(products, product, None));
        debug!(id = %product.id, "Reverted optimistic delete");
    }

    /// Undo any optimistic mutation.
    pub fn rollback(&self, mutation: &Mutation) {
        let mut state = self.write();
        state.edit(|products| mutation.undo(products));
        debug!(id = %mutation.product_id(), "Rolled back optimistic mutation");
    }
}

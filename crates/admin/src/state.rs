//! Dashboard state: one store, cache, event bus and view state wired together.

use std::sync::Arc;
use std::time::Duration;

use kiosk_admin_core::{KioskId, Product, SortEngine};
use tracing::info;

use crate::cache::{CacheKey, CacheSnapshot, ProductCache, Section};
use crate::config::AdminConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::EventBus;
use crate::revalidation::{self, RevalidationHandle};
use crate::services::{KioskService, ProductService};
use crate::store::{HttpStore, RemoteStore};
use crate::view_state::ViewState;

/// Everything one admin session needs.
#[derive(Debug)]
pub struct Dashboard {
    bus: EventBus,
    cache: ProductCache,
    products: ProductService,
    kiosks: KioskService,
    view: ViewState,
    revalidate_interval: Duration,
    revalidation: Option<RevalidationHandle>,
}

impl Dashboard {
    /// Connect to the admin API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or the collation
    /// data cannot be loaded.
    pub fn connect(config: &AdminConfig) -> ClientResult<Self> {
        let store: Arc<dyn RemoteStore> = Arc::new(HttpStore::new(config)?);
        Self::with_store(store, config)
    }

    /// Build a dashboard over any [`RemoteStore`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Sort`] if the collation data cannot be loaded.
    pub fn with_store(store: Arc<dyn RemoteStore>, config: &AdminConfig) -> ClientResult<Self> {
        let engine = Arc::new(SortEngine::czech()?);
        let bus = EventBus::default();
        let cache = ProductCache::new(
            Arc::clone(&store),
            CacheKey::products(None),
            config.dedupe_window,
        );

        Ok(Self {
            products: ProductService::new(Arc::clone(&store), cache.clone(), bus.clone()),
            kiosks: KioskService::new(store, bus.clone()),
            view: ViewState::new(engine),
            bus,
            cache,
            revalidate_interval: config.revalidate_interval,
            revalidation: None,
        })
    }

    /// Switch the table to `section` of `kiosk`.
    ///
    /// Returns `true` if the cache key changed; the caller then loads the
    /// new list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for the inventory section
    /// without a kiosk.
    pub fn select(&mut self, kiosk: Option<KioskId>, section: Section) -> ClientResult<bool> {
        let key = CacheKey::new(kiosk, section).ok_or_else(|| {
            ClientError::InvalidRequest("select a kiosk to view its inventory".to_string())
        })?;
        self.view.select_kiosk(kiosk);
        let changed = self.cache.set_key(key);
        if changed {
            info!(%key, "Dashboard selection changed");
        }
        Ok(changed)
    }

    /// Fetch the list for the current selection.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous list stays cached.
    pub async fn load(&self) -> ClientResult<Arc<Vec<Product>>> {
        self.cache.fetch().await
    }

    /// Start background revalidation. Replaces a running loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_revalidation(&mut self) {
        self.revalidation = Some(revalidation::spawn(
            self.cache.clone(),
            &self.bus,
            self.revalidate_interval,
        ));
    }

    pub fn stop_revalidation(&mut self) {
        if let Some(handle) = self.revalidation.take() {
            handle.stop();
            info!("Revalidation stopped");
        }
    }

    /// Whether a revalidation loop is running.
    #[must_use]
    pub fn is_revalidating(&self) -> bool {
        self.revalidation
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cached products in the active kiosk's display order.
    #[must_use]
    pub fn rows(&self) -> Vec<Product> {
        self.view.order(&self.cache.products())
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub const fn cache(&self) -> &ProductCache {
        &self.cache
    }

    #[must_use]
    pub const fn products(&self) -> &ProductService {
        &self.products
    }

    #[must_use]
    pub const fn kiosks(&self) -> &KioskService {
        &self.kiosks
    }

    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }
}

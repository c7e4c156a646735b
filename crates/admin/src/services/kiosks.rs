//! Kiosk management.

use std::sync::Arc;

use kiosk_admin_core::{Kiosk, KioskDraft, KioskId};
use tracing::{info, instrument, warn};

use crate::error::ClientResult;
use crate::events::{EventBus, Notification};
use crate::store::RemoteStore;

/// Kiosk list and CRUD. Deleting a kiosk only deactivates it.
#[derive(Clone)]
pub struct KioskService {
    store: Arc<dyn RemoteStore>,
    bus: EventBus,
}

impl std::fmt::Debug for KioskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KioskService").finish_non_exhaustive()
    }
}

impl KioskService {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// All kiosks, including deactivated ones.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ClientResult<Vec<Kiosk>> {
        self.store.list_kiosks().await
    }

    /// Kiosks that can be selected in the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn list_active(&self) -> ClientResult<Vec<Kiosk>> {
        let mut kiosks = self.list().await?;
        kiosks.retain(|k| k.is_active);
        Ok(kiosks)
    }

    /// # Errors
    ///
    /// Returns `Validation` before any request if name or location is
    /// empty, or the store error.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: KioskDraft) -> ClientResult<String> {
        let draft = draft.validate()?;
        let result = self.store.create_kiosk(&draft).await;
        self.report(result, "Kiosk created", "Failed to create kiosk")
    }

    /// # Errors
    ///
    /// Returns `Validation` before any request if name or location is
    /// empty, or the store error.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: KioskId, draft: KioskDraft) -> ClientResult<String> {
        let draft = draft.validate()?;
        let result = self.store.update_kiosk(id, &draft).await;
        self.report(result, "Kiosk updated", "Failed to update kiosk")
    }

    /// Mark a kiosk inactive. The record stays on the server.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: KioskId) -> ClientResult<String> {
        let result = self.store.deactivate_kiosk(id).await;
        self.report(result, "Kiosk deactivated", "Failed to deactivate kiosk")
    }

    fn report(
        &self,
        result: ClientResult<String>,
        success: &str,
        failure: &str,
    ) -> ClientResult<String> {
        match result {
            Ok(message) => {
                info!(response = %message, "{success}");
                let text = if message.is_empty() { success } else { message.as_str() };
                self.bus.notify(Notification::success(text));
                Ok(message)
            }
            Err(e) => {
                warn!(error = %e, "{failure}");
                self.bus
                    .notify(Notification::error(format!("{failure}: {}", e.user_message())));
                Err(e)
            }
        }
    }
}

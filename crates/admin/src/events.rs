//! Dashboard event bus.
//!
//! Carries the refresh signals other parts of the admin publish, the focus
//! and connectivity signals of the host, and transient notifications for the
//! user. Backed by a `tokio::sync::broadcast` channel: every subscriber sees
//! every event published after it subscribed.

use std::fmt;

use chrono::{DateTime, Utc};
use kiosk_admin_core::ProductId;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::cache::CacheKey;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Something that happened in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// Inventory changed server-side as a side effect (auto-hide).
    AdminRefreshRequested,
    /// A product was changed by another part of the admin.
    ProductUpdated(Option<ProductId>),
    /// Explicit user request to reload.
    ForceRefresh,
    /// The dashboard regained focus.
    FocusRegained,
    /// Network connectivity came back.
    Reconnected,
    /// The revalidation loop applied a fresh list for the key.
    ProductsRefreshed(CacheKey),
    /// Message for the user.
    Notification(Notification),
}

impl DashboardEvent {
    /// Whether the event is one of the external refresh signals that force a
    /// revalidation past the dedupe window.
    #[must_use]
    pub const fn forces_revalidation(&self) -> bool {
        matches!(
            self,
            Self::AdminRefreshRequested | Self::ProductUpdated(_) | Self::ForceRefresh
        )
    }

    /// Wire name of the signal, as other admin pages emit it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdminRefreshRequested => "admin-refresh-requested",
            Self::ProductUpdated(_) => "product-updated",
            Self::ForceRefresh => "force-refresh",
            Self::FocusRegained => "focus",
            Self::Reconnected => "online",
            Self::ProductsRefreshed(_) => "products-refreshed",
            Self::Notification(_) => "notification",
        }
    }
}

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        })
    }
}

/// Transient message shown to the user (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// Cloneable handle to the dashboard's broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DashboardEvent) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "Published dashboard event"),
            Err(_) => debug!(event = name, "Dashboard event dropped, no subscribers"),
        }
    }

    /// Publish a notification.
    pub fn notify(&self, notification: Notification) {
        self.publish(DashboardEvent::Notification(notification));
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Handle that can publish without keeping the channel open.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning [`EventBus`] handle.
#[derive(Debug, Clone)]
pub struct WeakEventBus {
    tx: broadcast::WeakSender<DashboardEvent>,
}

impl WeakEventBus {
    /// The bus, unless every owning handle was dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventBus> {
        self.tx.upgrade().map(|tx| EventBus { tx })
    }
}

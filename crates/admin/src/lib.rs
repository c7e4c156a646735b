//! Kiosk admin dashboard client library.
//!
//! Talks to the kiosk backend's admin REST API and keeps a local, optimistic
//! mirror of the product list for the selected kiosk:
//!
//! - `store` - `RemoteStore` trait and its `reqwest` implementation
//! - `cache` - Product cache with optimistic mutation and revalidation
//! - `revalidation` - Interval, focus and signal driven refresh loop
//! - `services` - Product, inventory and kiosk mutations
//! - `view_state` - Per-kiosk sort criteria and column widths
//! - `state` - The above wired into one `Dashboard`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod revalidation;
pub mod services;
pub mod state;
pub mod store;
pub mod view_state;

pub use cache::{CacheKey, CacheSnapshot, Mutation, ProductCache, Section};
pub use config::{AdminConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use events::{DashboardEvent, EventBus, Notification, NotificationLevel, WeakEventBus};
pub use revalidation::{RefreshTrigger, RevalidationHandle};
pub use services::{KioskService, ProductService};
pub use state::Dashboard;
pub use store::{HttpStore, RemoteStore};
pub use view_state::{KioskView, ViewState};

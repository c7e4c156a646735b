//! Background revalidation loop.
//!
//! One task per cache, driven by an interval timer and the [`EventBus`]:
//!
//! - interval ticks, focus and reconnect go through the deduplicated
//!   [`ProductCache::refresh`],
//! - the external refresh signals force [`ProductCache::revalidate`].
//!
//! Each successful pass publishes [`DashboardEvent::ProductsRefreshed`] so
//! renderers can redraw. Failures are recorded on the cache and logged; the
//! loop keeps running until the handle is dropped or the bus closes.

use std::fmt;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::ProductCache;
use crate::error::ClientError;
use crate::events::{DashboardEvent, EventBus, WeakEventBus};

/// What started an automatic revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
    Interval,
    Focus,
    Reconnect,
    /// Caller-initiated, e.g. a CLI listing.
    Manual,
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interval => "interval",
            Self::Focus => "focus",
            Self::Reconnect => "reconnect",
            Self::Manual => "manual",
        })
    }
}

/// Running revalidation loop. Aborted on drop.
#[derive(Debug)]
pub struct RevalidationHandle {
    task: JoinHandle<()>,
}

impl RevalidationHandle {
    /// Stop the loop.
    pub fn stop(self) {
        drop(self);
    }

    /// Whether the loop has exited, e.g. because the bus closed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the revalidation loop for `cache` on the current runtime.
///
/// The first interval tick fires one `interval` after spawning, not
/// immediately; callers fetch the initial list themselves. The loop only
/// holds a weak handle to `bus`, so dropping every owner stops it.
#[must_use = "the loop stops when the handle is dropped"]
pub fn spawn(cache: ProductCache, bus: &EventBus, interval: Duration) -> RevalidationHandle {
    let mut events = bus.subscribe();
    let publisher = bus.downgrade();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), key = %cache.key(), "Revalidation loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if refresh(&cache, RefreshTrigger::Interval).await {
                        announce(&cache, &publisher);
                    }
                }
                result = events.recv() => {
                    let refreshed = match result {
                        Ok(event) => handle_event(&cache, &event).await,
                        Err(RecvError::Lagged(n)) => {
                            warn!(skipped = n, "Revalidation loop lagged, forcing revalidation");
                            revalidate(&cache, "lagged").await
                        }
                        Err(RecvError::Closed) => {
                            info!("Event bus closed, revalidation loop stopping");
                            break;
                        }
                    };
                    if refreshed {
                        announce(&cache, &publisher);
                    }
                }
            }
        }
    });

    RevalidationHandle { task }
}

/// Returns whether the pass succeeded.
async fn handle_event(cache: &ProductCache, event: &DashboardEvent) -> bool {
    match event {
        DashboardEvent::FocusRegained => refresh(cache, RefreshTrigger::Focus).await,
        DashboardEvent::Reconnected => refresh(cache, RefreshTrigger::Reconnect).await,
        e if e.forces_revalidation() => revalidate(cache, e.name()).await,
        _ => false,
    }
}

async fn refresh(cache: &ProductCache, trigger: RefreshTrigger) -> bool {
    match cache.refresh(trigger).await {
        Ok(_) => true,
        Err(e) => {
            log_failure(&e, &trigger.to_string());
            false
        }
    }
}

async fn revalidate(cache: &ProductCache, signal: &str) -> bool {
    debug!(signal, "Forcing revalidation");
    match cache.revalidate().await {
        Ok(_) => true,
        Err(e) => {
            log_failure(&e, signal);
            false
        }
    }
}

fn log_failure(e: &ClientError, cause: &str) {
    if e.is_transient() {
        warn!(cause, error = %e, "Revalidation failed, will retry on the next trigger");
    } else {
        error!(cause, error = %e, "Revalidation failed");
    }
}

fn announce(cache: &ProductCache, publisher: &WeakEventBus) {
    if let Some(bus) = publisher.upgrade() {
        bus.publish(DashboardEvent::ProductsRefreshed(cache.key()));
    }
}

/// Notification hub
///
/// Routes upload notifications to the live callbacks registered by connected
/// clients. Supports:
/// - Multiple concurrent callbacks per user
/// - Weak registrations that never keep a client connection alive
/// - Lazy pruning of dead registrations on dispatch
/// - Explicit unregistration through a `CallbackHandle`
use super::callback::NotificationCallback;
use crate::domain::Notification;
use crate::error::DeliveryError;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::{debug, warn};

struct Registration {
    id: u64,
    callback: Weak<dyn NotificationCallback>,
}

/// Identifies one callback registration so its owner can remove it on disconnect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackHandle {
    pub user_name: String,
    pub id: u64,
}

/// Outcome of one dispatch to a user's callbacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Outcome of a single isolated callback invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
    Disconnected,
}

/// Invoke one callback, containing errors and panics.
pub fn deliver_isolated(
    user_name: &str,
    callback: &dyn NotificationCallback,
    notification: &Arc<Notification>,
) -> DeliveryOutcome {
    match catch_unwind(AssertUnwindSafe(|| callback.deliver(notification))) {
        Ok(Ok(())) => DeliveryOutcome::Delivered,
        Ok(Err(DeliveryError::Disconnected)) => {
            debug!(user = %user_name, "callback disconnected");
            DeliveryOutcome::Disconnected
        }
        Ok(Err(e)) => {
            warn!(user = %user_name, notification_id = %notification.id, error = %e, "callback failed");
            DeliveryOutcome::Failed
        }
        Err(_) => {
            warn!(user = %user_name, notification_id = %notification.id, "callback panicked");
            DeliveryOutcome::Failed
        }
    }
}

/// Per-user registry of live notification callbacks
pub struct NotificationHub {
    /// Map of user name -> registrations, one per live connection
    callbacks: RwLock<HashMap<String, Vec<Registration>>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback for `user_name`.
    ///
    /// Only a weak reference is kept: the registration lives as long as the
    /// caller holds the `Arc`. Earlier registrations for the same user stay.
    ///
    /// # Arguments
    ///
    /// * `user_name` - The user whose uploads feed this callback
    /// * `callback` - The client callback; the caller keeps it alive
    ///
    /// # Returns
    ///
    /// A handle that can be passed to `unregister`
    pub async fn register(
        &self,
        user_name: &str,
        callback: &Arc<dyn NotificationCallback>,
    ) -> CallbackHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut callbacks = self.callbacks.write().await;
        callbacks
            .entry(user_name.to_string())
            .or_default()
            .push(Registration {
                id,
                callback: Arc::downgrade(callback),
            });

        debug!(user = %user_name, callback_id = id, "callback registered");
        CallbackHandle {
            user_name: user_name.to_string(),
            id,
        }
    }

    /// Remove a single registration
    ///
    /// # Arguments
    ///
    /// * `handle` - The handle returned by `register`
    ///
    /// # Returns
    ///
    /// `false` if the registration was already gone
    pub async fn unregister(&self, handle: &CallbackHandle) -> bool {
        let mut callbacks = self.callbacks.write().await;
        let Some(registrations) = callbacks.get_mut(&handle.user_name) else {
            return false;
        };

        let before = registrations.len();
        registrations.retain(|r| r.id != handle.id);
        let removed = registrations.len() != before;
        if registrations.is_empty() {
            callbacks.remove(&handle.user_name);
        }
        removed
    }

    /// Deliver `notification` to every live callback of `user_name`.
    ///
    /// Dead registrations are pruned while collecting. Callbacks run after the
    /// registry lock is released and each one is isolated from the others.
    ///
    /// # Arguments
    ///
    /// * `user_name` - The recipient user
    /// * `notification` - The upload notification
    ///
    /// # Returns
    ///
    /// Counts of delivered, failed and pruned registrations
    pub async fn notify(&self, user_name: &str, notification: &Arc<Notification>) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        let live = {
            let mut callbacks = self.callbacks.write().await;
            let Some(registrations) = callbacks.get_mut(user_name) else {
                return report;
            };

            let mut live = Vec::with_capacity(registrations.len());
            registrations.retain(|r| match r.callback.upgrade() {
                Some(callback) => {
                    live.push((r.id, callback));
                    true
                }
                None => {
                    report.pruned += 1;
                    false
                }
            });
            if registrations.is_empty() {
                callbacks.remove(user_name);
            }
            live
        };

        let mut disconnected = Vec::new();
        for (id, callback) in &live {
            match deliver_isolated(user_name, &**callback, notification) {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Failed => report.failed += 1,
                DeliveryOutcome::Disconnected => disconnected.push(*id),
            }
        }

        if !disconnected.is_empty() {
            let mut callbacks = self.callbacks.write().await;
            if let Some(registrations) = callbacks.get_mut(user_name) {
                registrations.retain(|r| !disconnected.contains(&r.id));
                if registrations.is_empty() {
                    callbacks.remove(user_name);
                }
            }
            report.pruned += disconnected.len();
        }

        if report.pruned > 0 {
            debug!(user = %user_name, pruned = report.pruned, "pruned dead callbacks");
        }
        report
    }

    /// Number of live callbacks for a user
    pub async fn connection_count(&self, user_name: &str) -> usize {
        let callbacks = self.callbacks.read().await;
        callbacks
            .get(user_name)
            .map(|v| v.iter().filter(|r| r.callback.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Total number of live callbacks
    pub async fn total_connections(&self) -> usize {
        let callbacks = self.callbacks.read().await;
        callbacks
            .values()
            .flatten()
            .filter(|r| r.callback.strong_count() > 0)
            .count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

//! In-process notification store
//!
//! A cheaply clonable handle over shared state. Every clone sees the same
//! notifications; all access is serialized through one mutex so ids stay
//! unique and read state only moves forward.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::types::SmartNotification;

#[derive(Default)]
struct StoreState {
    /// Oldest first by (timestamp, insertion); read back in reverse
    notifications: Vec<SmartNotification>,
    ids: HashSet<String>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<StoreState>,
    sweeping: AtomicBool,
}

#[derive(Clone, Default)]
pub struct NotificationStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore")
            .field("len", &self.len())
            .finish()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic mid-update cannot break the invariants we rely on, so keep going
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a notification. Returns false (and changes nothing) if a
    /// notification with the same id is already stored.
    pub fn add(&self, notification: SmartNotification) -> bool {
        let mut state = self.lock();
        if state.ids.contains(&notification.id) {
            debug!(id = %notification.id, "Ignoring notification with duplicate id");
            return false;
        }

        state.ids.insert(notification.id.clone());
        let pos = state
            .notifications
            .partition_point(|n| n.timestamp <= notification.timestamp);
        state.notifications.insert(pos, notification);
        true
    }

    /// Mark one notification read. Returns false for unknown ids.
    pub fn mark_as_read(&self, id: &str) -> bool {
        let mut state = self.lock();
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    /// Mark everything read; returns how many were unread
    pub fn mark_all_as_read(&self) -> usize {
        let mut state = self.lock();
        let mut changed = 0;
        for n in state.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }

    /// Remove a notification. Returns false for unknown ids.
    pub fn remove_notification(&self, id: &str) -> bool {
        let mut state = self.lock();
        if !state.ids.remove(id) {
            return false;
        }
        state.notifications.retain(|n| n.id != id);
        true
    }

    /// All live notifications, most recent first
    pub fn get_notifications(&self) -> Vec<SmartNotification> {
        self.lock().notifications.iter().rev().cloned().collect()
    }

    /// Unread notifications, most recent first
    pub fn get_unread_notifications(&self) -> Vec<SmartNotification> {
        self.lock()
            .notifications
            .iter()
            .rev()
            .filter(|n| !n.read)
            .cloned()
            .collect()
    }

    /// Notifications in one category, most recent first
    pub fn get_by_category(&self, category: &str) -> Vec<SmartNotification> {
        self.lock()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.category == category)
            .cloned()
            .collect()
    }

    /// Number of unread notifications
    pub fn get_notification_count(&self) -> usize {
        self.lock().notifications.iter().filter(|n| !n.read).count()
    }

    /// Number of live notifications, read or not
    pub fn len(&self) -> usize {
        self.lock().notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear_all(&self) {
        let mut state = self.lock();
        state.notifications.clear();
        state.ids.clear();
    }

    /// Remove notifications whose expiry has passed
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    /// Remove notifications with `now > expires_at`. A sweep that starts
    /// while another is running is skipped and reports 0.
    pub fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
        if self.shared.sweeping.swap(true, Ordering::AcqRel) {
            debug!("Cleanup sweep already running, skipping");
            return 0;
        }

        let removed = {
            let mut state = self.lock();
            let StoreState { notifications, ids } = &mut *state;
            let before = notifications.len();
            notifications.retain(|n| {
                let expired = n.is_expired_at(now);
                if expired {
                    ids.remove(&n.id);
                }
                !expired
            });
            before - notifications.len()
        };

        self.shared.sweeping.store(false, Ordering::Release);

        if removed > 0 {
            info!(removed, "Expired notifications removed");
        }
        removed
    }
}

//! Notification cache reducer.
//!
//! The store is the single source of truth the hosting application reads
//! from. All mutations are pure (no I/O) and come from exactly two places:
//! authoritative server frames routed by the engine, and the local-only
//! dismiss operation. The read-marking operations are invoked only on
//! server acknowledgement, never speculatively, which is what makes
//! duplicate or delayed acks harmless.

use tidings_proto::Notification;

/// In-memory notification cache: ordered list (newest first) plus an
/// unread counter.
///
/// The counter tracks the server's badge value, not the list contents:
/// [`NotificationStore::remove_local`] deliberately lets the two diverge
/// until the next snapshot, so a user can hide noise without claiming to
/// have read it. The counter can never go negative; every decrement
/// saturates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
    unread_count: u32,
}

impl NotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current notification list, newest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Current unread counter.
    #[must_use]
    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// Number of cached notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// True if no notifications are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Replace the entire cache with the server's snapshot.
    ///
    /// This is the sole reconciliation point: whatever local divergence
    /// accumulated (dismissed items, missed frames during an outage) is
    /// discarded in favor of the server's ground truth. Called on every
    /// fresh connection open, including reconnects.
    ///
    /// Id uniqueness is enforced here too: should a snapshot carry the
    /// same id twice, the later occurrence overwrites the earlier one in
    /// place, the same upsert policy [`NotificationStore::prepend`] uses.
    pub fn apply_snapshot(&mut self, notifications: Vec<Notification>, count: u32) {
        let mut list: Vec<Notification> = Vec::with_capacity(notifications.len());
        for notification in notifications {
            if let Some(existing) = list.iter_mut().find(|n| n.id == notification.id) {
                tracing::debug!(id = %notification.id, "duplicate id in snapshot, upserting");
                *existing = notification;
            } else {
                list.push(notification);
            }
        }
        self.notifications = list;
        self.unread_count = count;
    }

    /// Insert a freshly pushed notification at the head of the list.
    ///
    /// A fresh id increments the counter by exactly one, independent of
    /// the notification's own `is_read` flag; the server's absolute
    /// `unread_count` pushes and snapshots correct any drift that policy
    /// causes. An id already present is upserted in place instead of
    /// duplicated, and leaves the counter alone.
    pub fn prepend(&mut self, notification: Notification) {
        if let Some(existing) =
            self.notifications.iter_mut().find(|n| n.id == notification.id)
        {
            tracing::debug!(id = %notification.id, "duplicate notification id, upserting");
            *existing = notification;
            return;
        }

        self.notifications.insert(0, notification);
        self.unread_count += 1;
    }

    /// Overwrite the counter with a server-pushed absolute value.
    pub fn set_unread_count(&mut self, count: u32) {
        self.unread_count = count;
    }

    /// Apply a `mark_read_success` acknowledgement.
    ///
    /// Decrements the counter only on the unread-to-read edge, so a
    /// duplicate or delayed ack for the same id is a counter no-op. An id
    /// the cache does not hold (e.g. dismissed locally before the ack
    /// arrived) is ignored.
    pub fn mark_read(&mut self, notification_id: &str) {
        let Some(entry) = self.notifications.iter_mut().find(|n| n.id == notification_id) else {
            tracing::debug!(id = %notification_id, "ack for unknown notification, ignoring");
            return;
        };

        if !entry.is_read {
            entry.is_read = true;
            self.unread_count = self.unread_count.saturating_sub(1);
        }
    }

    /// Apply a `mark_all_read_success` acknowledgement.
    pub fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.is_read = true;
        }
        self.unread_count = 0;
    }

    /// Remove a notification from the visible list without telling the
    /// server and without touching the counter.
    ///
    /// The counter/list divergence this creates is intentional and lasts
    /// until the next snapshot.
    pub fn remove_local(&mut self, notification_id: &str) {
        self.notifications.retain(|n| n.id != notification_id);
    }
}

#[cfg(test)]
mod tests {
    use tidings_proto::NotificationKind;

    use super::*;

    fn notification(id: &str, is_read: bool) -> Notification {
        Notification {
            id: id.into(),
            kind: NotificationKind::Reply,
            title: format!("title {id}"),
            message: "body".into(),
            sender: None,
            community: None,
            post: None,
            redirect_url: None,
            is_read,
            created_at: "2026-08-01T12:00:00Z".into(),
        }
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut store = NotificationStore::new();
        store.prepend(notification("a", false));
        store.prepend(notification("b", false));
        store.remove_local("a");

        store.apply_snapshot(vec![notification("x", false), notification("y", false)], 2);

        let ids: Vec<&str> = store.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["x", "y"]);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn snapshot_with_repeated_id_keeps_one_entry() {
        let mut store = NotificationStore::new();

        let mut fresher = notification("n1", true);
        fresher.title = "edited".into();
        store.apply_snapshot(
            vec![notification("n1", false), notification("n2", false), fresher],
            2,
        );

        let ids: Vec<&str> = store.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["n1", "n2"]);
        assert_eq!(store.notifications()[0].title, "edited");
        assert!(store.notifications()[0].is_read);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn prepend_is_newest_first() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));
        store.prepend(notification("2", false));

        let ids: Vec<&str> = store.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn prepend_counts_already_read_arrivals() {
        // Literal counter contract: arrival increments, not unreadness.
        let mut store = NotificationStore::new();
        store.prepend(notification("1", true));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn duplicate_id_upserts_without_double_count() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));

        let mut updated = notification("1", false);
        updated.title = "edited".into();
        store.prepend(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.notifications()[0].title, "edited");
    }

    #[test]
    fn duplicate_ack_is_idempotent() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));
        store.prepend(notification("2", false));

        store.mark_read("1");
        let after_first = store.unread_count();
        store.mark_read("1");

        assert_eq!(store.unread_count(), after_first);
        assert_eq!(after_first, 1);
    }

    #[test]
    fn ack_for_unknown_id_is_ignored() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));
        store.mark_read("ghost");
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn counter_saturates_at_zero() {
        let mut store = NotificationStore::new();
        store.apply_snapshot(vec![notification("1", false)], 0);
        store.mark_read("1");
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn mark_all_read_zeroes_counter() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));
        store.prepend(notification("2", false));

        store.mark_all_read();

        assert_eq!(store.unread_count(), 0);
        assert!(store.notifications().iter().all(|n| n.is_read));
    }

    #[test]
    fn remove_local_leaves_counter_untouched() {
        let mut store = NotificationStore::new();
        store.prepend(notification("1", false));
        store.prepend(notification("2", false));
        let before = store.unread_count();

        store.remove_local("1");

        assert_eq!(store.len(), 1);
        assert_eq!(store.unread_count(), before);
    }
}

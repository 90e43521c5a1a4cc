//! Side-effect seam for new-notification arrivals.

use tidings_proto::Notification;

/// Consumer of new-notification side effects.
///
/// Implementations typically play a sound and/or raise a desktop
/// notification with the item's title, message and an icon picked from
/// its category. The sink owns no state the engine depends on and is
/// invoked exactly once per `new_notification` frame, never for
/// snapshots or acknowledgements.
pub trait NotificationSink {
    /// A new notification arrived over the live feed.
    fn on_new_notification(&mut self, notification: &Notification);
}

/// Sink that does nothing. Useful for headless embeddings and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn on_new_notification(&mut self, _notification: &Notification) {}
}

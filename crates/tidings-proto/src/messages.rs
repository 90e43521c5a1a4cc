//! Message types for the notification feed protocol.
//!
//! These types mirror the JSON frames exchanged with the server. The core
//! treats almost every field as opaque display data; the only fields it
//! interprets are `id`, `is_read`, and the frame discriminators.

use serde::{Deserialize, Serialize};

/// Category of a notification.
///
/// Used only for presentation routing (icon/sound selection) by consumers;
/// the sync core never branches on it. Unknown categories sent by a newer
/// server decode to [`NotificationKind::Unknown`] so the rest of the frame
/// still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new post was published in a followed community.
    NewPost,
    /// Someone replied to the user's post or comment.
    Reply,
    /// Someone liked the user's content.
    Like,
    /// Someone joined a community the user moderates.
    Join,
    /// Platform announcement.
    System,
    /// Category not known to this client version.
    #[serde(other)]
    Unknown,
}

/// Weak reference to the user that triggered a notification.
///
/// Carried verbatim for display; never dereferenced or validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Server-assigned user id.
    pub id: String,
    /// Display name, if the server included one.
    #[serde(default)]
    pub username: Option<String>,
}

/// Weak reference to a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRef {
    /// Server-assigned community id.
    pub id: String,
    /// Display name, if the server included one.
    #[serde(default)]
    pub name: Option<String>,
}

/// Weak reference to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    /// Server-assigned post id.
    pub id: String,
    /// Post title, if the server included one.
    #[serde(default)]
    pub title: Option<String>,
}

/// One server-pushed notification.
///
/// `id` is unique within the feed and immutable once created. `is_read`
/// is mutated only by the sync core in response to server acknowledgements,
/// never directly by consumers. `created_at` is an opaque timestamp string
/// used for display; list order is arrival order, not a re-sort by this
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Opaque unique id, server-assigned.
    pub id: String,
    /// Presentation category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display title.
    pub title: String,
    /// Display body.
    pub message: String,
    /// User that triggered the notification, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserRef>,
    /// Community the notification relates to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityRef>,
    /// Post the notification relates to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostRef>,
    /// Navigation target for consumers; opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Whether the server considers this notification read.
    #[serde(default)]
    pub is_read: bool,
    /// Creation timestamp, opaque display string.
    pub created_at: String,
}

/// Outbound client request, discriminated by `action`.
///
/// # Protocol Flow
///
/// Requests are fire-and-forget: the client sends them only while the
/// transport is open and applies no local state change until the matching
/// acknowledgement frame arrives. There is no per-request correlation id;
/// acknowledgements are matched by notification id and frame kind alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Ask the server to push the current unread count (and, on a fresh
    /// connection, the full notification snapshot).
    GetUnreadCount,
    /// Ask the server to mark one notification read.
    MarkAsRead {
        /// Id of the notification to mark.
        notification_id: String,
    },
    /// Ask the server to mark every notification read.
    MarkAllAsRead,
}

/// Inbound server frame, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Authoritative snapshot of the whole feed, pushed on connect.
    ///
    /// Replaces any local state wholesale; this is the reconciliation
    /// point after a reconnect.
    InitialNotifications {
        /// Full notification list, newest first.
        notifications: Vec<Notification>,
        /// Authoritative unread count.
        count: u32,
    },
    /// A single new notification arrived.
    NewNotification {
        /// The notification that arrived.
        notification: Notification,
    },
    /// Absolute unread count push.
    UnreadCount {
        /// Authoritative unread count.
        count: u32,
    },
    /// Acknowledgement of a `mark_as_read` request.
    MarkReadSuccess {
        /// Id of the notification the server marked read.
        notification_id: String,
    },
    /// Acknowledgement of a `mark_all_as_read` request.
    MarkAllReadSuccess,
    /// Server-side error report. Logged by the client; carries no state.
    Error {
        /// Human-readable description from the server.
        message: String,
    },
}

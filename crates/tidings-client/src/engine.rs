//! Event/action engine composing the store and the connection machine.
//!
//! The engine is the single entry point for everything that can happen to
//! the feed: session lifecycle calls, transport callbacks, inbound
//! frames, and user intents. Each event produces a list of actions for
//! the driver to execute; the engine itself performs no I/O.
//!
//! # Data flow
//!
//! ```text
//! transport frames ─> decode ─> store mutations ─> UI reads store
//!                        │
//!                        └────> EmitNotification ─> sink (sound/desktop)
//!
//! user intents ─> outbound requests (ack-gated: the store mutates only
//!                 when the matching success frame comes back)
//! ```

use std::time::Duration;

use tidings_core::{Connection, ConnectionAction, ConnectionConfig, ConnectionState,
    NotificationStore};
use tidings_proto::{ClientRequest, Notification, ServerFrame, codec};

/// Everything that can happen to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The hosting session wants the feed connected.
    Connect {
        /// Bearer token from the session/auth layer. An empty token
        /// aborts the attempt; no retry is scheduled.
        token: String,
    },
    /// The hosting session is shutting the feed down.
    Disconnect,
    /// The transport reported open.
    TransportOpened,
    /// The transport reported an error. A close event is expected to
    /// follow.
    TransportError,
    /// The transport closed.
    TransportClosed {
        /// True when the close carried the normal (intentional) code.
        normal: bool,
    },
    /// The reconnect timer fired.
    ReconnectDue,
    /// A raw text frame arrived from the server.
    FrameReceived {
        /// The frame body, expected to be JSON.
        raw: String,
    },
    /// User intent: mark one notification read. Ack-gated; no local
    /// mutation happens until the server confirms.
    MarkAsRead {
        /// Id of the notification to mark.
        notification_id: String,
    },
    /// User intent: mark everything read. Ack-gated.
    MarkAllAsRead,
    /// User intent: hide one notification locally. Sends nothing and
    /// leaves the unread counter alone.
    DismissLocally {
        /// Id of the notification to hide.
        notification_id: String,
    },
}

/// Actions for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineAction {
    /// Open a transport to this URL.
    OpenTransport {
        /// Fully formed endpoint URL including the auth token.
        url: String,
    },
    /// Write this already-encoded text frame to the open transport.
    SendFrame(String),
    /// Close the transport with a normal close code.
    CloseTransport,
    /// Arm the single reconnect timer.
    ScheduleReconnect {
        /// Fixed delay before the attempt.
        delay: Duration,
    },
    /// Drop the pending reconnect timer, if any.
    CancelReconnect,
    /// Hand a freshly arrived notification to the side-effect sink.
    EmitNotification(Notification),
}

/// The synchronization engine.
///
/// Owns the notification store (the state consumers read) and the
/// connection lifecycle machine. One engine exists per authenticated
/// session; dropping it tears the aggregate down.
#[derive(Debug)]
pub struct Engine {
    store: NotificationStore,
    connection: Connection,
}

impl Engine {
    /// Create an engine with an empty store.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { store: NotificationStore::new(), connection: Connection::new(config) }
    }

    /// The store consumers render from.
    #[must_use]
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Current connection lifecycle state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// True while the live feed is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_open()
    }

    /// Process one event and return the actions it produced.
    pub fn handle(&mut self, event: EngineEvent) -> Vec<EngineAction> {
        match event {
            EngineEvent::Connect { token } => {
                let actions = self.connection.connect(&token);
                self.lower(actions)
            },
            EngineEvent::Disconnect => {
                let actions = self.connection.disconnect();
                self.lower(actions)
            },
            EngineEvent::TransportOpened => {
                let actions = self.connection.transport_opened();
                self.lower(actions)
            },
            EngineEvent::TransportError => {
                let actions = self.connection.transport_error();
                self.lower(actions)
            },
            EngineEvent::TransportClosed { normal } => {
                let actions = self.connection.transport_closed(normal);
                self.lower(actions)
            },
            EngineEvent::ReconnectDue => {
                let actions = self.connection.reconnect_due();
                self.lower(actions)
            },
            EngineEvent::FrameReceived { raw } => self.handle_frame(&raw),
            EngineEvent::MarkAsRead { notification_id } => {
                let actions = self.connection.send(ClientRequest::MarkAsRead { notification_id });
                self.lower(actions)
            },
            EngineEvent::MarkAllAsRead => {
                let actions = self.connection.send(ClientRequest::MarkAllAsRead);
                self.lower(actions)
            },
            EngineEvent::DismissLocally { notification_id } => {
                self.store.remove_local(&notification_id);
                Vec::new()
            },
        }
    }

    /// Decode and route one inbound frame.
    ///
    /// A frame that fails to decode is logged and dropped with all state
    /// untouched; the connection stays open.
    fn handle_frame(&mut self, raw: &str) -> Vec<EngineAction> {
        let frame = match codec::decode(raw) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "dropping undecodable frame");
                return Vec::new();
            },
        };

        match frame {
            ServerFrame::InitialNotifications { notifications, count } => {
                self.store.apply_snapshot(notifications, count);
                Vec::new()
            },
            ServerFrame::NewNotification { notification } => {
                self.store.prepend(notification.clone());
                vec![EngineAction::EmitNotification(notification)]
            },
            ServerFrame::UnreadCount { count } => {
                self.store.set_unread_count(count);
                Vec::new()
            },
            ServerFrame::MarkReadSuccess { notification_id } => {
                self.store.mark_read(&notification_id);
                Vec::new()
            },
            ServerFrame::MarkAllReadSuccess => {
                self.store.mark_all_read();
                Vec::new()
            },
            ServerFrame::Error { message } => {
                // Acknowledged gap: surfaced in logs only, not to the UI.
                tracing::warn!(%message, "server error frame");
                Vec::new()
            },
        }
    }

    /// Translate connection actions into driver actions, encoding
    /// outbound requests on the way through.
    fn lower(&self, actions: Vec<ConnectionAction>) -> Vec<EngineAction> {
        actions
            .into_iter()
            .filter_map(|action| match action {
                ConnectionAction::OpenTransport { url } => {
                    Some(EngineAction::OpenTransport { url })
                },
                ConnectionAction::SendFrame(request) => match codec::encode(&request) {
                    Ok(text) => Some(EngineAction::SendFrame(text)),
                    Err(err) => {
                        tracing::error!(%err, ?request, "encode failed, dropping request");
                        None
                    },
                },
                ConnectionAction::CloseTransport => Some(EngineAction::CloseTransport),
                ConnectionAction::ScheduleReconnect { delay } => {
                    Some(EngineAction::ScheduleReconnect { delay })
                },
                ConnectionAction::CancelReconnect => Some(EngineAction::CancelReconnect),
            })
            .collect()
    }
}

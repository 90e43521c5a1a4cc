//! Production WebSocket driver for the engine.
//!
//! Owns the single transport and the single reconnect timer, feeds
//! transport callbacks into the [`Engine`], and executes the actions the
//! engine returns. All failure handling stays inside this module: no
//! method returns an error, connection failures degrade to a
//! disconnected engine that self-heals through the reconnect timer.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{SinkExt, StreamExt};
use tidings_core::{ConnectionState, NotificationStore};
use tokio::net::TcpStream;
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::engine::{Engine, EngineAction, EngineEvent};
use crate::sink::NotificationSink;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What woke the poll loop.
enum Wake {
    Stream(Option<Result<Message, WsError>>),
    Timer,
}

/// Driver owning the engine, the socket, and the reconnect timer.
///
/// Invariants enforced here rather than by the state machine: at most one
/// `WebSocketStream` and at most one armed `Sleep` exist at any time, and
/// dropping the manager (or calling [`ConnectionManager::disconnect`])
/// drops both, so no timer can fire after disposal.
///
/// The manager is single-task by construction: callers invoke its methods
/// and [`ConnectionManager::poll`] from one task, matching the
/// event-queue execution model the state machines assume.
pub struct ConnectionManager<S: NotificationSink> {
    engine: Engine,
    sink: S,
    socket: Option<WsStream>,
    reconnect: Option<Pin<Box<Sleep>>>,
}

impl<S: NotificationSink> ConnectionManager<S> {
    /// Create a disconnected manager around an engine and a sink.
    pub fn new(engine: Engine, sink: S) -> Self {
        Self { engine, sink, socket: None, reconnect: None }
    }

    /// The store consumers render from.
    #[must_use]
    pub fn store(&self) -> &NotificationStore {
        self.engine.store()
    }

    /// Current connection lifecycle state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.engine.connection_state()
    }

    /// True while the live feed is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// Connect with the given auth token. No-op while an attempt is in
    /// flight or the feed is already connected.
    pub async fn connect(&mut self, token: &str) {
        self.dispatch(EngineEvent::Connect { token: token.to_string() }).await;
    }

    /// Intentional shutdown: cancels any pending reconnect and closes the
    /// transport with a normal close code. Must be called by the hosting
    /// session lifecycle (logout, teardown).
    pub async fn disconnect(&mut self) {
        self.dispatch(EngineEvent::Disconnect).await;
    }

    /// Request that the server mark one notification read. The local
    /// store mutates only when the acknowledgement frame arrives.
    pub async fn mark_as_read(&mut self, notification_id: &str) {
        self.dispatch(EngineEvent::MarkAsRead { notification_id: notification_id.to_string() })
            .await;
    }

    /// Request that the server mark every notification read. Ack-gated
    /// like [`ConnectionManager::mark_as_read`].
    pub async fn mark_all_as_read(&mut self) {
        self.dispatch(EngineEvent::MarkAllAsRead).await;
    }

    /// Hide one notification locally. Sends nothing; the unread counter
    /// is deliberately left alone.
    pub fn dismiss_locally(&mut self, notification_id: &str) {
        // Produces no actions, so no dispatch round-trip is needed.
        let actions =
            self.engine.handle(EngineEvent::DismissLocally { notification_id: notification_id.to_string() });
        debug_assert!(actions.is_empty());
    }

    /// Wait for and process the next transport or timer event.
    ///
    /// Returns `false` immediately when there is nothing to wait on (no
    /// socket, no timer); callers should then wait for an external
    /// `connect` before polling again.
    pub async fn poll(&mut self) -> bool {
        let wake = match (self.socket.as_mut(), self.reconnect.as_mut()) {
            (None, None) => return false,
            (Some(ws), None) => Wake::Stream(ws.next().await),
            (None, Some(timer)) => {
                timer.as_mut().await;
                Wake::Timer
            },
            (Some(ws), Some(timer)) => tokio::select! {
                msg = ws.next() => Wake::Stream(msg),
                () = timer.as_mut() => Wake::Timer,
            },
        };

        match wake {
            Wake::Timer => {
                self.reconnect = None;
                self.dispatch(EngineEvent::ReconnectDue).await;
            },
            Wake::Stream(Some(Ok(Message::Text(text)))) => {
                self.dispatch(EngineEvent::FrameReceived { raw: text }).await;
            },
            Wake::Stream(Some(Ok(Message::Close(frame)))) => {
                let normal = frame.as_ref().is_some_and(|f| f.code == CloseCode::Normal);
                self.socket = None;
                self.dispatch(EngineEvent::TransportClosed { normal }).await;
            },
            // Ping/pong are answered by the protocol layer; binary frames
            // have no meaning on this feed.
            Wake::Stream(Some(Ok(_))) => {},
            Wake::Stream(Some(Err(err))) => {
                tracing::warn!(%err, "transport stream error");
                self.socket = None;
                self.dispatch(EngineEvent::TransportError).await;
                self.dispatch(EngineEvent::TransportClosed { normal: false }).await;
            },
            Wake::Stream(None) => {
                self.socket = None;
                self.dispatch(EngineEvent::TransportClosed { normal: false }).await;
            },
        }

        true
    }

    /// Run one event through the engine and execute the resulting
    /// actions, feeding follow-up events (open succeeded/failed) back in.
    async fn dispatch(&mut self, event: EngineEvent) {
        let mut queue: VecDeque<EngineAction> = self.engine.handle(event).into();

        while let Some(action) = queue.pop_front() {
            match action {
                EngineAction::OpenTransport { url } => {
                    if self.socket.is_some() {
                        tracing::debug!("transport already present, skipping open");
                        continue;
                    }
                    match connect_async(&url).await {
                        Ok((ws, _response)) => {
                            self.socket = Some(ws);
                            queue.extend(self.engine.handle(EngineEvent::TransportOpened));
                        },
                        Err(err) => {
                            tracing::warn!(%err, "transport open failed");
                            queue.extend(self.engine.handle(EngineEvent::TransportError));
                            queue.extend(
                                self.engine.handle(EngineEvent::TransportClosed { normal: false }),
                            );
                        },
                    }
                },
                EngineAction::SendFrame(text) => {
                    let Some(ws) = self.socket.as_mut() else {
                        tracing::debug!("send with no transport, dropping frame");
                        continue;
                    };
                    if let Err(err) = ws.send(Message::Text(text)).await {
                        // The close event surfaces through the stream.
                        tracing::warn!(%err, "transport send failed");
                    }
                },
                EngineAction::CloseTransport => {
                    if let Some(mut ws) = self.socket.take() {
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: "client shutdown".into(),
                        };
                        if let Err(err) = ws.close(Some(frame)).await {
                            tracing::debug!(%err, "close handshake failed");
                        }
                    }
                },
                EngineAction::ScheduleReconnect { delay } => {
                    self.reconnect = Some(Box::pin(tokio::time::sleep(delay)));
                },
                EngineAction::CancelReconnect => {
                    // Dropping the sleep is the cancellation.
                    self.reconnect = None;
                },
                EngineAction::EmitNotification(notification) => {
                    self.sink.on_new_notification(&notification);
                },
            }
        }
    }
}

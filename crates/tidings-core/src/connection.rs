//! Connection lifecycle state machine.
//!
//! This module implements the session layer - managing connection
//! lifecycle, the single-attempt guard, and the reconnection policy.
//!
//! # Architecture: Action-Based State Machine
//!
//! The state machine follows the action pattern:
//! - Methods accept lifecycle events and return `Vec<ConnectionAction>`
//! - Driver code executes actions (open the transport, send frames,
//!   arm or drop the reconnect timer)
//!
//! This enables:
//! - Pure lifecycle logic (no I/O, no timers)
//! - Easy testing (no mocking sockets or clocks)
//! - A hard "never throw" boundary: invalid transitions are logged no-ops
//!
//! # State Machine
//!
//! ```text
//!           connect(token)        opened
//! ┌──────┐ ───────────────> ┌────────────┐ ──────> ┌──────┐
//! │ Idle │                  │ Connecting │         │ Open │
//! └──────┘                  └────────────┘         └──────┘
//!                                 ▲                    │
//!                  reconnect_due  │       closed(abnormal)
//!                                 │                    ▼
//!                          ┌──────────────┐     closed(normal)
//!                          │ Reconnecting │ <──┐      │
//!                          └──────────────┘    │      ▼
//!                                              │  ┌────────┐
//!                                              └──│ Closed │ (terminal)
//!                                                 └────────┘
//! ```
//!
//! # Invariants
//!
//! - At most one connection attempt is in flight: `Connecting` and `Open`
//!   swallow further `connect` calls.
//! - At most one reconnect is scheduled: a second abnormal close while a
//!   timer is pending schedules nothing.
//! - `Closed` after an intentional shutdown is terminal; no timer may
//!   fire into it.

use std::time::Duration;

use tidings_proto::ClientRequest;

/// Actions returned by the connection state machine.
///
/// The driver (production WebSocket runtime or a unit test) executes
/// these actions; the machine itself performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a transport to this URL.
    OpenTransport {
        /// Fully formed endpoint URL including the auth token.
        url: String,
    },

    /// Send this request over the open transport.
    SendFrame(ClientRequest),

    /// Close the transport with a normal (intentional) close code.
    CloseTransport,

    /// Arm the single reconnect timer.
    ScheduleReconnect {
        /// Fixed delay before the attempt.
        delay: Duration,
    },

    /// Drop the pending reconnect timer, if any.
    CancelReconnect,
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, no attempt in flight.
    Idle,
    /// Transport opening; further `connect` calls are ignored.
    Connecting,
    /// Transport open; frames may be sent.
    Open,
    /// Abnormally closed, waiting for the reconnect timer.
    Reconnecting,
    /// Intentionally closed. Terminal.
    Closed,
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Feed endpoint; the auth token is appended as a query parameter.
    pub endpoint: String,
    /// Fixed delay between an abnormal close and the reconnect attempt.
    pub reconnect_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8000/ws/notifications/".to_string(),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// Connection lifecycle state machine.
///
/// Owns no transport handle and arms no timers; it only decides. The
/// token supplied to [`Connection::connect`] is retained so a later
/// [`Connection::reconnect_due`] can rebuild the URL without asking the
/// session layer again.
#[derive(Debug, Clone)]
pub struct Connection {
    state: ConnectionState,
    config: ConnectionConfig,
    token: Option<String>,
    reconnect_pending: bool,
}

impl Connection {
    /// Create a new connection machine in `Idle`.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { state: ConnectionState::Idle, config, token: None, reconnect_pending: false }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True while frames can be sent.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// True while a reconnect timer is armed.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Request a connection with the given auth token.
    ///
    /// No-op while an attempt is already in flight or the transport is
    /// open. An empty token aborts before any transport action and does
    /// not schedule a retry; the session layer must call again once it
    /// holds a token. Called during `Reconnecting`, this cancels the
    /// pending timer and starts the attempt immediately.
    pub fn connect(&mut self, token: &str) -> Vec<ConnectionAction> {
        if token.is_empty() {
            tracing::warn!("connect without auth token, aborting");
            return Vec::new();
        }

        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                tracing::debug!(state = ?self.state, "connect ignored, attempt already live");
                return Vec::new();
            },
            ConnectionState::Idle | ConnectionState::Reconnecting | ConnectionState::Closed => {},
        }

        let mut actions = Vec::new();
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(ConnectionAction::CancelReconnect);
        }

        self.token = Some(token.to_string());
        self.state = ConnectionState::Connecting;
        actions.push(ConnectionAction::OpenTransport { url: self.url(token) });
        actions
    }

    /// The transport reported open.
    ///
    /// Leaves the guard state and immediately requests a count/snapshot
    /// refresh so the server's ground truth overwrites whatever the cache
    /// held before the (re)connect. Only valid while `Connecting`; an
    /// open event in any other state (a late event after shutdown, say)
    /// is a logged no-op like every other stray event.
    pub fn transport_opened(&mut self) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            tracing::debug!(state = ?self.state, "unexpected transport open, ignoring");
            return Vec::new();
        }
        self.state = ConnectionState::Open;
        vec![ConnectionAction::SendFrame(ClientRequest::GetUnreadCount)]
    }

    /// The transport reported an error.
    ///
    /// Clears the in-flight guard but closes nothing itself; the
    /// platform's close event follows and drives the actual transition.
    pub fn transport_error(&mut self) -> Vec<ConnectionAction> {
        tracing::warn!(state = ?self.state, "transport error");
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Idle;
        }
        Vec::new()
    }

    /// The transport closed.
    ///
    /// A normal closure is terminal and suppresses any pending reconnect.
    /// An abnormal closure schedules exactly one reconnect attempt after
    /// the configured delay.
    pub fn transport_closed(&mut self, normal: bool) -> Vec<ConnectionAction> {
        if normal || self.state == ConnectionState::Closed {
            self.state = ConnectionState::Closed;
            if self.reconnect_pending {
                self.reconnect_pending = false;
                return vec![ConnectionAction::CancelReconnect];
            }
            return Vec::new();
        }

        self.state = ConnectionState::Reconnecting;
        if self.reconnect_pending {
            return Vec::new();
        }

        self.reconnect_pending = true;
        tracing::info!(delay = ?self.config.reconnect_delay, "scheduling reconnect");
        vec![ConnectionAction::ScheduleReconnect { delay: self.config.reconnect_delay }]
    }

    /// The reconnect timer fired.
    ///
    /// Reuses the token captured at `connect` time. No-ops if the session
    /// was shut down while the timer was in flight (the driver should
    /// have dropped the timer, this is the backstop) or if no token is
    /// held.
    pub fn reconnect_due(&mut self) -> Vec<ConnectionAction> {
        self.reconnect_pending = false;

        if self.state != ConnectionState::Reconnecting {
            tracing::debug!(state = ?self.state, "reconnect timer fired in wrong state, ignoring");
            return Vec::new();
        }

        match self.token.clone() {
            Some(token) if !token.is_empty() => {
                self.state = ConnectionState::Connecting;
                vec![ConnectionAction::OpenTransport { url: self.url(&token) }]
            },
            _ => {
                self.state = ConnectionState::Idle;
                Vec::new()
            },
        }
    }

    /// Intentional shutdown by the hosting session.
    ///
    /// Terminal: drops any pending reconnect and closes the transport
    /// with a normal close code so the peer (and this machine's own close
    /// handler) knows not to resurrect the connection.
    pub fn disconnect(&mut self) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();

        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(ConnectionAction::CancelReconnect);
        }

        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            actions.push(ConnectionAction::CloseTransport);
        }

        self.state = ConnectionState::Closed;
        actions
    }

    /// Send a request if the transport is open.
    ///
    /// Anything else is a silent drop: never an error, never a queue.
    pub fn send(&self, request: ClientRequest) -> Vec<ConnectionAction> {
        if self.state == ConnectionState::Open {
            vec![ConnectionAction::SendFrame(request)]
        } else {
            tracing::debug!(state = ?self.state, ?request, "send dropped, transport not open");
            Vec::new()
        }
    }

    fn url(&self, token: &str) -> String {
        format!("{}?token={}", self.config.endpoint, token)
    }
}

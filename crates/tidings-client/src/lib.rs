//! Client engine for the Tidings notification feed.
//!
//! Composes the pure state machines from `tidings-core` into a single
//! event-driven engine, and optionally (behind the `transport` feature)
//! provides the production WebSocket driver that executes the engine's
//! actions.
//!
//! # Components
//!
//! - [`Engine`]: event/action state machine (connection lifecycle, frame
//!   routing, ack-gated mutation coordination)
//! - [`NotificationSink`]: seam for per-arrival side effects (sound,
//!   desktop notification)
//! - `ConnectionManager` (feature `transport`): tokio + WebSocket driver
//!   owning the socket and the reconnect timer
//!
//! # Failure contract
//!
//! Nothing in this crate returns an error or panics at the public
//! boundary. Malformed frames are logged and dropped, transport failures
//! degrade to a disconnected state that self-heals via reconnection, and
//! sends while disconnected are silent no-ops.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
#[cfg(feature = "transport")]
mod manager;
mod sink;

pub use engine::{Engine, EngineAction, EngineEvent};
#[cfg(feature = "transport")]
pub use manager::ConnectionManager;
pub use sink::{NotificationSink, NullSink};

//! Tidings synchronization core
//!
//! Pure state machine logic for keeping a local notification cache
//! consistent with a server-authoritative feed, completely decoupled from
//! I/O. This enables deterministic testing of every lifecycle and
//! reconciliation path without a socket or a clock.
//!
//! # Architecture
//!
//! Logic in this crate is implemented as deterministic state machines
//! isolated from I/O, time, and scheduling. State transitions produce
//! declarative actions that describe intended effects (open a transport,
//! send a frame, schedule a reconnect) rather than executing them
//! directly. A runtime driver is responsible for interpreting and
//! executing these actions.
//!
//! This separation keeps correctness concerns (idempotent acknowledgement
//! handling, single-reconnect scheduling, snapshot reconciliation)
//! independent of execution concerns, and allows the same code to run
//! under a production WebSocket driver and in plain unit tests.
//!
//! # Components
//!
//! - [`store`]: Notification cache reducer (snapshot, prepend, ack-driven
//!   read marking, local dismiss)
//! - [`connection`]: Connection lifecycle state machine (guarded connect,
//!   reconnect policy, graceful shutdown)
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod connection;
pub mod store;

pub use connection::{Connection, ConnectionAction, ConnectionConfig, ConnectionState};
pub use store::NotificationStore;

//! Wire format for the Tidings notification feed.
//!
//! Frames are single JSON text messages over a persistent duplex
//! connection. Outbound frames are discriminated by an `action` field,
//! inbound frames by a `type` field. The payloads are self-describing, so
//! unlike a binary framing layer there is no header to validate; the codec
//! only has to reject frames whose discriminator or shape it does not
//! recognize.
//!
//! # Robustness
//!
//! The server feed is authoritative but not trusted to be well-formed:
//! [`codec::decode`] returns an error for malformed or unrecognized frames
//! instead of panicking, and unknown notification categories decode to
//! [`messages::NotificationKind::Unknown`] rather than failing the whole
//! frame. A single bad frame never costs more than itself.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod errors;
pub mod messages;

pub use codec::{decode, encode};
pub use errors::{ProtocolError, Result};
pub use messages::{
    ClientRequest, CommunityRef, Notification, NotificationKind, PostRef, ServerFrame, UserRef,
};

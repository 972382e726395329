//! Event Gateway boundary.
//!
//! The transport is an opaque pub/sub channel: it deserializes inbound
//! payloads into [`ClientMessage`], hands them to [`GameService`], and
//! publishes whatever comes back - the private reply from `handle` plus
//! the broadcast [`GameEvent`]s arriving on the events channel. The
//! engine never initiates network I/O.

pub mod dispatch;
pub mod messages;

pub use dispatch::GameService;
pub use messages::{ClientAction, ClientMessage, ErrorReply, ServerMessage};

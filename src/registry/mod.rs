//! Session registry with one async actor per game.
//!
//! This module implements:
//! - `SessionActor`: single-writer task owning one game session
//! - `SessionRegistry`: keyed store of live sessions, spawn and lookup
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each game runs in its own tokio task with an mpsc inbox; the inbox
//! is the serialization point required of an authoritative server, so
//! two operations against the same game can never interleave while
//! operations against different games proceed in parallel. Replies
//! travel back on oneshot channels; broadcast events go out on the
//! gateway channel every actor holds a sender for.

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use manager::SessionRegistry;
pub use messages::SessionMessage;

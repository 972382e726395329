//! Session actor message types.

use tokio::sync::oneshot;

use crate::game::session::{Credits, GameSession, SessionResult, UserId};

/// Messages that can be sent to a `SessionActor`. Mutating operations
/// reply with the updated session snapshot so the gateway can publish
/// it without a second round-trip.
#[derive(Debug)]
pub enum SessionMessage {
    /// Join the game, buying one card.
    Join {
        user_id: UserId,
        /// Caller's ledger balance, fetched by the gateway before send.
        balance: Credits,
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Start the game (organizer only).
    Start {
        user_id: UserId,
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Call one number (organizer only).
    CallNumber {
        user_id: UserId,
        number: u8,
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Mark a cell on one of the caller's cards.
    MarkNumber {
        user_id: UserId,
        card_index: usize,
        row: usize,
        col: usize,
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Claim bingo on one of the caller's cards.
    ClaimBingo {
        user_id: UserId,
        card_index: usize,
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Record that the prize payout has landed on the ledger.
    MarkPaidOut {
        reply: oneshot::Sender<SessionResult<GameSession>>,
    },

    /// Read the current session state.
    Snapshot {
        reply: oneshot::Sender<GameSession>,
    },

    /// Validate and accept deletion (organizer only, waiting only).
    /// On success the actor stops; the registry drops the handle.
    Delete {
        user_id: UserId,
        reply: oneshot::Sender<SessionResult<()>>,
    },
}

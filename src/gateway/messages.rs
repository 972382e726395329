use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::session::{
    GameEvent, GameId, GameSession, GameSettings, SessionError, UserId,
};
use crate::ledger::LedgerError;

/// An action a connected user asks the engine to perform. One variant
/// per session operation, so the transport-to-engine boundary is
/// exhaustively checked at compile time instead of shaped by hand per
/// handler.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ClientAction {
    /// Create a new game with the caller as organizer.
    CreateGame {
        organizer_name: String,
        settings: GameSettings,
    },
    /// Join a waiting game, buying one card.
    JoinGame { game_id: GameId },
    /// Start a waiting game (organizer only).
    StartGame { game_id: GameId },
    /// Call one number (organizer only).
    CallNumber { game_id: GameId, number: u8 },
    /// Mark a cell on one of the caller's cards.
    MarkNumber {
        game_id: GameId,
        card_index: usize,
        row: usize,
        col: usize,
    },
    /// Claim bingo on one of the caller's cards.
    ClaimBingo { game_id: GameId, card_index: usize },
    /// Delete a waiting game (organizer only).
    DeleteGame { game_id: GameId },
}

impl fmt::Display for ClientAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::CreateGame { .. } => "created a game".to_string(),
            Self::JoinGame { game_id } => format!("joined game {game_id}"),
            Self::StartGame { game_id } => format!("started game {game_id}"),
            Self::CallNumber { game_id, number } => {
                format!("called {number} in game {game_id}")
            }
            Self::MarkNumber { game_id, row, col, .. } => {
                format!("marked ({row}, {col}) in game {game_id}")
            }
            Self::ClaimBingo { game_id, .. } => format!("claimed bingo in game {game_id}"),
            Self::DeleteGame { game_id } => format!("deleted game {game_id}"),
        };
        write!(f, "{repr}")
    }
}

/// A message from the transport to the engine, indicating some type of
/// user action.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClientMessage {
    /// User the message is from.
    pub user_id: UserId,
    /// Action the user is taking.
    pub action: ClientAction,
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.user_id, self.action)
    }
}

/// A rejected action: machine-readable code plus human-readable message.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorReply {
    pub code: String,
    pub message: String,
}

impl From<SessionError> for ErrorReply {
    fn from(error: SessionError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<LedgerError> for ErrorReply {
    fn from(error: LedgerError) -> Self {
        let code = match &error {
            LedgerError::AccountNotFound(_) => "NOT_FOUND",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
        };
        Self {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// A message from the engine back through the transport.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum ServerMessage {
    /// An acknowledgement of a client message, signaling that the
    /// user's action was applied.
    Ack(ClientMessage),
    /// The updated session state for the caller.
    GameState(GameSession),
    /// An engine event that can be shared with all connected parties.
    Event(GameEvent),
    /// An indication that the action was rejected.
    Error(ErrorReply),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Ack(message) => message.to_string(),
            Self::GameState(game) => format!("game {} state", game.id),
            Self::Event(event) => event.to_string(),
            Self::Error(error) => format!("{}: {}", error.code, error.message),
        };
        write!(f, "{repr}")
    }
}

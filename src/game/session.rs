use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::card::{BingoCard, CardCell};
use super::constants::{DEFAULT_AUTO_CALL_INTERVAL_SECS, MAX_NUMBER, MIN_NUMBER};
use super::patterns::{BingoPattern, is_winner};

/// Opaque user identifier, issued by the authentication collaborator.
pub type UserId = String;

/// Opaque session identifier (uuid v4).
pub type GameId = String;

/// Whole credits. All prizes, card prices, pots, and balances are whole
/// credits; the account ledger is the authority on balances.
pub type Credits = i64;

/// Errors that can occur during session operations. Every variant is an
/// expected, recoverable, caller-facing condition.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SessionError {
    #[error("game not found")]
    GameNotFound,
    #[error("only the organizer can do that")]
    NotOrganizer,
    #[error("game already started")]
    NotWaiting,
    #[error("game not in progress")]
    NotInProgress,
    #[error("game not finished")]
    NotFinished,
    #[error("already in this game")]
    AlreadyJoined,
    #[error("need {card_price} credits to join")]
    InsufficientFunds { card_price: Credits },
    #[error("no players in the game")]
    NoPlayers,
    #[error("number {0} is out of range")]
    NumberOutOfRange(u8),
    #[error("number {0} was already called")]
    NumberAlreadyCalled(u8),
    #[error("not in this game")]
    PlayerNotInGame,
    #[error("no card at index {0}")]
    InvalidCardIndex(usize),
    #[error("position ({row}, {col}) is off the card")]
    InvalidPosition { row: usize, col: usize },
    #[error("the free cell is always marked")]
    FreeCell,
    #[error("number {0} hasn't been called yet")]
    NumberNotCalled(u8),
    #[error("cell already marked")]
    AlreadyMarked,
    #[error("no bingo on this card")]
    NotAWinner,
    #[error("game already has a winner")]
    AlreadyHasWinner,
    #[error("invalid game state: internal consistency error")]
    InternalState,
}

impl SessionError {
    /// Machine-readable code for gateway error acks.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameNotFound => "NOT_FOUND",
            Self::NotOrganizer => "UNAUTHORIZED",
            Self::NotWaiting | Self::NotInProgress | Self::NotFinished | Self::NoPlayers => {
                "INVALID_STATE"
            }
            Self::AlreadyJoined | Self::NumberAlreadyCalled(_) => "DUPLICATE",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NumberOutOfRange(_) | Self::InvalidPosition { .. } | Self::InvalidCardIndex(_) => {
                "OUT_OF_RANGE"
            }
            Self::PlayerNotInGame => "NOT_IN_GAME",
            Self::FreeCell | Self::AlreadyMarked => "ALREADY_MARKED",
            Self::NumberNotCalled(_) => "NUMBER_NOT_CALLED",
            Self::NotAWinner => "NOT_A_WINNER",
            Self::AlreadyHasWinner => "ALREADY_FINISHED",
            Self::InternalState => "INTERNAL",
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session lifecycle. Advances monotonically and never regresses.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting for players",
            Self::InProgress => "in progress",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// How numbers get drawn: by the organizer, or on a timer held by the
/// session's actor.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameMode {
    Automatic,
    Manual,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        };
        write!(f, "{repr}")
    }
}

/// Events that occur as sessions change, published to the gateway's
/// broadcast channel.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    Created {
        game_id: GameId,
        organizer_id: UserId,
    },
    PlayerJoined {
        game_id: GameId,
        user_id: UserId,
    },
    Started {
        game_id: GameId,
    },
    NumberCalled {
        game_id: GameId,
        number: u8,
    },
    CardMarked {
        game_id: GameId,
        user_id: UserId,
        card_index: usize,
        row: usize,
        col: usize,
    },
    WinnerDeclared {
        game_id: GameId,
        winner_id: UserId,
        prize: Credits,
    },
    Deleted {
        game_id: GameId,
    },
    CreditsUpdated {
        user_id: UserId,
        balance: Credits,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Created { game_id, organizer_id } => {
                format!("{organizer_id} created game {game_id}")
            }
            Self::PlayerJoined { game_id, user_id } => {
                format!("{user_id} joined game {game_id}")
            }
            Self::Started { game_id } => format!("game {game_id} started"),
            Self::NumberCalled { game_id, number } => {
                format!("game {game_id}: number {number} called")
            }
            Self::CardMarked {
                game_id,
                user_id,
                card_index,
                row,
                col,
            } => format!("game {game_id}: {user_id} marked ({row}, {col}) on card {card_index}"),
            Self::WinnerDeclared {
                game_id,
                winner_id,
                prize,
            } => format!("game {game_id}: {winner_id} won {prize} credits"),
            Self::Deleted { game_id } => format!("game {game_id} deleted"),
            Self::CreditsUpdated { user_id, balance } => {
                format!("{user_id} now has {balance} credits")
            }
        };
        write!(f, "{repr}")
    }
}

/// Game configuration chosen by the organizer at creation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    pub prize: Credits,
    pub card_price: Credits,
    pub mode: GameMode,
    pub pattern: BingoPattern,
    /// Seconds between draws in automatic mode. Ignored in manual mode.
    pub auto_call_interval_secs: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            prize: 0,
            card_price: 0,
            mode: GameMode::Manual,
            pattern: BingoPattern::AnyLine,
            auto_call_interval_secs: DEFAULT_AUTO_CALL_INTERVAL_SECS,
        }
    }
}

/// A player in one session: their id and the cards they hold. Owned by
/// the session and destroyed with it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GamePlayer {
    pub user_id: UserId,
    pub cards: Vec<BingoCard>,
}

/// One game's full mutable state from creation to finish.
///
/// All mutating operations validate every precondition before the first
/// write, so a failed operation leaves the session untouched.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameSession {
    pub id: GameId,
    pub organizer_id: UserId,
    pub organizer_name: String,
    pub prize: Credits,
    pub card_price: Credits,
    pub status: GameStatus,
    pub players: Vec<GamePlayer>,
    /// Call history in draw order. The audit trail for the game.
    pub called_numbers: Vec<u8>,
    /// At most one entry: the first successful claim takes all.
    pub winners: Vec<UserId>,
    pub pot: Credits,
    pub mode: GameMode,
    pub pattern: BingoPattern,
    pub created_at: DateTime<Utc>,
    /// Set once the gateway has credited the prize to the winner.
    pub payout_complete: bool,
    /// Seconds between automatic draws.
    pub auto_call_interval_secs: u64,
}

impl GameSession {
    /// Create a new session in `Waiting` with an empty roster.
    #[must_use]
    pub fn new(settings: GameSettings, organizer_id: UserId, organizer_name: String) -> Self {
        let id = Uuid::new_v4().to_string();
        log::info!("game {id} created by {organizer_id} ({} pattern)", settings.pattern);
        Self {
            id,
            organizer_id,
            organizer_name,
            prize: settings.prize,
            card_price: settings.card_price,
            status: GameStatus::Waiting,
            players: Vec::new(),
            called_numbers: Vec::new(),
            winners: Vec::new(),
            pot: 0,
            mode: settings.mode,
            pattern: settings.pattern,
            created_at: Utc::now(),
            payout_complete: false,
            auto_call_interval_secs: settings.auto_call_interval_secs.max(1),
        }
    }

    /// Add a player to the roster with one freshly generated card and
    /// grow the pot by the card price.
    ///
    /// The caller's balance is checked here but never debited; the
    /// gateway sequences the ledger debit after this succeeds.
    pub fn join(&mut self, user_id: &UserId, balance: Credits) -> SessionResult<&GamePlayer> {
        if self.status != GameStatus::Waiting {
            return Err(SessionError::NotWaiting);
        }
        if self.players.iter().any(|p| p.user_id == *user_id) {
            return Err(SessionError::AlreadyJoined);
        }
        if balance < self.card_price {
            return Err(SessionError::InsufficientFunds {
                card_price: self.card_price,
            });
        }

        self.players.push(GamePlayer {
            user_id: user_id.clone(),
            cards: vec![BingoCard::generate()],
        });
        self.pot += self.card_price;
        log::info!("game {}: {user_id} joined, pot is now {}", self.id, self.pot);
        self.players.last().ok_or(SessionError::InternalState)
    }

    /// Move the session from `Waiting` to `InProgress`. Organizer only,
    /// and at least one player must have joined.
    pub fn start(&mut self, caller: &UserId) -> SessionResult<()> {
        if *caller != self.organizer_id {
            return Err(SessionError::NotOrganizer);
        }
        if self.status != GameStatus::Waiting {
            return Err(SessionError::NotWaiting);
        }
        if self.players.is_empty() {
            return Err(SessionError::NoPlayers);
        }

        self.status = GameStatus::InProgress;
        log::info!("game {} started with {} players", self.id, self.players.len());
        Ok(())
    }

    /// Record one drawn number. Organizer only, in-progress only; the
    /// number must be in range and not previously called.
    pub fn call_number(&mut self, caller: &UserId, number: u8) -> SessionResult<()> {
        if *caller != self.organizer_id {
            return Err(SessionError::NotOrganizer);
        }
        if self.status != GameStatus::InProgress {
            return Err(SessionError::NotInProgress);
        }
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
            return Err(SessionError::NumberOutOfRange(number));
        }
        if self.called_numbers.contains(&number) {
            return Err(SessionError::NumberAlreadyCalled(number));
        }

        self.called_numbers.push(number);
        Ok(())
    }

    /// Set the player-facing marked flag on one cell. Purely cosmetic
    /// bookkeeping; win evaluation never reads it. The cell's number
    /// must already have been called, and a cell marks at most once.
    pub fn mark_number(
        &mut self,
        user_id: &UserId,
        card_index: usize,
        row: usize,
        col: usize,
    ) -> SessionResult<()> {
        let called_numbers = &self.called_numbers;
        let player = self
            .players
            .iter_mut()
            .find(|p| p.user_id == *user_id)
            .ok_or(SessionError::PlayerNotInGame)?;
        let card = player
            .cards
            .get_mut(card_index)
            .ok_or(SessionError::InvalidCardIndex(card_index))?;
        let cell = card
            .cell(row, col)
            .ok_or(SessionError::InvalidPosition { row, col })?;

        match cell {
            CardCell::Free => Err(SessionError::FreeCell),
            CardCell::Number { value, .. } if !called_numbers.contains(&value) => {
                Err(SessionError::NumberNotCalled(value))
            }
            CardCell::Number { marked: true, .. } => Err(SessionError::AlreadyMarked),
            CardCell::Number { .. } => {
                card.mark(row, col);
                Ok(())
            }
        }
    }

    /// Resolve a bingo claim against the call history.
    ///
    /// A winning card on a game that already has a winner still fails:
    /// the first claim admitted by the session's serialization point
    /// takes all, and that claim also finishes the game.
    pub fn claim_bingo(&mut self, user_id: &UserId, card_index: usize) -> SessionResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let player = self
            .players
            .iter()
            .find(|p| p.user_id == *user_id)
            .ok_or(SessionError::PlayerNotInGame)?;
        let card = player
            .cards
            .get(card_index)
            .ok_or(SessionError::InvalidCardIndex(card_index))?;

        if !is_winner(card, &self.called_numbers, self.pattern) {
            return Err(SessionError::NotAWinner);
        }
        if !self.winners.is_empty() {
            return Err(SessionError::AlreadyHasWinner);
        }

        self.winners.push(user_id.clone());
        self.status = GameStatus::Finished;
        log::info!("game {}: {user_id} wins {} credits", self.id, self.prize);
        Ok(())
    }

    /// Whether the caller may delete this session. Organizer only, and
    /// only while waiting: started games stay for fairness, finished
    /// games stay for auditability. The registry performs the removal.
    pub fn can_delete(&self, caller: &UserId) -> SessionResult<()> {
        if *caller != self.organizer_id {
            return Err(SessionError::NotOrganizer);
        }
        if self.status != GameStatus::Waiting {
            return Err(SessionError::NotWaiting);
        }
        Ok(())
    }

    /// Record that the prize credit has landed on the ledger.
    pub fn mark_paid_out(&mut self) -> SessionResult<()> {
        if self.status != GameStatus::Finished {
            return Err(SessionError::NotFinished);
        }
        self.payout_complete = true;
        Ok(())
    }

    /// Numbers still available to draw, in ascending order.
    #[must_use]
    pub fn remaining_numbers(&self) -> Vec<u8> {
        (MIN_NUMBER..=MAX_NUMBER)
            .filter(|n| !self.called_numbers.contains(n))
            .collect()
    }
}

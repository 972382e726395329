//! # Bingo Hall
//!
//! An authoritative multiplayer bingo game engine.
//!
//! Players join a shared game, an organizer calls numbers, and the
//! server decides when a card satisfies the winning pattern. The engine
//! holds all session state in memory and performs no network or disk
//! I/O itself; a transport layer feeds it actions and publishes the
//! results.
//!
//! ## Architecture
//!
//! Each game session runs as its own tokio task with a message inbox.
//! The inbox is the session's serialization point: operations against
//! one game apply strictly in arrival order with no await between
//! validation and mutation, so the first admitted bingo claim wins and
//! a half-applied operation cannot be observed. Different games mutate
//! concurrently - there is no global lock.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, winning patterns, and the session state machine
//! - [`registry`]: session actors and the keyed store of live games
//! - [`gateway`]: typed action/reply messages and the canonical dispatch
//! - [`ledger`]: the account-ledger collaborator boundary
//!
//! ## Example
//!
//! ```
//! use bingo_hall::game::{GameSession, GameSettings, GameStatus};
//!
//! // A new game waits for players with an empty roster.
//! let game = GameSession::new(
//!     GameSettings::default(),
//!     "org-1".to_string(),
//!     "Organizer".to_string(),
//! );
//! assert_eq!(game.status, GameStatus::Waiting);
//! assert!(game.players.is_empty());
//! ```

/// Core game logic: cards, patterns, sessions.
pub mod game;
pub use game::{
    BingoCard, BingoPattern, CardCell, GameEvent, GameId, GameMode, GamePlayer, GameSession,
    GameSettings, GameStatus, SessionError, SessionResult, UserId, is_winner,
};

/// Session actors and the registry of live games.
pub mod registry;
pub use registry::{SessionHandle, SessionRegistry};

/// Engine side of the Event Gateway boundary.
pub mod gateway;
pub use gateway::{ClientAction, ClientMessage, GameService, ServerMessage};

/// Account ledger collaborator boundary.
pub mod ledger;
pub use ledger::{CreditLedger, InMemoryLedger, LedgerError, LedgerResult};

//! Session registry for spawning and managing session actors.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc, oneshot};

use super::{
    actor::{SessionActor, SessionHandle},
    messages::SessionMessage,
};
use crate::game::session::{
    Credits, GameEvent, GameId, GameSession, GameSettings, SessionError, SessionResult, UserId,
};

/// Keyed store of all live game sessions; the only component with
/// cross-session visibility.
///
/// One actor task per session id serializes that session's mutations;
/// different sessions mutate independently and concurrently. The
/// registry never holds its map lock across an actor round-trip, so
/// cross-session reads cannot stall per-session progress.
#[derive(Clone)]
pub struct SessionRegistry {
    /// Active session handles.
    sessions: Arc<RwLock<HashMap<GameId, SessionHandle>>>,

    /// Gateway broadcast channel handed to every spawned actor.
    events: mpsc::Sender<GameEvent>,
}

impl SessionRegistry {
    pub fn new(events: mpsc::Sender<GameEvent>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Create a session and spawn its actor. Always succeeds; the new
    /// game starts waiting with an empty roster.
    pub async fn create(
        &self,
        settings: GameSettings,
        organizer_id: UserId,
        organizer_name: String,
    ) -> GameSession {
        let session = GameSession::new(settings, organizer_id, organizer_name);
        let snapshot = session.clone();

        let (actor, handle) = SessionActor::new(session, self.events.clone());

        let mut sessions = self.sessions.write().await;
        sessions.insert(snapshot.id.clone(), handle);
        drop(sessions);

        tokio::spawn(actor.run());

        snapshot
    }

    /// Get a session handle.
    pub async fn get(&self, game_id: &GameId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(game_id).cloned()
    }

    /// Snapshot every live session, oldest first.
    pub async fn list(&self) -> Vec<GameSession> {
        let handles: Vec<SessionHandle> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle.send(SessionMessage::Snapshot { reply: tx }).await.is_ok()
                && let Ok(snapshot) = rx.await
            {
                snapshots.push(snapshot);
            }
        }
        snapshots.sort_by_key(|s| s.created_at);
        snapshots
    }

    /// Snapshot one session.
    pub async fn snapshot(&self, game_id: &GameId) -> SessionResult<GameSession> {
        let handle = self.get(game_id).await.ok_or(SessionError::GameNotFound)?;
        let (tx, rx) = oneshot::channel();
        handle.send(SessionMessage::Snapshot { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::InternalState)
    }

    /// Round-trip one operation through a session's actor.
    async fn request(
        &self,
        game_id: &GameId,
        build: impl FnOnce(oneshot::Sender<SessionResult<GameSession>>) -> SessionMessage,
    ) -> SessionResult<GameSession> {
        let handle = self.get(game_id).await.ok_or(SessionError::GameNotFound)?;
        let (tx, rx) = oneshot::channel();
        handle.send(build(tx)).await?;
        rx.await.map_err(|_| SessionError::InternalState)?
    }

    /// Join a game. The balance is the caller's ledger balance; the
    /// gateway debits the card price only after this succeeds.
    pub async fn join(
        &self,
        game_id: &GameId,
        user_id: &UserId,
        balance: Credits,
    ) -> SessionResult<GameSession> {
        let user_id = user_id.clone();
        self.request(game_id, |reply| SessionMessage::Join {
            user_id,
            balance,
            reply,
        })
        .await
    }

    /// Start a game (organizer only).
    pub async fn start(&self, game_id: &GameId, user_id: &UserId) -> SessionResult<GameSession> {
        let user_id = user_id.clone();
        self.request(game_id, |reply| SessionMessage::Start { user_id, reply })
            .await
    }

    /// Call a number (organizer only).
    pub async fn call_number(
        &self,
        game_id: &GameId,
        user_id: &UserId,
        number: u8,
    ) -> SessionResult<GameSession> {
        let user_id = user_id.clone();
        self.request(game_id, |reply| SessionMessage::CallNumber {
            user_id,
            number,
            reply,
        })
        .await
    }

    /// Mark a cell on one of the caller's cards.
    pub async fn mark_number(
        &self,
        game_id: &GameId,
        user_id: &UserId,
        card_index: usize,
        row: usize,
        col: usize,
    ) -> SessionResult<GameSession> {
        let user_id = user_id.clone();
        self.request(game_id, |reply| SessionMessage::MarkNumber {
            user_id,
            card_index,
            row,
            col,
            reply,
        })
        .await
    }

    /// Claim bingo. The race between simultaneous claims is resolved by
    /// actor inbox order: first admitted claim wins.
    pub async fn claim_bingo(
        &self,
        game_id: &GameId,
        user_id: &UserId,
        card_index: usize,
    ) -> SessionResult<GameSession> {
        let user_id = user_id.clone();
        self.request(game_id, |reply| SessionMessage::ClaimBingo {
            user_id,
            card_index,
            reply,
        })
        .await
    }

    /// Record that the winner's prize credit has landed.
    pub async fn mark_paid_out(&self, game_id: &GameId) -> SessionResult<GameSession> {
        self.request(game_id, |reply| SessionMessage::MarkPaidOut { reply })
            .await
    }

    /// Delete a game (organizer only, waiting only). The actor validates
    /// and stops itself; the registry then drops the handle.
    pub async fn delete(&self, game_id: &GameId, user_id: &UserId) -> SessionResult<()> {
        let handle = self.get(game_id).await.ok_or(SessionError::GameNotFound)?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(SessionMessage::Delete {
                user_id: user_id.clone(),
                reply: tx,
            })
            .await?;
        rx.await.map_err(|_| SessionError::InternalState)??;

        let mut sessions = self.sessions.write().await;
        sessions.remove(game_id);
        drop(sessions);

        log::info!("removed game {game_id} from the registry");
        Ok(())
    }

    /// Number of live sessions.
    pub async fn active_game_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

//! Session actor with async message handling.

use rand::seq::IteratorRandom;
use tokio::{
    sync::mpsc,
    time::{Duration, interval},
};

use super::messages::SessionMessage;
use crate::game::session::{
    GameEvent, GameId, GameMode, GameSession, GameStatus, SessionError, SessionResult,
};

/// Session actor handle for sending messages.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    game_id: GameId,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Send a message to the session. Fails once the actor has stopped.
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::GameNotFound)
    }
}

/// Actor owning a single game session.
///
/// The inbox is the session's serialization point: operations are
/// applied strictly in arrival order, and each one runs validation and
/// mutation as one synchronous step with no suspension in between.
/// Whichever claim is dequeued first while `winners` is empty wins;
/// no other tie-break applies.
pub struct SessionActor {
    session: GameSession,

    /// Message inbox.
    inbox: mpsc::Receiver<SessionMessage>,

    /// Gateway broadcast channel shared by all sessions.
    events: mpsc::Sender<GameEvent>,

    /// Set when the session is deleted; breaks the run loop.
    is_closed: bool,
}

impl SessionActor {
    /// Create an actor for `session` and the handle for reaching it.
    pub fn new(session: GameSession, events: mpsc::Sender<GameEvent>) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let handle = SessionHandle::new(sender, session.id.clone());
        let actor = Self {
            session,
            inbox,
            events,
            is_closed: false,
        };
        (actor, handle)
    }

    /// Run the session event loop until deletion or until the registry
    /// drops the last handle.
    pub async fn run(mut self) {
        log::info!(
            "game {} starting in {} mode",
            self.session.id,
            self.session.mode
        );

        let tick_duration = Duration::from_secs(self.session.auto_call_interval_secs);
        let mut tick_interval = interval(tick_duration);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => {
                            self.handle_message(message);
                            if self.is_closed {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                _ = tick_interval.tick() => {
                    if self.session.mode == GameMode::Automatic {
                        self.auto_draw();
                    }
                }
            }
        }

        log::info!("game {} stopped", self.session.id);
    }

    /// Apply one message. Deliberately synchronous so no other message
    /// can interleave between a validation and its mutation.
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join {
                user_id,
                balance,
                reply,
            } => {
                let result = self.session.join(&user_id, balance).map(|_| ());
                if result.is_ok() {
                    self.publish(GameEvent::PlayerJoined {
                        game_id: self.session.id.clone(),
                        user_id,
                    });
                }
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::Start { user_id, reply } => {
                let result = self.session.start(&user_id);
                if result.is_ok() {
                    self.publish(GameEvent::Started {
                        game_id: self.session.id.clone(),
                    });
                }
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::CallNumber {
                user_id,
                number,
                reply,
            } => {
                let result = self.session.call_number(&user_id, number);
                if result.is_ok() {
                    self.publish(GameEvent::NumberCalled {
                        game_id: self.session.id.clone(),
                        number,
                    });
                }
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::MarkNumber {
                user_id,
                card_index,
                row,
                col,
                reply,
            } => {
                let result = self.session.mark_number(&user_id, card_index, row, col);
                if result.is_ok() {
                    self.publish(GameEvent::CardMarked {
                        game_id: self.session.id.clone(),
                        user_id,
                        card_index,
                        row,
                        col,
                    });
                }
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::ClaimBingo {
                user_id,
                card_index,
                reply,
            } => {
                let result = self.session.claim_bingo(&user_id, card_index);
                if result.is_ok() {
                    self.publish(GameEvent::WinnerDeclared {
                        game_id: self.session.id.clone(),
                        winner_id: user_id,
                        prize: self.session.prize,
                    });
                }
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::MarkPaidOut { reply } => {
                let result = self.session.mark_paid_out();
                let _ = reply.send(result.map(|()| self.session.clone()));
            }

            SessionMessage::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
            }

            SessionMessage::Delete { user_id, reply } => {
                let result = self.session.can_delete(&user_id);
                if result.is_ok() {
                    self.is_closed = true;
                    log::info!("game {} deleted by {user_id}", self.session.id);
                }
                let _ = reply.send(result);
            }
        }
    }

    /// Draw one uncalled number on the organizer's authority. Automatic
    /// mode only; a finished or waiting game never draws.
    fn auto_draw(&mut self) {
        if self.session.status != GameStatus::InProgress {
            return;
        }

        let mut rng = rand::rng();
        let Some(number) = self.session.remaining_numbers().into_iter().choose(&mut rng) else {
            return;
        };

        let organizer = self.session.organizer_id.clone();
        match self.session.call_number(&organizer, number) {
            Ok(()) => self.publish(GameEvent::NumberCalled {
                game_id: self.session.id.clone(),
                number,
            }),
            Err(e) => log::error!("game {}: automatic draw failed: {e}", self.session.id),
        }
    }

    /// Push a broadcast event to the gateway channel without blocking
    /// the session loop.
    fn publish(&self, event: GameEvent) {
        if let Err(e) = self.events.try_send(event) {
            log::warn!("game {}: dropping event: {e}", self.session.id);
        }
    }
}

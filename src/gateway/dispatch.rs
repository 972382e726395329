//! Canonical action dispatch: the engine side of the Event Gateway.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientAction, ClientMessage, ErrorReply, ServerMessage};
use crate::game::session::{GameEvent, GameId, GameSession, SessionResult};
use crate::ledger::CreditLedger;
use crate::registry::SessionRegistry;

/// Routes inbound actions to session actors and sequences the ledger
/// calls that follow engine success.
///
/// `handle` returns the private reply for the caller; broadcast events
/// go out on the gateway channel (session actors publish their own,
/// this service publishes the create/delete/credits ones). The service
/// never tracks sockets - publishing is the transport's job.
pub struct GameService {
    registry: SessionRegistry,
    ledger: Arc<dyn CreditLedger>,
    events: mpsc::Sender<GameEvent>,
}

impl GameService {
    pub fn new(
        registry: SessionRegistry,
        ledger: Arc<dyn CreditLedger>,
        events: mpsc::Sender<GameEvent>,
    ) -> Self {
        Self {
            registry,
            ledger,
            events,
        }
    }

    /// Handle one inbound action. Success yields an ack followed by the
    /// updated session state; failure yields a single error reply and
    /// leaves the session untouched.
    pub async fn handle(&self, message: ClientMessage) -> Vec<ServerMessage> {
        match self.dispatch(&message).await {
            Ok(mut replies) => {
                replies.insert(0, ServerMessage::Ack(message));
                replies
            }
            Err(error) => {
                log::debug!("rejected: {message} ({})", error.code);
                vec![ServerMessage::Error(error)]
            }
        }
    }

    async fn dispatch(&self, message: &ClientMessage) -> Result<Vec<ServerMessage>, ErrorReply> {
        let user_id = &message.user_id;
        match &message.action {
            ClientAction::CreateGame {
                organizer_name,
                settings,
            } => {
                let game = self
                    .registry
                    .create(settings.clone(), user_id.clone(), organizer_name.clone())
                    .await;
                self.publish(GameEvent::Created {
                    game_id: game.id.clone(),
                    organizer_id: user_id.clone(),
                });
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::JoinGame { game_id } => {
                let balance = self.ledger.balance(user_id).await?;
                let game = self.registry.join(game_id, user_id, balance).await?;

                if game.card_price > 0 {
                    match self.ledger.debit(user_id, game.card_price).await {
                        Ok(balance) => self.publish(GameEvent::CreditsUpdated {
                            user_id: user_id.clone(),
                            balance,
                        }),
                        // The join stands; reconciling a failed debit is
                        // the ledger collaborator's concern.
                        Err(e) => log::error!(
                            "game {game_id}: debit of {} for {user_id} failed after join: {e}",
                            game.card_price
                        ),
                    }
                }
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::StartGame { game_id } => {
                let game = self.registry.start(game_id, user_id).await?;
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::CallNumber { game_id, number } => {
                let game = self.registry.call_number(game_id, user_id, *number).await?;
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::MarkNumber {
                game_id,
                card_index,
                row,
                col,
            } => {
                let game = self
                    .registry
                    .mark_number(game_id, user_id, *card_index, *row, *col)
                    .await?;
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::ClaimBingo {
                game_id,
                card_index,
            } => {
                let mut game = self
                    .registry
                    .claim_bingo(game_id, user_id, *card_index)
                    .await?;

                if game.prize > 0 {
                    match self.ledger.credit(user_id, game.prize).await {
                        Ok(balance) => {
                            self.publish(GameEvent::CreditsUpdated {
                                user_id: user_id.clone(),
                                balance,
                            });
                            match self.registry.mark_paid_out(game_id).await {
                                Ok(updated) => game = updated,
                                Err(e) => log::error!(
                                    "game {game_id}: payout flag not recorded: {e}"
                                ),
                            }
                        }
                        Err(e) => log::error!(
                            "game {game_id}: prize credit of {} to {user_id} failed: {e}",
                            game.prize
                        ),
                    }
                }
                Ok(vec![ServerMessage::GameState(game)])
            }

            ClientAction::DeleteGame { game_id } => {
                self.registry.delete(game_id, user_id).await?;
                self.publish(GameEvent::Deleted {
                    game_id: game_id.clone(),
                });
                Ok(Vec::new())
            }
        }
    }

    /// All live games, oldest first. For a client's initial state dump.
    pub async fn list_games(&self) -> Vec<GameSession> {
        self.registry.list().await
    }

    /// One game's current state.
    pub async fn game(&self, game_id: &GameId) -> SessionResult<GameSession> {
        self.registry.snapshot(game_id).await
    }

    fn publish(&self, event: GameEvent) {
        if let Err(e) = self.events.try_send(event) {
            log::warn!("dropping gateway event: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::{GameSettings, GameStatus};
    use crate::ledger::InMemoryLedger;

    struct Fixture {
        service: GameService,
        ledger: InMemoryLedger,
        events: mpsc::Receiver<GameEvent>,
    }

    fn fixture() -> Fixture {
        let (events_tx, events_rx) = mpsc::channel(256);
        let ledger = InMemoryLedger::new();
        let registry = SessionRegistry::new(events_tx.clone());
        let service = GameService::new(registry, Arc::new(ledger.clone()), events_tx);
        Fixture {
            service,
            ledger,
            events: events_rx,
        }
    }

    fn message(user: &str, action: ClientAction) -> ClientMessage {
        ClientMessage {
            user_id: user.to_string(),
            action,
        }
    }

    async fn create_game(service: &GameService, settings: GameSettings) -> GameSession {
        let replies = service
            .handle(message(
                "org-1",
                ClientAction::CreateGame {
                    organizer_name: "Organizer".to_string(),
                    settings,
                },
            ))
            .await;
        match &replies[1] {
            ServerMessage::GameState(game) => game.clone(),
            other => panic!("expected game state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_join_debits_card_price() {
        let mut fx = fixture();
        fx.ledger.open_account(&"alice".to_string(), 100).await;
        let game = create_game(
            &fx.service,
            GameSettings {
                card_price: 30,
                ..GameSettings::default()
            },
        )
        .await;

        let replies = fx
            .service
            .handle(message("alice", ClientAction::JoinGame { game_id: game.id }))
            .await;
        assert!(matches!(replies[0], ServerMessage::Ack(_)));
        assert_eq!(fx.ledger.balance(&"alice".to_string()).await.unwrap(), 70);

        // Broadcast carries the balance the ledger reported.
        let mut saw_credits = false;
        while let Ok(event) = fx.events.try_recv() {
            if let GameEvent::CreditsUpdated { user_id, balance } = event {
                assert_eq!(user_id, "alice");
                assert_eq!(balance, 70);
                saw_credits = true;
            }
        }
        assert!(saw_credits);
    }

    #[tokio::test]
    async fn test_rejected_join_debits_nothing() {
        let mut fx = fixture();
        fx.ledger.open_account(&"alice".to_string(), 10).await;
        let game = create_game(
            &fx.service,
            GameSettings {
                card_price: 30,
                ..GameSettings::default()
            },
        )
        .await;

        let replies = fx
            .service
            .handle(message("alice", ClientAction::JoinGame { game_id: game.id }))
            .await;
        match &replies[0] {
            ServerMessage::Error(error) => assert_eq!(error.code, "INSUFFICIENT_FUNDS"),
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(fx.ledger.balance(&"alice".to_string()).await.unwrap(), 10);

        while let Ok(event) = fx.events.try_recv() {
            assert!(!matches!(event, GameEvent::CreditsUpdated { .. }));
        }
    }

    #[tokio::test]
    async fn test_unknown_user_gets_ledger_error() {
        let fx = fixture();
        let game = create_game(&fx.service, GameSettings::default()).await;

        let replies = fx
            .service
            .handle(message("ghost", ClientAction::JoinGame { game_id: game.id }))
            .await;
        match &replies[0] {
            ServerMessage::Error(error) => assert_eq!(error.code, "NOT_FOUND"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_winning_claim_credits_prize_and_flags_payout() {
        let mut fx = fixture();
        fx.ledger.open_account(&"alice".to_string(), 100).await;
        let game = create_game(
            &fx.service,
            GameSettings {
                prize: 500,
                card_price: 10,
                ..GameSettings::default()
            },
        )
        .await;
        let game_id = game.id.clone();

        fx.service
            .handle(message(
                "alice",
                ClientAction::JoinGame {
                    game_id: game_id.clone(),
                },
            ))
            .await;
        fx.service
            .handle(message(
                "org-1",
                ClientAction::StartGame {
                    game_id: game_id.clone(),
                },
            ))
            .await;

        // Call alice's whole card so any pattern wins.
        let snapshot = fx.service.game(&game_id).await.unwrap();
        let numbers: Vec<u8> = snapshot.players[0].cards[0]
            .rows()
            .iter()
            .flatten()
            .filter_map(|c| c.value())
            .collect();
        for number in numbers {
            fx.service
                .handle(message(
                    "org-1",
                    ClientAction::CallNumber {
                        game_id: game_id.clone(),
                        number,
                    },
                ))
                .await;
        }

        let replies = fx
            .service
            .handle(message(
                "alice",
                ClientAction::ClaimBingo {
                    game_id: game_id.clone(),
                    card_index: 0,
                },
            ))
            .await;
        match &replies[1] {
            ServerMessage::GameState(game) => {
                assert_eq!(game.status, GameStatus::Finished);
                assert_eq!(game.winners, vec!["alice".to_string()]);
                assert!(game.payout_complete);
            }
            other => panic!("expected game state, got {other:?}"),
        }

        // 100 - 10 card + 500 prize.
        assert_eq!(fx.ledger.balance(&"alice".to_string()).await.unwrap(), 590);

        let mut saw_winner = false;
        while let Ok(event) = fx.events.try_recv() {
            if let GameEvent::WinnerDeclared { winner_id, prize, .. } = event {
                assert_eq!(winner_id, "alice");
                assert_eq!(prize, 500);
                saw_winner = true;
            }
        }
        assert!(saw_winner);
    }

    #[tokio::test]
    async fn test_delete_publishes_and_removes() {
        let fx = fixture();
        let game = create_game(&fx.service, GameSettings::default()).await;
        let game_id = game.id.clone();

        let replies = fx
            .service
            .handle(message(
                "org-1",
                ClientAction::DeleteGame {
                    game_id: game_id.clone(),
                },
            ))
            .await;
        assert!(matches!(replies[0], ServerMessage::Ack(_)));
        assert!(fx.service.game(&game_id).await.is_err());
        assert!(fx.service.list_games().await.is_empty());
    }
}

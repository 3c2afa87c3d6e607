//! Mock BotApi implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::traits::{BotApi, EventStream};
use crate::types::{ChatRoom, DeclineReason, GameEvent, IncomingEvent, Roster};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Sender side of a mocked event stream.
pub type EventFeed<T> = mpsc::UnboundedSender<ClientResult<T>>;

/// Mock Lichess API - only compiled in test mode or with mock feature.
///
/// Outbound calls are recorded in order; streams are fed by the test through
/// channels. Clones share state, so a test can keep one clone and hand
/// another to the code under test.
#[derive(Clone)]
pub struct MockBotApi {
    account_id: String,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    incoming: Arc<Mutex<Option<mpsc::UnboundedReceiver<ClientResult<IncomingEvent>>>>>,
    games: Arc<Mutex<HashMap<String, mpsc::UnboundedReceiver<ClientResult<GameEvent>>>>>,
    rosters: Arc<Mutex<HashMap<String, Roster>>>,
    fail_moves: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    AccountId,
    StreamIncoming,
    StreamGame {
        game_id: String,
    },
    Accept {
        challenge_id: String,
    },
    Decline {
        challenge_id: String,
        reason: DeclineReason,
    },
    MakeMove {
        game_id: String,
        uci: String,
    },
    PostMessage {
        game_id: String,
        room: ChatRoom,
        text: String,
    },
    ExportGame {
        game_id: String,
    },
}

impl MockBotApi {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            call_log: Arc::new(Mutex::new(Vec::new())),
            incoming: Arc::new(Mutex::new(None)),
            games: Arc::new(Mutex::new(HashMap::new())),
            rosters: Arc::new(Mutex::new(HashMap::new())),
            fail_moves: false,
        }
    }

    /// Register the players returned by `export_game`
    pub fn with_roster(self, game_id: &str, roster: Roster) -> Self {
        self.rosters
            .lock()
            .unwrap()
            .insert(game_id.to_string(), roster);
        self
    }

    /// Make every `make_move` call fail after being recorded
    pub fn with_failing_moves(mut self) -> Self {
        self.fail_moves = true;
        self
    }

    /// Create the account-wide stream and return its feed
    pub fn incoming_feed(&self) -> EventFeed<IncomingEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.incoming.lock().unwrap() = Some(rx);
        tx
    }

    /// Create the stream for one game and return its feed
    pub fn game_feed(&self, game_id: &str) -> EventFeed<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.games.lock().unwrap().insert(game_id.to_string(), rx);
        tx
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Moves sent for a game, in order
    pub fn moves(&self, game_id: &str) -> Vec<String> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::MakeMove { game_id: id, uci } if id == game_id => Some(uci),
                _ => None,
            })
            .collect()
    }

    /// Chat messages posted to one room of a game, in order
    pub fn messages(&self, game_id: &str, room: ChatRoom) -> Vec<String> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::PostMessage {
                    game_id: id,
                    room: r,
                    text,
                } if id == game_id && r == room => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BotApi for MockBotApi {
    async fn account_id(&self) -> ClientResult<String> {
        self.record(MockCall::AccountId);
        Ok(self.account_id.clone())
    }

    async fn stream_incoming_events(&self) -> ClientResult<EventStream<IncomingEvent>> {
        self.record(MockCall::StreamIncoming);
        let rx = self
            .incoming
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClientError::NotConfigured("stream_incoming_events".to_string()))?;
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn stream_game(&self, game_id: &str) -> ClientResult<EventStream<GameEvent>> {
        self.record(MockCall::StreamGame {
            game_id: game_id.to_string(),
        });
        let rx = self
            .games
            .lock()
            .unwrap()
            .remove(game_id)
            .ok_or_else(|| ClientError::NotConfigured(format!("stream_game {}", game_id)))?;
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<()> {
        self.record(MockCall::Accept {
            challenge_id: challenge_id.to_string(),
        });
        Ok(())
    }

    async fn decline_challenge(
        &self,
        challenge_id: &str,
        reason: DeclineReason,
    ) -> ClientResult<()> {
        self.record(MockCall::Decline {
            challenge_id: challenge_id.to_string(),
            reason,
        });
        Ok(())
    }

    async fn make_move(&self, game_id: &str, uci: &str) -> ClientResult<()> {
        self.record(MockCall::MakeMove {
            game_id: game_id.to_string(),
            uci: uci.to_string(),
        });
        if self.fail_moves {
            return Err(ClientError::Status {
                endpoint: format!("/api/bot/game/{}/move/{}", game_id, uci),
                status: 400,
                body: "{\"error\":\"Not your turn, or game already over\"}".to_string(),
            });
        }
        Ok(())
    }

    async fn post_message(&self, game_id: &str, room: ChatRoom, text: &str) -> ClientResult<()> {
        self.record(MockCall::PostMessage {
            game_id: game_id.to_string(),
            room,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn export_game(&self, game_id: &str) -> ClientResult<Roster> {
        self.record(MockCall::ExportGame {
            game_id: game_id.to_string(),
        });
        self.rosters
            .lock()
            .unwrap()
            .get(game_id)
            .cloned()
            .ok_or_else(|| ClientError::NotConfigured(format!("export_game {}", game_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let mock = MockBotApi::new("bot");
        mock.accept_challenge("c1").await.unwrap();
        mock.make_move("g1", "e2e4").await.unwrap();
        mock.post_message("g1", ChatRoom::Player, "hi").await.unwrap();

        assert_eq!(mock.get_calls().len(), 3);
        assert_eq!(mock.moves("g1"), vec!["e2e4"]);
        assert_eq!(mock.messages("g1", ChatRoom::Player), vec!["hi"]);
        assert!(mock.messages("g1", ChatRoom::Spectator).is_empty());

        mock.clear_calls();
        assert!(mock.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_game_feed() {
        let mock = MockBotApi::new("bot");
        let feed = mock.game_feed("g1");
        let mut stream = mock.stream_game("g1").await.unwrap();

        feed.send(Ok(GameEvent::Other)).unwrap();
        drop(feed);
        assert!(matches!(stream.next().await, Some(Ok(GameEvent::Other))));
        assert!(stream.next().await.is_none());

        assert!(mock.stream_game("g1").await.is_err());
    }

    #[tokio::test]
    async fn test_export_requires_roster() {
        let mock = MockBotApi::new("bot").with_roster("g1", Roster::new("alice", "bot"));
        assert_eq!(mock.export_game("g1").await.unwrap().black.as_deref(), Some("bot"));
        assert!(matches!(
            mock.export_game("g2").await,
            Err(ClientError::NotConfigured(_))
        ));
    }
}

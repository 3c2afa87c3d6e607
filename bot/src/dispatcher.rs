//! Account-wide event loop: challenge filtering and game start-up.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use lichess_client::{BotApi, Challenge, ClientError, DeclineReason, IncomingEvent};

use crate::session::SessionManager;

/// Which challenges the bot accepts.
#[derive(Debug, Clone, Copy)]
pub struct ChallengePolicy {
    /// Only accept real-time games with a clock
    pub require_clock: bool,
}

impl Default for ChallengePolicy {
    fn default() -> Self {
        Self {
            require_clock: true,
        }
    }
}

impl ChallengePolicy {
    /// `None` to accept, otherwise the first reason the challenge fails.
    pub fn evaluate(&self, challenge: &Challenge) -> Option<DeclineReason> {
        if challenge.rated {
            return Some(DeclineReason::Casual);
        }
        if self.require_clock && challenge.time_control.kind != "clock" {
            return Some(DeclineReason::TimeControl);
        }
        if challenge.variant.key != "standard" {
            return Some(DeclineReason::Standard);
        }
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Incoming event stream failed: {0}")]
    Stream(#[from] ClientError),
    #[error("Incoming event stream ended")]
    StreamEnded,
}

pub struct Dispatcher {
    api: Arc<dyn BotApi>,
    player_id: String,
    policy: ChallengePolicy,
    sessions: Arc<SessionManager>,
}

impl Dispatcher {
    pub fn new(
        api: Arc<dyn BotApi>,
        player_id: String,
        policy: ChallengePolicy,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            api,
            player_id,
            policy,
            sessions,
        }
    }

    /// Process incoming events until `shutdown` resolves or the stream fails.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), DispatchError>
    where
        F: Future<Output = ()>,
    {
        let mut events = self.api.stream_incoming_events().await?;
        tracing::info!("Listening for events...");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Dispatcher stopping");
                    return Ok(());
                }
                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event).await,
                    Some(Err(e)) if e.is_decode() => {
                        tracing::warn!("Skipping malformed event: {}", e);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(DispatchError::StreamEnded),
                },
            }
        }
    }

    async fn handle_event(&self, event: IncomingEvent) {
        match event {
            IncomingEvent::Challenge { challenge } => self.handle_challenge(&challenge).await,
            IncomingEvent::GameStart { game } => {
                match self.sessions.start_session(&game.id, &self.player_id).await {
                    Ok(_) => {
                        let active = self.sessions.active_count().await;
                        tracing::info!(game_id = %game.id, active, "Session started")
                    }
                    Err(e) => tracing::error!(game_id = %game.id, "Failed to start session: {}", e),
                }
            }
            IncomingEvent::Other => tracing::trace!("Ignoring event"),
        }
    }

    async fn handle_challenge(&self, challenge: &Challenge) {
        let result = match self.policy.evaluate(challenge) {
            None => {
                tracing::info!(challenge_id = %challenge.id, "Accepting challenge");
                self.api.accept_challenge(&challenge.id).await
            }
            Some(reason) => {
                tracing::info!(
                    challenge_id = %challenge.id,
                    reason = reason.as_str(),
                    "Declining challenge"
                );
                self.api.decline_challenge(&challenge.id, reason).await
            }
        };
        if let Err(e) = result {
            tracing::warn!(challenge_id = %challenge.id, "Challenge response failed: {}", e);
        }
    }
}

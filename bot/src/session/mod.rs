pub mod actor;
pub mod commands;
pub mod handle;
pub mod negotiation;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use chess::PieceColor;
use lichess_client::BotApi;
use strategies::{StrategyKind, StrategyRegistry};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use actor::run_session_actor;
pub use commands::SessionError;
pub use handle::SessionHandle;
use state::SessionState;

/// Shared by every session; immutable after startup.
pub struct SessionSettings {
    pub registry: Arc<StrategyRegistry>,
    /// Skip negotiation and play every game with this strategy
    pub preselected: Option<StrategyKind>,
    pub negotiation_secs: u64,
}

struct SessionEntry {
    handle: SessionHandle,
    task: JoinHandle<()>,
}

/// Manages all active sessions. Spawns an actor task per game.
pub struct SessionManager {
    api: Arc<dyn BotApi>,
    settings: Arc<SessionSettings>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn BotApi>, settings: SessionSettings) -> Self {
        Self {
            api,
            settings: Arc::new(settings),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the players, open the game stream and spawn the actor.
    pub async fn start_session(
        &self,
        game_id: &str,
        player_id: &str,
    ) -> Result<SessionHandle, SessionError> {
        self.prune().await;
        if let Some(entry) = self.sessions.read().await.get(game_id) {
            tracing::warn!(game_id, "Session already running");
            return Ok(entry.handle.clone());
        }

        let roster = self.api.export_game(game_id).await?;
        let color = if roster.is_white(player_id) {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        tracing::info!(
            game_id,
            white = roster.white.as_deref().unwrap_or("?"),
            black = roster.black.as_deref().unwrap_or("?"),
            %color,
            "Game started"
        );

        let events = self.api.stream_game(game_id).await?;
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let state = SessionState::new(game_id.to_string(), player_id.to_string(), color);
        let task = tokio::spawn(run_session_actor(
            state,
            self.settings.clone(),
            self.api.clone(),
            events,
            cmd_tx.clone(),
            cmd_rx,
        ));

        let handle = SessionHandle::new(game_id.to_string(), cmd_tx);
        self.sessions.write().await.insert(
            game_id.to_string(),
            SessionEntry {
                handle: handle.clone(),
                task,
            },
        );
        Ok(handle)
    }

    /// Number of sessions whose actor is still running.
    pub async fn active_count(&self) -> usize {
        self.prune().await;
        self.sessions.read().await.len()
    }

    /// Stop every session and wait for the actors to release their strategies.
    pub async fn shutdown_all(&self) {
        let entries: Vec<SessionEntry> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        tracing::info!("Shutting down {} session(s)", entries.len());

        for entry in &entries {
            if entry.handle.is_closed() {
                continue;
            }
            if entry.handle.shutdown().await.is_err() {
                tracing::debug!(game_id = entry.handle.game_id(), "Session already exited");
            }
        }
        for entry in entries {
            if let Err(e) = entry.task.await {
                tracing::warn!("Session task failed: {}", e);
            }
        }
    }

    async fn prune(&self) {
        self.sessions
            .write()
            .await
            .retain(|_, entry| !entry.task.is_finished());
    }
}

use tokio::sync::mpsc;

use super::commands::{SessionCommand, SessionError};

/// Cheap, cloneable handle to a session actor.
#[derive(Clone)]
pub struct SessionHandle {
    game_id: String,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(game_id: String, cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { game_id, cmd_tx }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Whether the actor has exited.
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }

    /// Ask the actor to stop and release its strategy.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

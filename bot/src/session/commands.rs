use lichess_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Lichess request failed: {0}")]
    Client(#[from] ClientError),
    #[error("Session actor is gone")]
    Closed,
}

/// Commands sent to the session actor, from the countdown task or the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Negotiation reminder with the seconds left
    CountdownReminder(u64),
    /// Negotiation window elapsed without a choice
    CountdownExpired,
    Shutdown,
}

//! Strategy negotiation: chat texts and the countdown task.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time;

use super::commands::SessionCommand;

/// Longest chat message Lichess accepts.
pub(crate) const CHAT_LIMIT: usize = 140;

/// Seconds-left values announced in chat.
const REMINDERS: [u64; 2] = [10, 5];

const TICK: Duration = Duration::from_secs(1);

pub(crate) const PROMPT: &str =
    "Please select a strategy you would like me to use. A complete list of strategies can be found here:";

pub(crate) const WAIT_COMMAND: &str = "wait";

/// Published by the actor, observed by the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NegotiationPhase {
    /// Prompt not posted yet
    Idle,
    /// Countdown running
    Open,
    /// Opponent asked to wait; no automatic pick
    Waiting,
    /// Strategy bound or session over
    Closed,
}

/// How a strategy came to be bound, for the announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindSource {
    Chat,
    Timeout,
    Preselected,
}

impl BindSource {
    pub fn announcement(self, name: &str) -> String {
        match self {
            Self::Chat => format!("You chose strategy: \"{}\"", name),
            Self::Timeout => format!("Picking strategy: \"{}\"", name),
            Self::Preselected => format!("Playing with strategy: \"{}\"", name),
        }
    }
}

pub(crate) fn timeout_warning(secs: u64) -> String {
    format!(
        "If you don't respond in {} seconds, I'll pick a strategy at random. Or, you can type \"wait\" and I won't pick one.",
        secs
    )
}

pub(crate) fn reminder(secs: u64) -> String {
    format!("{} seconds left", secs)
}

/// Split the comma-separated strategy list into chat-sized messages.
///
/// Every name except the last carries a trailing comma. A single name longer
/// than `limit` gets a message of its own.
pub(crate) fn chunk_names(names: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for (i, name) in names.iter().enumerate() {
        let word = if i + 1 < names.len() {
            format!("{},", name)
        } else {
            name.clone()
        };
        if current.is_empty() {
            current = word;
        } else if current.len() + 1 + word.len() <= limit {
            current.push(' ');
            current.push_str(&word);
        } else {
            chunks.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Count down `total_secs` seconds while the phase stays `Open`.
///
/// Sends reminders and the final expiry to the session actor. The phase is
/// re-checked every tick and on every change, so the task never acts more
/// than one tick after the actor closed the negotiation.
pub(crate) async fn run_countdown(
    total_secs: u64,
    mut phase: watch::Receiver<NegotiationPhase>,
    cmd_tx: mpsc::Sender<SessionCommand>,
) {
    let mut left = total_secs;
    loop {
        if *phase.borrow_and_update() != NegotiationPhase::Open {
            tracing::debug!("Countdown stopped with {}s left", left);
            return;
        }

        if left == 0 {
            let _ = cmd_tx.send(SessionCommand::CountdownExpired).await;
            return;
        }
        if REMINDERS.contains(&left) && left < total_secs
            && cmd_tx.send(SessionCommand::CountdownReminder(left)).await.is_err()
        {
            return;
        }

        tokio::select! {
            _ = time::sleep(TICK) => left -= 1,
            changed = phase.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

//! Lichess bot API client library
//!
//! Provides an async client for the Lichess bot endpoints: the account-wide
//! event stream, per-game streams, challenge handling, moves and chat.
//! Everything a bot needs is behind the [`BotApi`] trait so sessions can be
//! driven by [`MockBotApi`] in tests (feature `mock`).
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use lichess_client::{BotApi, LichessClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LichessClient::new("https://lichess.org", "lip_token")?;
//!     println!("Connected as {}", client.account_id().await?);
//!     let mut events = client.stream_incoming_events().await?;
//!     while let Some(event) = events.next().await {
//!         println!("{:?}", event?);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;
mod types;

pub use client::{LichessClient, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{EventFeed, MockBotApi, MockCall};
pub use traits::{BotApi, EventStream};
pub use types::{
    Challenge, ChatLine, ChatRoom, DeclineReason, GameEvent, GameRef, GameState, IncomingEvent,
    Roster, TimeControl, Variant,
};

//! Lichess HTTP client implementation

use crate::error::{ClientError, ClientResult};
use crate::traits::{BotApi, EventStream};
use crate::types::{Account, ChatRoom, DeclineReason, ExportedGame, GameEvent, IncomingEvent, Roster};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://lichess.org";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Network client for a Lichess bot account
#[derive(Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LichessClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("multibot/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> ClientResult<reqwest::Response> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        check_status(path, response).await
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> ClientResult<()> {
        tracing::debug!("POST {}", path);
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await?;
        check_status(path, response).await?;
        Ok(())
    }

    async fn open_stream<T>(&self, path: &str) -> ClientResult<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        tracing::debug!("Opening stream {}", path);
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .send()
            .await?;
        let response = check_status(path, response).await?;
        Ok(ndjson_stream(response))
    }
}

async fn check_status(endpoint: &str, response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Splits a byte stream into newline-delimited JSON values.
///
/// Blank lines (Lichess keep-alives) produce nothing.
pub(crate) struct NdjsonDecoder<T> {
    buffer: Vec<u8>,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> NdjsonDecoder<T> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Feed a chunk and return every complete line decoded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ClientResult<T>> {
        self.buffer.extend_from_slice(chunk);
        let mut items = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(item) = decode_line(&line) {
                items.push(item);
            }
        }
        items
    }

    /// Decode whatever is left once the stream ended without a final newline.
    pub fn finish(&mut self) -> Option<ClientResult<T>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<ClientResult<T>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let decoded = serde_json::from_str(text).map_err(|e| {
        tracing::warn!("Malformed event line {:?}: {}", text, e);
        ClientError::from(e)
    });
    Some(decoded)
}

fn ndjson_stream<T>(response: reqwest::Response) -> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut bytes = response.bytes_stream();
        let mut decoder = NdjsonDecoder::<T>::new();
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for item in decoder.push(&chunk) {
                        yield item;
                    }
                }
                Err(e) => {
                    yield Err(ClientError::Http(e));
                    return;
                }
            }
        }
        if let Some(item) = decoder.finish() {
            yield item;
        }
    })
}

#[async_trait]
impl BotApi for LichessClient {
    async fn account_id(&self) -> ClientResult<String> {
        let account: Account = self.get("/api/account").await?.json().await?;
        Ok(account.id)
    }

    async fn stream_incoming_events(&self) -> ClientResult<EventStream<IncomingEvent>> {
        self.open_stream("/api/stream/event").await
    }

    async fn stream_game(&self, game_id: &str) -> ClientResult<EventStream<GameEvent>> {
        self.open_stream(&format!("/api/bot/game/stream/{}", game_id))
            .await
    }

    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<()> {
        self.post_form(&format!("/api/challenge/{}/accept", challenge_id), &[])
            .await
    }

    async fn decline_challenge(
        &self,
        challenge_id: &str,
        reason: DeclineReason,
    ) -> ClientResult<()> {
        self.post_form(
            &format!("/api/challenge/{}/decline", challenge_id),
            &[("reason", reason.as_str())],
        )
        .await
    }

    async fn make_move(&self, game_id: &str, uci: &str) -> ClientResult<()> {
        self.post_form(&format!("/api/bot/game/{}/move/{}", game_id, uci), &[])
            .await
    }

    async fn post_message(&self, game_id: &str, room: ChatRoom, text: &str) -> ClientResult<()> {
        self.post_form(
            &format!("/api/bot/game/{}/chat", game_id),
            &[("room", room.as_str()), ("text", text)],
        )
        .await
    }

    async fn export_game(&self, game_id: &str) -> ClientResult<Roster> {
        let exported: ExportedGame = self
            .get(&format!("/game/export/{}?moves=false&clocks=false&evals=false", game_id))
            .await?
            .json()
            .await?;
        Ok(exported.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_skips_keepalives() {
        let mut decoder = NdjsonDecoder::<IncomingEvent>::new();
        let items = decoder.push(b"\n\n{\"type\":\"gameStart\",\"game\":{\"id\":\"g1\"}}\n\n");
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0].as_ref().unwrap(),
            IncomingEvent::GameStart { game } if game.id == "g1"
        ));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_decoder_handles_split_chunks() {
        let mut decoder = NdjsonDecoder::<GameEvent>::new();
        assert!(decoder.push(b"{\"type\":\"chatLine\",\"username\":").is_empty());
        let items = decoder.push(b"\"alice\",\"text\":\"hi\",\"room\":\"player\"}\n{\"type\":\"game");
        assert_eq!(items.len(), 1);
        let rest = decoder.push(b"State\",\"moves\":\"e2e4\",\"status\":\"started\"}");
        assert!(rest.is_empty());
        assert!(matches!(decoder.finish(), Some(Ok(GameEvent::GameState(_)))));
    }

    #[test]
    fn test_decoder_reports_malformed_lines_and_continues() {
        let mut decoder = NdjsonDecoder::<GameEvent>::new();
        let items = decoder.push(b"{not json}\n{\"type\":\"opponentGone\"}\n");
        assert_eq!(items.len(), 2);
        assert!(items[0].as_ref().is_err_and(|e| e.is_decode()));
        assert!(matches!(items[1], Ok(GameEvent::Other)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = LichessClient::new("https://lichess.org/", "token").unwrap();
        assert_eq!(client.url("/api/account"), "https://lichess.org/api/account");
    }
}

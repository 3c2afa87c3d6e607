use crate::uci::{parse_uci_message, UciMessage};
use crate::{EngineError, GoParams, Score};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// A Stockfish process owned by a single caller.
///
/// Requests are strictly sequential: every search is read through to its
/// `bestmove` before the next one is sent, so the message queue never holds
/// output from an earlier search.
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    message_rx: mpsc::Receiver<UciMessage>,
    label: String,
}

/// Configuration for engine performance tuning.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    pub label: Option<String>,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl StockfishEngine {
    /// Spawn a new Stockfish instance and complete the UCI handshake.
    #[tracing::instrument(level = "info", skip(config), fields(path = %config.path.display()))]
    pub async fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let label = config.label.clone().unwrap_or_else(|| "stockfish".to_string());

        tracing::debug!("Spawning Stockfish process");
        let mut process = tokio::process::Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn Stockfish: {}", e);
                EngineError::Spawn(e)
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = process
            .stdout
            .take()
            .ok_or(EngineError::MissingPipe("stdout"))?;

        let (message_tx, message_rx) = mpsc::channel::<UciMessage>(256);

        // Output reader task. Dropping the sender on EOF is how callers
        // learn that the process died.
        let reader_label = label.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::debug!(engine = %reader_label, "Stockfish stdout EOF");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        tracing::trace!(engine = %reader_label, "UCI << {}", trimmed);
                        match parse_uci_message(trimmed) {
                            Ok(msg) => {
                                if message_tx.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => {
                                tracing::trace!("Ignoring UCI line: {}", trimmed);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(engine = %reader_label, "Error reading from Stockfish stdout: {}", e);
                        break;
                    }
                }
            }
        });

        let mut engine = Self {
            process,
            stdin,
            message_rx,
            label,
        };

        engine.send("uci\n").await?;
        engine
            .wait_for(HANDSHAKE_TIMEOUT, "uciok", |msg| matches!(msg, UciMessage::UciOk))
            .await?;

        if let Some(threads) = config.threads {
            let threads = threads.clamp(1, 16);
            engine
                .send(&format!("setoption name Threads value {}\n", threads))
                .await?;
        }
        if let Some(hash_mb) = config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            engine
                .send(&format!("setoption name Hash value {}\n", hash_mb))
                .await?;
        }

        engine.ready().await?;
        tracing::info!(engine = %engine.label, "Stockfish engine spawned and initialized");
        Ok(engine)
    }

    /// Evaluate a position with a fixed search budget.
    ///
    /// The score is relative to the side to move in `fen`.
    pub async fn evaluate(&mut self, fen: &str, params: &GoParams) -> Result<Score, EngineError> {
        self.send(&format!("position fen {}\n", fen)).await?;
        self.send(&params.to_command()).await?;

        let mut last_score = None;
        loop {
            match self.recv(SEARCH_TIMEOUT, "bestmove").await? {
                UciMessage::Info(info) => {
                    if info.score.is_some() {
                        tracing::trace!(
                            engine = %self.label,
                            depth = ?info.depth,
                            nodes = ?info.nodes,
                            "Score {:?}",
                            info.score
                        );
                        last_score = info.score;
                    }
                }
                UciMessage::BestMove { .. } => break,
                _ => {}
            }
        }

        last_score.ok_or(EngineError::NoScore)
    }

    /// Search a position and return the engine's preferred move token.
    pub async fn best_move(&mut self, fen: &str, params: &GoParams) -> Result<String, EngineError> {
        self.send(&format!("position fen {}\n", fen)).await?;
        self.send(&params.to_command()).await?;

        loop {
            if let UciMessage::BestMove { mv, .. } = self.recv(SEARCH_TIMEOUT, "bestmove").await? {
                tracing::debug!(engine = %self.label, "Received bestmove: {}", mv);
                return Ok(mv);
            }
        }
    }

    /// Shutdown the engine
    pub async fn shutdown(mut self) {
        tracing::info!(engine = %self.label, "Shutting down Stockfish");
        let _ = self.send("quit\n").await;
        if tokio::time::timeout(Duration::from_secs(1), self.process.wait())
            .await
            .is_err()
        {
            let _ = self.process.kill().await;
        }
    }

    async fn ready(&mut self) -> Result<(), EngineError> {
        self.send("isready\n").await?;
        self.wait_for(HANDSHAKE_TIMEOUT, "readyok", |msg| {
            matches!(msg, UciMessage::ReadyOk)
        })
        .await
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        tracing::trace!(engine = %self.label, "UCI >> {}", cmd.trim());
        self.stdin.write_all(cmd.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn recv(
        &mut self,
        limit: Duration,
        waiting_for: &'static str,
    ) -> Result<UciMessage, EngineError> {
        match tokio::time::timeout(limit, self.message_rx.recv()).await {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => Err(EngineError::Closed),
            Err(_) => Err(EngineError::Timeout(waiting_for)),
        }
    }

    async fn wait_for(
        &mut self,
        limit: Duration,
        waiting_for: &'static str,
        done: impl Fn(&UciMessage) -> bool,
    ) -> Result<(), EngineError> {
        loop {
            let msg = self.recv(limit, waiting_for).await?;
            if done(&msg) {
                return Ok(());
            }
        }
    }
}

/// Common install locations checked after `PATH`.
const COMMON_PATHS: &[&str] = &[
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "/usr/games/stockfish",
];

/// Find a Stockfish executable.
///
/// An explicit path wins if it exists. Otherwise every `PATH` entry is
/// searched for a `stockfish` binary, then the common install locations.
pub fn locate_stockfish(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Configured Stockfish path does not exist: {}", path.display());
        return None;
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join("stockfish");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    COMMON_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_locate_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-stockfish");
        std::fs::write(&fake, b"").unwrap();

        assert_eq!(locate_stockfish(Some(fake.as_path())), Some(fake.clone()));
        let missing = dir.path().join("missing");
        assert_eq!(locate_stockfish(Some(missing.as_path())), None);
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let result = StockfishEngine::spawn(EngineConfig::new("/nonexistent/stockfish")).await;
        assert!(matches!(result, Err(EngineError::Spawn(_))));
    }

    /// Requires Stockfish to be installed; skipped otherwise.
    #[tokio::test]
    async fn test_evaluate_start_position() {
        let Some(path) = locate_stockfish(None) else {
            return;
        };
        let mut engine = StockfishEngine::spawn(EngineConfig::new(path)).await.unwrap();

        let score = engine
            .evaluate(START_FEN, &GoParams::nodes(10_000))
            .await
            .unwrap();
        assert!(matches!(score, Score::Centipawns(cp) if cp.abs() < 200));

        let mv = engine
            .best_move(START_FEN, &GoParams::nodes(10_000))
            .await
            .unwrap();
        assert_eq!(mv.len(), 4);

        engine.shutdown().await;
    }

    /// Requires Stockfish to be installed; skipped otherwise.
    #[tokio::test]
    async fn test_evaluate_mated_position() {
        let Some(path) = locate_stockfish(None) else {
            return;
        };
        let mut engine = StockfishEngine::spawn(EngineConfig::new(path)).await.unwrap();

        // Fool's mate, white to move and checkmated
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let score = engine.evaluate(fen, &GoParams::nodes(1_000)).await.unwrap();
        assert_eq!(score, Score::Mate(0));
        engine.shutdown().await;
    }
}

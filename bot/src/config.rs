//! Command-line configuration for multibot
//!
//! Every flag can also be set through an environment variable. The Stockfish
//! binary is resolved with the following precedence:
//! 1. `--stockfish` / `MULTIBOT_STOCKFISH`
//! 2. the first line of `--stockfish-path-file`
//! 3. a `stockfish` binary on `PATH` or in a common install location

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use engine::EngineConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "multibot", version, about = "Lichess bot with chat-selected strategies")]
pub struct BotConfig {
    /// File holding the Lichess API token
    #[arg(long, env = "MULTIBOT_TOKEN_FILE", default_value = "bot.token")]
    pub token_file: PathBuf,

    /// Lichess server to talk to
    #[arg(long, env = "MULTIBOT_BASE_URL", default_value = lichess_client::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path to a Stockfish binary
    #[arg(long, env = "MULTIBOT_STOCKFISH")]
    pub stockfish: Option<PathBuf>,

    /// File whose first line is the path to a Stockfish binary
    #[arg(long, env = "MULTIBOT_STOCKFISH_PATH_FILE")]
    pub stockfish_path_file: Option<PathBuf>,

    /// Search threads for each Stockfish process
    #[arg(long, env = "MULTIBOT_STOCKFISH_THREADS")]
    pub stockfish_threads: Option<u32>,

    /// Hash table size in MB for each Stockfish process
    #[arg(long, env = "MULTIBOT_STOCKFISH_HASH_MB")]
    pub stockfish_hash_mb: Option<u32>,

    /// Play every game with this strategy instead of asking the opponent
    #[arg(long, env = "MULTIBOT_STRATEGY")]
    pub strategy: Option<String>,

    /// Seconds the opponent has to pick a strategy
    #[arg(long, env = "MULTIBOT_NEGOTIATION_SECS", default_value_t = 15)]
    pub negotiation_secs: u64,

    /// Accept correspondence and unlimited games too
    #[arg(long, env = "MULTIBOT_ALLOW_ANY_TIME_CONTROL")]
    pub allow_any_time_control: bool,

    /// Also write daily rolling log files to this directory
    #[arg(long, env = "MULTIBOT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl BotConfig {
    /// Read the API token, trimmed.
    pub fn read_token(&self) -> anyhow::Result<String> {
        read_token(&self.token_file)
    }

    /// Resolve the Stockfish binary, if any.
    pub fn stockfish_path(&self) -> anyhow::Result<Option<PathBuf>> {
        let explicit = match (&self.stockfish, &self.stockfish_path_file) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(file)) => Some(read_path_file(file)?),
            (None, None) => None,
        };
        Ok(engine::locate_stockfish(explicit.as_deref()))
    }

    /// Engine settings shared by every oracle strategy, if Stockfish was found.
    pub fn oracle(&self) -> anyhow::Result<Option<EngineConfig>> {
        Ok(self.stockfish_path()?.map(|path| EngineConfig {
            threads: self.stockfish_threads,
            hash_mb: self.stockfish_hash_mb,
            ..EngineConfig::new(path)
        }))
    }
}

fn read_token(path: &Path) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file {}", path.display()))?;
    let token = raw.trim();
    if token.is_empty() {
        anyhow::bail!("Token file {} is empty", path.display());
    }
    Ok(token.to_string())
}

fn read_path_file(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Stockfish path file {}", path.display()))?;
    let line = raw.lines().next().map(str::trim).unwrap_or_default();
    if line.is_empty() {
        anyhow::bail!("Stockfish path file {} is empty", path.display());
    }
    Ok(PathBuf::from(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> BotConfig {
        BotConfig::try_parse_from(std::iter::once("multibot").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.base_url, "https://lichess.org");
        assert_eq!(config.negotiation_secs, 15);
        assert_eq!(config.stockfish_threads, None);
        assert!(!config.allow_any_time_control);
        assert!(config.strategy.is_none());
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--token-file",
            "/tmp/t",
            "--strategy",
            "ran",
            "--negotiation-secs",
            "30",
            "--allow-any-time-control",
        ]);
        assert_eq!(config.token_file, PathBuf::from("/tmp/t"));
        assert_eq!(config.strategy.as_deref(), Some("ran"));
        assert_eq!(config.negotiation_secs, 30);
        assert!(config.allow_any_time_control);
    }

    #[test]
    fn test_read_token_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.token");
        std::fs::write(&path, "  lip_abc123\n").unwrap();
        assert_eq!(read_token(&path).unwrap(), "lip_abc123");

        std::fs::write(&path, "\n").unwrap();
        assert!(read_token(&path).is_err());
        assert!(read_token(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_stockfish_from_path_file() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("sf");
        std::fs::write(&binary, b"").unwrap();
        let path_file = dir.path().join("stockfish.path");
        std::fs::write(&path_file, format!("{}\n", binary.display())).unwrap();

        let mut config = parse(&[]);
        config.stockfish_path_file = Some(path_file);
        assert_eq!(config.stockfish_path().unwrap(), Some(binary.clone()));

        config.stockfish = Some(dir.path().join("does-not-exist"));
        assert_eq!(config.stockfish_path().unwrap(), None);
    }

    #[test]
    fn test_oracle_carries_engine_options() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("sf");
        std::fs::write(&binary, b"").unwrap();
        let binary_arg = binary.display().to_string();

        let config = parse(&[
            "--stockfish",
            binary_arg.as_str(),
            "--stockfish-threads",
            "2",
            "--stockfish-hash-mb",
            "64",
        ]);
        let oracle = config.oracle().unwrap().unwrap();
        assert_eq!(oracle.path, binary);
        assert_eq!(oracle.threads, Some(2));
        assert_eq!(oracle.hash_mb, Some(64));
        assert_eq!(oracle.label, None);
    }
}

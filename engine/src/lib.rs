pub mod score;
pub mod stockfish;
pub mod uci;

pub use score::Score;
pub use stockfish::{locate_stockfish, EngineConfig, StockfishEngine};
pub use uci::{UciError, UciMessage};

/// Parameters for the "go" command
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub nodes: Option<u64>,
    pub movetime: Option<u64>, // Move time in milliseconds
    pub depth: Option<u8>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
}

impl GoParams {
    /// Search a fixed number of nodes
    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes: Some(nodes),
            ..Default::default()
        }
    }

    pub fn to_command(&self) -> String {
        let mut go_cmd = "go".to_string();
        if let Some(nodes) = self.nodes {
            go_cmd.push_str(&format!(" nodes {}", nodes));
        }
        if let Some(depth) = self.depth {
            go_cmd.push_str(&format!(" depth {}", depth));
        }
        for (key, value) in [
            ("wtime", self.wtime),
            ("btime", self.btime),
            ("winc", self.winc),
            ("binc", self.binc),
        ] {
            if let Some(ms) = value {
                go_cmd.push_str(&format!(" {} {}", key, ms));
            }
        }
        if let Some(movetime) = self.movetime {
            go_cmd.push_str(&format!(" movetime {}", movetime));
        }
        if go_cmd == "go" {
            go_cmd.push_str(" movetime 1000"); // Default 1 second
        }
        go_cmd.push('\n');
        go_cmd
    }
}

/// The parts of an `info` line the bot cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineInfo {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub score: Option<Score>,
    pub pv: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Stockfish not found")]
    NotFound,
    #[error("Failed to spawn Stockfish: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine has no {0}")]
    MissingPipe(&'static str),
    #[error("Engine process closed")]
    Closed,
    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),
    #[error("Engine reported no score")]
    NoScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_nodes_command() {
        assert_eq!(GoParams::nodes(10_000).to_command(), "go nodes 10000\n");
    }

    #[test]
    fn test_go_clock_command() {
        let params = GoParams {
            wtime: Some(60_000),
            btime: Some(55_000),
            winc: Some(2_000),
            binc: Some(2_000),
            ..Default::default()
        };
        assert_eq!(
            params.to_command(),
            "go wtime 60000 btime 55000 winc 2000 binc 2000\n"
        );
    }

    #[test]
    fn test_go_default_command() {
        assert_eq!(GoParams::default().to_command(), "go movetime 1000\n");
    }
}

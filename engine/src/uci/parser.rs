use std::iter::Peekable;
use std::str::SplitWhitespace;

use super::UciError;
use crate::{EngineInfo, Score};

/// Engine output the bot reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum UciMessage {
    UciOk,
    ReadyOk,
    /// Moves stay as raw tokens; the caller resolves them against its position.
    BestMove { mv: String, ponder: Option<String> },
    Info(EngineInfo),
}

pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("uciok") => Ok(UciMessage::UciOk),
        Some("readyok") => Ok(UciMessage::ReadyOk),
        Some("bestmove") => {
            let mv = tokens
                .next()
                .ok_or_else(|| UciError::MalformedMessage(line.to_string()))?;
            let ponder = match (tokens.next(), tokens.next()) {
                (Some("ponder"), Some(reply)) => Some(reply.to_string()),
                _ => None,
            };
            Ok(UciMessage::BestMove {
                mv: mv.to_string(),
                ponder,
            })
        }
        Some("info") => Ok(UciMessage::Info(read_info(tokens.peekable()))),
        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}

/// Pull depth, nodes, score and pv out of an info line; everything else is skipped.
fn read_info(mut tokens: Peekable<SplitWhitespace<'_>>) -> EngineInfo {
    let mut info = EngineInfo::default();

    while let Some(field) = tokens.next() {
        match field {
            "depth" => info.depth = next_number(&mut tokens),
            "nodes" => info.nodes = next_number(&mut tokens),
            "score" => {
                let kind = tokens.next();
                let value = next_number(&mut tokens);
                info.score = match (kind, value) {
                    (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                    (Some("mate"), Some(n)) => Some(Score::Mate(n)),
                    _ => None,
                };
            }
            "pv" => {
                while let Some(mv) = tokens.next_if(|t| looks_like_move(t)) {
                    info.pv.push(mv.to_string());
                }
            }
            // Free text runs to the end of the line
            "string" => break,
            _ => {}
        }
    }

    info
}

fn next_number<T: std::str::FromStr>(tokens: &mut Peekable<SplitWhitespace<'_>>) -> Option<T> {
    tokens.next().and_then(|t| t.parse().ok())
}

/// Coordinate moves are 4 or 5 chars starting with a file letter and a rank digit.
fn looks_like_move(token: &str) -> bool {
    let bytes = token.as_bytes();
    (4..=5).contains(&bytes.len())
        && (b'a'..=b'h').contains(&bytes[0])
        && bytes[1].is_ascii_digit()
}

/// Trailing token dropped from strategy identifiers.
const SUFFIX: &str = "Strategy";

/// Turn a CamelCase strategy identifier into a display name.
///
/// Words are split at lower-to-upper transitions and at the end of an
/// uppercase run ("XMLParser" becomes "XML Parser"); a trailing
/// `Strategy` word is removed.
pub fn display_name(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let boundary = c.is_uppercase()
            && i > 0
            && (!chars[i - 1].is_uppercase()
                || chars.get(i + 1).is_some_and(|next| next.is_lowercase()));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    if words.len() > 1 && words.last().is_some_and(|w| w == SUFFIX) {
        words.pop();
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_suffix_and_splits_words() {
        assert_eq!(display_name("RandomMoveStrategy"), "Random Move");
        assert_eq!(display_name("MinOpponentMovesStrategy"), "Min Opponent Moves");
        assert_eq!(display_name("SuicideKingStrategy"), "Suicide King");
        assert_eq!(display_name("StockfishStrategy"), "Stockfish");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(display_name("XMLParserStrategy"), "XML Parser");
        assert_eq!(display_name("PlayUCI"), "Play UCI");
    }

    #[test]
    fn test_without_suffix() {
        assert_eq!(display_name("SuicideKing"), "Suicide King");
        assert_eq!(display_name("Strategy"), "Strategy");
        assert_eq!(display_name(""), "");
    }
}

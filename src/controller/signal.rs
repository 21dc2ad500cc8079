use crate::game::{PlayerId, MAX_COLS};

/// What a turn signal asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Free-form post content; the column is parsed with [`parse_column`].
    Text(String),
    /// An already chosen zero-based column.
    Column(usize),
}

/// A player's attempted move, stamped with the time it was authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSignal {
    pub player: PlayerId,
    pub timestamp: u64,
    pub payload: Payload,
}

impl TurnSignal {
    pub fn text(player: PlayerId, timestamp: u64, content: impl Into<String>) -> Self {
        TurnSignal {
            player,
            timestamp,
            payload: Payload::Text(content.into()),
        }
    }

    pub fn column(player: PlayerId, timestamp: u64, column: usize) -> Self {
        TurnSignal {
            player,
            timestamp,
            payload: Payload::Column(column),
        }
    }

    /// Zero-based column selected by this signal, if any.
    pub fn selected_column(&self, cols: usize) -> Option<usize> {
        match &self.payload {
            Payload::Text(content) => parse_column(content, cols),
            Payload::Column(column) => Some(*column),
        }
    }
}

/// Find the column selector in free-form text.
///
/// Players write prose, so the rule is deliberately loose: the first
/// character that is a digit between 1 and the number of columns (never more
/// than 9) wins, anywhere in the text. The result is zero-based.
pub fn parse_column(content: &str, cols: usize) -> Option<usize> {
    let max = cols.min(MAX_COLS) as u32;
    content
        .chars()
        .filter_map(|c| c.to_digit(10))
        .find(|d| (1..=max).contains(d))
        .map(|d| d as usize - 1)
}

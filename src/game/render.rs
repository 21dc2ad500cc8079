//! Text rendering of boards and game states.
//!
//! The engine does not know about output formats: every cell is turned into a
//! token through [`CellTokens`], so the same grid can be shown as ASCII in a
//! terminal or as image links in a forum post.

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell};
use super::state::{GameOutcome, GameState};

/// Lookup from cell value to a display token.
pub trait CellTokens {
    fn token(&self, cell: Cell) -> &str;
}

/// A fixed token for each kind of cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSet {
    pub empty: String,
    pub player1: String,
    pub player2: String,
    pub obstacle: String,
}

impl TokenSet {
    /// Single-character tokens for terminals and logs.
    pub fn ascii() -> Self {
        TokenSet {
            empty: ".".into(),
            player1: "X".into(),
            player2: "O".into(),
            obstacle: "#".into(),
        }
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::ascii()
    }
}

impl CellTokens for TokenSet {
    fn token(&self, cell: Cell) -> &str {
        match cell {
            Cell::Empty => &self.empty,
            Cell::Player1 => &self.player1,
            Cell::Player2 => &self.player2,
            Cell::Obstacle => &self.obstacle,
        }
    }
}

impl<F> CellTokens for F
where
    F: Fn(Cell) -> &'static str,
{
    fn token(&self, cell: Cell) -> &str {
        self(cell)
    }
}

/// One line per row, top row first, tokens separated by a space.
pub fn render_grid<T: CellTokens + ?Sized>(board: &Board, tokens: &T) -> String {
    board
        .row_slices()
        .map(|row| {
            row.iter()
                .map(|&cell| tokens.token(cell))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Status line followed by the grid.
pub fn render_state<T: CellTokens + ?Sized>(state: &GameState, tokens: &T) -> String {
    let status = match state.outcome() {
        None => format!("current player: {}", state.current_player().name),
        Some(GameOutcome::Winner(id)) => format!("winner: {}", state.player(id).name),
        Some(GameOutcome::Draw) => "draw".to_string(),
    };
    format!("{status}\n{}", render_grid(state.board(), tokens))
}

//! Core Connect Four game logic: board representation, player types, game
//! state transitions and token-based rendering.

mod board;
mod player;
pub mod render;
mod state;

#[cfg(test)]
mod proptests;

pub use board::{Board, Cell, DEFAULT_COLS, DEFAULT_ROWS, MAX_COLS, MAX_ROWS, RUN_LENGTH};
pub use player::{Player, PlayerId};
pub use render::{render_grid, render_state, CellTokens, TokenSet};
pub use state::{GameOutcome, GameSnapshot, GameState, GameStatus, MoveError, MoveOutcome, ObstaclePolicy};

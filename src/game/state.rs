use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, DropError};
use super::player::{Player, PlayerId};
use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(PlayerId),
    Draw,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Continued,
    Won(PlayerId),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} is not on the board")]
    InvalidColumn(usize),

    #[error("game is already finished")]
    GameOver,
}

impl MoveError {
    /// Out-of-range and full-column moves are the player's fault and can be
    /// retried; anything else is not.
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, MoveError::ColumnFull(_) | MoveError::InvalidColumn(_))
    }
}

/// How many obstacles to seed a new board with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstaclePolicy {
    None,
    Fixed(usize),
    /// `count` obstacles with the given probability, otherwise none.
    Chance { probability: f64, count: usize },
}

impl ObstaclePolicy {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            ObstaclePolicy::None => 0,
            ObstaclePolicy::Fixed(count) => count,
            ObstaclePolicy::Chance { probability, count } => {
                if rng.random_bool(probability.clamp(0.0, 1.0)) {
                    count
                } else {
                    0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    players: [Player; 2],
    current_player: PlayerId,
    outcome: Option<GameOutcome>,
}

/// Serializable read-only view of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub grid: Vec<Vec<Cell>>,
    pub players: [Player; 2],
    pub current_player: PlayerId,
    pub status: GameStatus,
    pub outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create a game between two named players on a `cols × rows` board,
    /// seeded with obstacles according to `obstacles`.
    pub fn new<R: Rng + ?Sized>(
        names: [impl Into<String>; 2],
        cols: usize,
        rows: usize,
        obstacles: ObstaclePolicy,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let [first, second]: [String; 2] = names.map(Into::into);
        if first.trim().is_empty() {
            return Err(SetupError::EmptyPlayerName(PlayerId::One));
        }
        if second.trim().is_empty() {
            return Err(SetupError::EmptyPlayerName(PlayerId::Two));
        }

        let mut board = Board::new(cols, rows)?;
        board.scatter_obstacles(obstacles.resolve(rng), rng);

        Ok(GameState {
            board,
            players: [
                Player {
                    id: PlayerId::One,
                    name: first,
                },
                Player {
                    id: PlayerId::Two,
                    name: second,
                },
            ],
            current_player: PlayerId::One, // Player 1 starts
            outcome: None,
        })
    }

    /// Get current player
    pub fn current_player(&self) -> &Player {
        self.player(self.current_player)
    }

    pub fn current_player_id(&self) -> PlayerId {
        self.current_player
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn status(&self) -> GameStatus {
        if self.outcome.is_some() {
            GameStatus::Finished
        } else {
            GameStatus::Playing
        }
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }

        (0..self.board.cols())
            .filter(|&col| !self.board.is_column_full(col))
            .collect()
    }

    /// Drop the current player's marker in `column` (zero-based).
    ///
    /// A rejected move leaves the state untouched. The current player only
    /// changes when the game continues.
    pub fn apply_move(&mut self, column: usize) -> Result<MoveOutcome, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let mover = self.current_player;
        let row = self
            .board
            .drop_piece(column, mover.to_cell())
            .map_err(|e| match e {
                DropError::ColumnFull => MoveError::ColumnFull(column),
                DropError::InvalidColumn => MoveError::InvalidColumn(column),
            })?;

        // Check for win
        if self.board.check_win(row, column) {
            self.outcome = Some(GameOutcome::Winner(mover));
            return Ok(MoveOutcome::Won(mover));
        }
        if self.board.is_full() {
            self.outcome = Some(GameOutcome::Draw);
            return Ok(MoveOutcome::Draw);
        }

        self.current_player = mover.other();
        Ok(MoveOutcome::Continued)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cols: self.board.cols(),
            rows: self.board.rows(),
            grid: self.board.row_slices().map(<[Cell]>::to_vec).collect(),
            players: self.players.clone(),
            current_player: self.current_player,
            status: self.status(),
            outcome: self.outcome,
        }
    }
}

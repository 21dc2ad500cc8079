//! Property-based tests using proptest.

use super::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Strategy to generate a sequence of column choices, some off the board
fn moves_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..DEFAULT_COLS + 2, 1..80)
}

fn new_game(seed: u64, obstacles: usize) -> GameState {
    GameState::new(
        ["p1", "p2"],
        DEFAULT_COLS,
        DEFAULT_ROWS,
        ObstaclePolicy::Fixed(obstacles),
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

proptest! {
    /// Property: accepted moves add exactly one piece, rejected moves change nothing
    #[test]
    fn prop_moves_count_and_rejections_are_idempotent(
        seed in any::<u64>(),
        obstacles in 0..3usize,
        moves in moves_strategy(),
    ) {
        let mut state = new_game(seed, obstacles);
        let obstacle_cells = state.board().obstacle_count();

        for col in moves {
            let before = state.clone();
            match state.apply_move(col) {
                Ok(_) => {
                    prop_assert_eq!(state.board().piece_count(), before.board().piece_count() + 1);
                }
                Err(_) => {
                    prop_assert_eq!(&state, &before);
                }
            }
            prop_assert_eq!(state.board().obstacle_count(), obstacle_cells);
        }
    }

    /// Property: the current player flips after every non-terminal move
    #[test]
    fn prop_turns_alternate(seed in any::<u64>(), moves in moves_strategy()) {
        let mut state = new_game(seed, 1);
        for col in moves {
            let mover = state.current_player_id();
            match state.apply_move(col) {
                Ok(MoveOutcome::Continued) => {
                    prop_assert_eq!(state.current_player_id(), mover.other());
                }
                Ok(MoveOutcome::Won(winner)) => {
                    prop_assert_eq!(winner, mover);
                    prop_assert_eq!(state.current_player_id(), mover);
                }
                Ok(MoveOutcome::Draw) => {
                    prop_assert!(state.board().is_full());
                }
                Err(_) => {
                    prop_assert_eq!(state.current_player_id(), mover);
                }
            }
        }
    }

    /// Property: the local check after a drop agrees with a full board scan
    #[test]
    fn prop_local_win_check_matches_full_scan(seed in any::<u64>(), moves in moves_strategy()) {
        let mut state = new_game(seed, 2);
        for col in moves {
            if state.apply_move(col).is_err() {
                continue;
            }
            let expected = match state.outcome() {
                Some(GameOutcome::Winner(id)) => Some(id),
                _ => None,
            };
            prop_assert_eq!(state.board().find_win(), expected);
        }
    }

    /// Property: four in a row is a win whichever of the four lands last
    #[test]
    fn prop_horizontal_run_detected_from_any_cell(start in 0..DEFAULT_COLS - 3, last in 0..4usize) {
        let mut board = Board::default();
        let bottom = DEFAULT_ROWS - 1;
        for offset in (0..4).filter(|&o| o != last) {
            board.drop_piece(start + offset, Cell::Player2).unwrap();
            prop_assert!(!board.check_win(bottom, start + offset));
        }
        let row = board.drop_piece(start + last, Cell::Player2).unwrap();
        prop_assert_eq!(row, bottom);
        for offset in 0..4 {
            prop_assert!(board.check_win(bottom, start + offset));
        }
        prop_assert_eq!(board.find_win(), Some(PlayerId::Two));
    }

    /// Property: a run broken by an obstacle is never a win
    #[test]
    fn prop_obstacle_breaks_horizontal_run(start in 0..DEFAULT_COLS - 3, blocked in 0..4usize) {
        let mut board = Board::default();
        let bottom = DEFAULT_ROWS - 1;
        board.place_obstacle(bottom, start + blocked);
        for offset in (0..4).filter(|&o| o != blocked) {
            board.drop_piece(start + offset, Cell::Player1).unwrap();
        }
        prop_assert_eq!(board.get(bottom, start + blocked), Cell::Obstacle);
        prop_assert_eq!(board.find_win(), None);
    }
}

//! Text shown in the thread: the opening post body and the thread title for
//! each stage of a match.

use rand::Rng;

use crate::controller::{Match, MatchStatus, Rejection, Verdict};
use crate::game::{render_grid, CellTokens, GameState, MoveError};

const JOIN_HINT: &str = "Reply to this thread to join";

/// Opening post body for the current state of `m`.
pub fn render_body<R: Rng, T: CellTokens + ?Sized>(m: &Match<R>, tokens: &T) -> String {
    let game = match (m.status(), m.game()) {
        (MatchStatus::Waiting, _) | (_, None) => {
            return if m.participants().is_empty() {
                format!("Waiting for two players\n{JOIN_HINT}")
            } else {
                format!("Waiting for one more player\n{JOIN_HINT}")
            };
        }
        (_, Some(game)) => game,
    };

    let [p1, p2] = game.players();
    let mut message = String::new();
    match m.verdict() {
        None => {
            message += &format!("Match in progress: {} - {}\n", p1.name, p2.name);
            message += &format!("Turn: {}\n", game.current_player().name);
            message += "Instructions:\n";
            message += &format!(
                "Put the column number (1-{}) at the very start of your post, \
                 before any sticker, smiley or text.\n",
                game.board().cols()
            );
            if let Some(rejection) = m.last_rejection() {
                message += &rejection_notice(game, rejection);
            }
        }
        Some(verdict) => {
            message += &format!("Match over: {} - {}\n", p1.name, p2.name);
            message += &match verdict {
                Verdict::Winner(id) => format!("Winner: **{}**\n", game.player(id).name),
                Verdict::Draw => "**Draw**\n".to_string(),
                Verdict::Forfeit { winner } => {
                    format!("Winner: **{}** by forfeit\n", game.player(winner).name)
                }
            };
        }
    }
    message += &render_grid(game.board(), tokens);
    message
}

fn rejection_notice(game: &GameState, rejection: &Rejection) -> String {
    let name = &game.player(rejection.player).name;
    let column = rejection.column + 1;
    match rejection.reason {
        MoveError::ColumnFull(_) => format!("Column {column} is full, {name} must pick another one.\n"),
        MoveError::InvalidColumn(_) => {
            format!("Column {column} does not exist, {name} must pick another one.\n")
        }
        MoveError::GameOver => String::new(),
    }
}

/// Thread title once two players are known; `None` while waiting.
pub fn render_title<R: Rng>(m: &Match<R>, base: &str) -> Option<String> {
    let game = m.game()?;
    let [p1, p2] = game.players();
    let stage = match m.status() {
        MatchStatus::Waiting => return None,
        MatchStatus::Playing => "match in progress",
        MatchStatus::Finished | MatchStatus::Aborted | MatchStatus::Ended => "match over",
    };
    Some(format!("{base} - {} - {} : {stage}", p1.name, p2.name))
}

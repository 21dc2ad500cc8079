use rand::rngs::StdRng;
use rand::Rng;

use super::signal::TurnSignal;
use crate::config::{BoardConfig, ControllerConfig};
use crate::error::MatchError;
use crate::game::{render_state, Board, GameState, MoveError, MoveOutcome, PlayerId, TokenSet};

/// Coarse lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Waiting,
    Playing,
    Finished,
    Aborted,
    Ended,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(PlayerId),
    Draw,
    /// The due player let the inactivity window pass.
    Forfeit { winner: PlayerId },
}

impl Verdict {
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            Verdict::Winner(id) | Verdict::Forfeit { winner: id } => Some(id),
            Verdict::Draw => None,
        }
    }
}

/// What a processing step changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A first participant showed up; still waiting for a second one.
    Joined { name: String },
    Started { players: [String; 2], obstacles: usize },
    Rejected {
        player: PlayerId,
        column: usize,
        reason: MoveError,
    },
    Advanced { player: PlayerId, column: usize },
    Finished(Verdict),
    Ended,
}

/// Someone who posted in the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Stable identity, e.g. the forum account id.
    pub id: String,
    pub name: String,
    /// Unix seconds of the participant's latest post activity.
    pub last_activity: u64,
}

/// The last move that was refused, kept so the next report can mention it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub player: PlayerId,
    pub column: usize,
    pub reason: MoveError,
}

/// State machine for one match: waits for two participants, runs a game from
/// their turn signals, and ends on a result or a forfeit.
///
/// Every step returns the [`Transition`] it caused, if any, and raises the
/// `updated` flag until [`Match::mark_reported`] is called.
#[derive(Debug)]
pub struct Match<R = StdRng> {
    board: BoardConfig,
    inactivity_timeout: u64,
    rng: R,
    status: MatchStatus,
    participants: Vec<Participant>,
    game: Option<GameState>,
    last_move_at: u64,
    last_signal_at: u64,
    last_rejection: Option<Rejection>,
    verdict: Option<Verdict>,
    updated: bool,
}

impl<R: Rng> Match<R> {
    /// A new match in `Waiting`. It starts out flagged as updated so the
    /// waiting message gets shown once.
    ///
    /// Fails when the board dimensions are out of range, before anyone joins.
    pub fn new(
        board: BoardConfig,
        controller: &ControllerConfig,
        rng: R,
    ) -> Result<Self, MatchError> {
        Board::check_dimensions(board.cols, board.rows)?;
        Ok(Match {
            board,
            inactivity_timeout: controller.inactivity_timeout_secs,
            rng,
            status: MatchStatus::Waiting,
            participants: Vec::new(),
            game: None,
            last_move_at: 0,
            last_signal_at: 0,
            last_rejection: None,
            verdict: None,
            updated: true,
        })
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Participants in player order once the game has started.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn last_rejection(&self) -> Option<&Rejection> {
        self.last_rejection.as_ref()
    }

    pub fn last_move_at(&self) -> u64 {
        self.last_move_at
    }

    fn change_status(&mut self, status: MatchStatus) {
        log::info!("match status: {:?} -> {:?}", self.status, status);
        self.status = status;
        self.updated = true;
    }

    /// Feed the thread's posters, oldest first. Only acts while `Waiting`.
    ///
    /// Participants are deduplicated by id. With one distinct participant the
    /// match keeps waiting; with two or more, the first two become Player 1
    /// and Player 2 and the game starts.
    pub fn observe_participants(
        &mut self,
        participants: &[Participant],
    ) -> Result<Option<Transition>, MatchError> {
        if self.status != MatchStatus::Waiting {
            return Ok(None);
        }

        let mut distinct: Vec<&Participant> = Vec::new();
        for p in participants {
            if !distinct.iter().any(|d| d.id == p.id) {
                distinct.push(p);
            }
        }

        match distinct.as_slice() {
            [] => Ok(None),
            [only] => {
                if !self.participants.is_empty() {
                    return Ok(None);
                }
                log::info!("{} joined, waiting for a second player", only.name);
                self.participants = vec![(*only).clone()];
                self.updated = true;
                Ok(Some(Transition::Joined {
                    name: only.name.clone(),
                }))
            }
            [first, second, ..] => {
                let players = [first.name.clone(), second.name.clone()];
                let game = GameState::new(
                    players.clone(),
                    self.board.cols,
                    self.board.rows,
                    self.board.obstacle_policy(),
                    &mut self.rng,
                )?;
                let obstacles = game.board().obstacle_count();

                self.participants = vec![(*first).clone(), (*second).clone()];
                self.last_move_at = first.last_activity.max(second.last_activity);
                self.last_signal_at = self.last_move_at;
                self.game = Some(game);
                log::info!(
                    "starting match {} vs {} with {} obstacle(s)",
                    players[0],
                    players[1],
                    obstacles
                );
                self.change_status(MatchStatus::Playing);
                Ok(Some(Transition::Started { players, obstacles }))
            }
        }
    }

    /// Player whose turn it is, while a game is running.
    pub fn due_player(&self) -> Option<PlayerId> {
        match (self.status, &self.game) {
            (MatchStatus::Playing, Some(game)) => Some(game.current_player_id()),
            _ => None,
        }
    }

    /// Process a turn signal. Only acts while `Playing`.
    ///
    /// Signals for the other player, signals not newer than the last accepted
    /// move or last consumed signal, and signals without a column are ignored.
    /// Invalid moves are rejected without changing the board or the turn.
    pub fn handle_turn_signal(
        &mut self,
        signal: &TurnSignal,
    ) -> Result<Option<Transition>, MatchError> {
        if self.status != MatchStatus::Playing {
            return Ok(None);
        }
        let Some(game) = self.game.as_mut() else {
            return Ok(None);
        };

        if signal.player != game.current_player_id() {
            log::debug!("ignoring signal from player {} out of turn", signal.player.number());
            return Ok(None);
        }
        if signal.timestamp <= self.last_move_at.max(self.last_signal_at) {
            return Ok(None);
        }
        let Some(column) = signal.selected_column(game.board().cols()) else {
            return Ok(None);
        };

        self.last_signal_at = signal.timestamp;
        let player = signal.player;
        match game.apply_move(column) {
            Ok(outcome) => {
                log::info!("{} played column {}", game.player(player).name, column + 1);
                self.last_move_at = signal.timestamp;
                self.last_rejection = None;
                self.updated = true;
                let verdict = match outcome {
                    MoveOutcome::Continued => {
                        return Ok(Some(Transition::Advanced { player, column }));
                    }
                    MoveOutcome::Won(winner) => Verdict::Winner(winner),
                    MoveOutcome::Draw => Verdict::Draw,
                };
                self.verdict = Some(verdict);
                self.change_status(MatchStatus::Finished);
                Ok(Some(Transition::Finished(verdict)))
            }
            Err(reason) if reason.is_invalid_move() => {
                log::warn!("bad move from player {}: {reason}", player.number());
                log::debug!("\n{}", render_state(game, &TokenSet::ascii()));
                self.last_rejection = Some(Rejection {
                    player,
                    column,
                    reason: reason.clone(),
                });
                self.updated = true;
                Ok(Some(Transition::Rejected {
                    player,
                    column,
                    reason,
                }))
            }
            Err(e) => Err(MatchError::Engine(e)),
        }
    }

    /// Abort the match when no move has been accepted for the inactivity
    /// window. The player who was due loses by forfeit.
    pub fn check_inactivity(&mut self, now: u64) -> Option<Transition> {
        let due = self.due_player()?;
        if now.saturating_sub(self.last_move_at) < self.inactivity_timeout {
            return None;
        }

        let verdict = Verdict::Forfeit {
            winner: due.other(),
        };
        log::info!(
            "player {} inactive for {}s, forfeit",
            due.number(),
            now.saturating_sub(self.last_move_at)
        );
        self.verdict = Some(verdict);
        self.change_status(MatchStatus::Aborted);
        Some(Transition::Finished(verdict))
    }

    /// Acknowledge that the current state has been shown. A finished or
    /// aborted match moves to `Ended`, after which nothing changes.
    pub fn mark_reported(&mut self) -> Option<Transition> {
        self.updated = false;
        match self.status {
            MatchStatus::Finished | MatchStatus::Aborted => {
                self.status = MatchStatus::Ended;
                log::info!("match ended");
                Some(Transition::Ended)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;
    use crate::game::{Cell, GameOutcome};
    use rand::SeedableRng;

    fn participant(id: &str, at: u64) -> Participant {
        Participant {
            id: id.to_string(),
            name: format!("name-{id}"),
            last_activity: at,
        }
    }

    fn no_obstacles() -> BoardConfig {
        BoardConfig {
            obstacle_chance: 0.0,
            ..BoardConfig::default()
        }
    }

    fn new_match() -> Match {
        Match::new(
            no_obstacles(),
            &ControllerConfig::default(),
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    fn started_match() -> Match {
        let mut m = new_match();
        m.observe_participants(&[participant("a", 100), participant("b", 110)])
            .unwrap();
        m.mark_reported();
        m
    }

    #[test]
    fn test_waits_for_two_distinct_participants() {
        let mut m = new_match();
        assert!(m.is_updated());
        assert_eq!(m.observe_participants(&[]).unwrap(), None);

        let lone = [participant("a", 1), participant("a", 2)];
        assert_eq!(
            m.observe_participants(&lone).unwrap(),
            Some(Transition::Joined {
                name: "name-a".into()
            })
        );
        assert_eq!(m.status(), MatchStatus::Waiting);
        m.mark_reported();

        // Same lone participant again: nothing new to report
        assert_eq!(m.observe_participants(&lone).unwrap(), None);
        assert!(!m.is_updated());
    }

    #[test]
    fn test_starts_with_first_two_participants() {
        let mut m = new_match();
        let posters = [
            participant("a", 100),
            participant("a", 105),
            participant("b", 110),
            participant("c", 120),
        ];
        let transition = m.observe_participants(&posters).unwrap();

        assert_eq!(
            transition,
            Some(Transition::Started {
                players: ["name-a".into(), "name-b".into()],
                obstacles: 0
            })
        );
        assert_eq!(m.status(), MatchStatus::Playing);
        assert_eq!(m.last_move_at(), 110);
        assert_eq!(m.participants().len(), 2);
        assert_eq!(m.due_player(), Some(PlayerId::One));
        assert!(m.is_updated());
    }

    #[test]
    fn test_obstacle_policy_applied_on_start() {
        let board = BoardConfig {
            obstacle_chance: 1.0,
            obstacle_count: 1,
            ..BoardConfig::default()
        };
        let mut m =
            Match::new(board, &ControllerConfig::default(), StdRng::seed_from_u64(5)).unwrap();
        let transition = m
            .observe_participants(&[participant("a", 1), participant("b", 2)])
            .unwrap();
        assert!(matches!(
            transition,
            Some(Transition::Started { obstacles: 1, .. })
        ));
        assert_eq!(m.game().unwrap().board().obstacle_count(), 1);
    }

    #[test]
    fn test_empty_name_is_fatal() {
        let mut m = new_match();
        let mut nameless = participant("b", 2);
        nameless.name = String::new();
        let err = m
            .observe_participants(&[participant("a", 1), nameless])
            .unwrap_err();
        assert!(matches!(err, MatchError::Setup(_)));
    }

    #[test]
    fn test_board_wider_than_selectors_is_refused() {
        let board = BoardConfig {
            cols: 12,
            ..no_obstacles()
        };
        let err = Match::new(board, &ControllerConfig::default(), StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(
            err,
            MatchError::Setup(SetupError::InvalidDimensions { cols: 12, rows: 6 })
        ));
    }

    #[test]
    fn test_signal_from_non_current_player_is_ignored() {
        let mut m = started_match();
        let signal = TurnSignal::text(PlayerId::Two, 200, "3");

        assert_eq!(m.handle_turn_signal(&signal).unwrap(), None);
        assert_eq!(m.game().unwrap().board().piece_count(), 0);
        assert_eq!(m.due_player(), Some(PlayerId::One));
        assert!(!m.is_updated());
    }

    #[test]
    fn test_stale_and_malformed_signals_are_ignored() {
        let mut m = started_match();

        // Not newer than the start of the match
        let stale = TurnSignal::text(PlayerId::One, 110, "3");
        assert_eq!(m.handle_turn_signal(&stale).unwrap(), None);

        let malformed = TurnSignal::text(PlayerId::One, 200, "no idea");
        assert_eq!(m.handle_turn_signal(&malformed).unwrap(), None);

        assert_eq!(m.game().unwrap().board().piece_count(), 0);
        assert!(!m.is_updated());
    }

    #[test]
    fn test_accepted_move_advances_turn() {
        let mut m = started_match();
        let signal = TurnSignal::text(PlayerId::One, 200, "4 please");

        assert_eq!(
            m.handle_turn_signal(&signal).unwrap(),
            Some(Transition::Advanced {
                player: PlayerId::One,
                column: 3
            })
        );
        assert_eq!(m.game().unwrap().board().get(5, 3), Cell::Player1);
        assert_eq!(m.due_player(), Some(PlayerId::Two));
        assert_eq!(m.last_move_at(), 200);
        assert!(m.is_updated());

        // Replaying the same post does nothing
        m.mark_reported();
        let replay = TurnSignal::text(PlayerId::Two, 200, "4");
        assert_eq!(m.handle_turn_signal(&replay).unwrap(), None);
    }

    #[test]
    fn test_invalid_move_is_rejected_once() {
        let mut m = started_match();
        let mut at = 200;
        // Fill column 0
        for player in [PlayerId::One, PlayerId::Two].into_iter().cycle().take(6) {
            at += 1;
            m.handle_turn_signal(&TurnSignal::text(player, at, "1")).unwrap();
        }
        m.mark_reported();
        let before = m.game().unwrap().clone();

        at += 1;
        let signal = TurnSignal::text(PlayerId::One, at, "1");
        assert_eq!(
            m.handle_turn_signal(&signal).unwrap(),
            Some(Transition::Rejected {
                player: PlayerId::One,
                column: 0,
                reason: MoveError::ColumnFull(0)
            })
        );
        assert_eq!(m.game().unwrap(), &before);
        assert_eq!(m.due_player(), Some(PlayerId::One));
        assert_eq!(m.last_rejection().unwrap().column, 0);
        assert!(m.is_updated());

        // The same post is not rejected again on the next poll
        m.mark_reported();
        assert_eq!(m.handle_turn_signal(&signal).unwrap(), None);

        // An edited post is accepted and clears the rejection
        let edited = TurnSignal::text(PlayerId::One, at + 1, "2");
        assert!(matches!(
            m.handle_turn_signal(&edited).unwrap(),
            Some(Transition::Advanced { column: 1, .. })
        ));
        assert!(m.last_rejection().is_none());
    }

    #[test]
    fn test_column_payload_out_of_range_is_rejected() {
        let mut m = started_match();
        let signal = TurnSignal::column(PlayerId::One, 200, 9);
        assert!(matches!(
            m.handle_turn_signal(&signal).unwrap(),
            Some(Transition::Rejected {
                reason: MoveError::InvalidColumn(9),
                ..
            })
        ));
    }

    #[test]
    fn test_win_finishes_then_ends() {
        let mut m = started_match();
        let mut at = 200;
        let mut last = None;
        // P1 stacks column 3, P2 stacks column 5
        for (player, col) in [
            (PlayerId::One, "3"),
            (PlayerId::Two, "5"),
            (PlayerId::One, "3"),
            (PlayerId::Two, "5"),
            (PlayerId::One, "3"),
            (PlayerId::Two, "5"),
            (PlayerId::One, "3"),
        ] {
            at += 10;
            last = m.handle_turn_signal(&TurnSignal::text(player, at, col)).unwrap();
        }

        assert_eq!(last, Some(Transition::Finished(Verdict::Winner(PlayerId::One))));
        assert_eq!(m.status(), MatchStatus::Finished);
        assert_eq!(
            m.game().unwrap().outcome(),
            Some(GameOutcome::Winner(PlayerId::One))
        );
        assert_eq!(m.due_player(), None);

        // No more moves once finished
        let late = TurnSignal::text(PlayerId::Two, at + 10, "1");
        assert_eq!(m.handle_turn_signal(&late).unwrap(), None);

        assert_eq!(m.mark_reported(), Some(Transition::Ended));
        assert_eq!(m.status(), MatchStatus::Ended);
        assert!(!m.is_updated());
        assert_eq!(m.mark_reported(), None);
        assert_eq!(m.status(), MatchStatus::Ended);
    }

    #[test]
    fn test_inactivity_forfeits_due_player() {
        let mut m = started_match();
        m.handle_turn_signal(&TurnSignal::text(PlayerId::One, 200, "1"))
            .unwrap();
        m.mark_reported();

        // Player 2 is due; window is 300s from the last accepted move
        assert_eq!(m.check_inactivity(499), None);
        assert_eq!(m.status(), MatchStatus::Playing);

        assert_eq!(
            m.check_inactivity(500),
            Some(Transition::Finished(Verdict::Forfeit {
                winner: PlayerId::One
            }))
        );
        assert_eq!(m.status(), MatchStatus::Aborted);
        assert!(m.is_updated());
        assert_eq!(m.verdict().unwrap().winner(), Some(PlayerId::One));

        assert_eq!(m.check_inactivity(10_000), None);
        assert_eq!(m.mark_reported(), Some(Transition::Ended));
    }

    #[test]
    fn test_inactivity_ignored_while_waiting() {
        let mut m = new_match();
        assert_eq!(m.check_inactivity(1_000_000), None);
        assert_eq!(m.status(), MatchStatus::Waiting);
    }

    #[test]
    fn test_verdict_winner() {
        assert_eq!(Verdict::Winner(PlayerId::Two).winner(), Some(PlayerId::Two));
        assert_eq!(Verdict::Draw.winner(), None);
        assert_eq!(
            Verdict::Forfeit {
                winner: PlayerId::One
            }
            .winner(),
            Some(PlayerId::One)
        );
    }
}

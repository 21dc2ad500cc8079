//! Match lifecycle: turns participants and turn signals into game moves and
//! reports each change as a [`Transition`].

mod lifecycle;
mod signal;

pub use lifecycle::{Match, MatchStatus, Participant, Rejection, Transition, Verdict};
pub use signal::{parse_column, Payload, TurnSignal};

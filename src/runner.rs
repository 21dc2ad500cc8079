//! Poll loop binding a [`Match`] to a forum thread.
//!
//! One cycle reads the thread, feeds the controller, and rewrites the opening
//! post when the controller reports a change. Cycles never overlap: the next
//! one is only scheduled after the previous one has returned.

use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AppConfig;
use crate::controller::{Match, MatchStatus, Participant, Transition, TurnSignal, Verdict};
use crate::error::RunError;
use crate::forum::{with_retry, Forum, Post, PostId, RetryPolicy, ThreadId};
use crate::report;

/// Source of the current time in unix seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

fn participant(post: &Post) -> Participant {
    Participant {
        id: post.author_id.clone(),
        name: post.author_name.clone(),
        last_activity: post.last_activity(),
    }
}

/// Runs one match on one thread.
pub struct MatchRunner<F, R = StdRng> {
    forum: F,
    thread: ThreadId,
    controller: Match<R>,
    config: AppConfig,
    retry: RetryPolicy,
    /// Post each player edits to play, indexed by player.
    player_posts: Vec<PostId>,
    last_title: Option<String>,
}

impl<F: Forum, R: Rng> MatchRunner<F, R> {
    /// Open a new thread and run the match on it. The thread is created with
    /// the waiting message, so it is not published again on the first poll.
    pub fn open(mut forum: F, config: &AppConfig, rng: R) -> Result<Self, RunError> {
        let retry = RetryPolicy::from(&config.controller);
        let mut controller = Match::new(config.board.clone(), &config.controller, rng)?;
        let body = report::render_body(&controller, &config.tokens);
        let title = &config.controller.thread_title;
        let thread = with_retry(&retry, "create thread", || forum.create_thread(title, &body))?;
        controller.mark_reported();
        log::info!("opened thread {thread}");
        Ok(Self::bind(forum, thread, config, controller))
    }

    /// Run the match on an existing thread.
    pub fn bind(forum: F, thread: ThreadId, config: &AppConfig, controller: Match<R>) -> Self {
        MatchRunner {
            forum,
            thread,
            controller,
            config: config.clone(),
            retry: RetryPolicy::from(&config.controller),
            player_posts: Vec::new(),
            last_title: None,
        }
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn controller(&self) -> &Match<R> {
        &self.controller
    }

    pub fn forum(&self) -> &F {
        &self.forum
    }

    pub fn forum_mut(&mut self) -> &mut F {
        &mut self.forum
    }

    pub fn is_ended(&self) -> bool {
        self.controller.status() == MatchStatus::Ended
    }

    /// Run one poll cycle at time `now` and return what changed.
    pub fn poll_once(&mut self, now: u64) -> Result<Vec<Transition>, RunError> {
        let mut transitions = Vec::new();
        log::debug!("poll at {now}, status {:?}", self.controller.status());

        match self.controller.status() {
            MatchStatus::Waiting => {
                let posts = with_retry(&self.retry, "read replies", || {
                    self.forum.replies(self.thread)
                })?;
                let participants: Vec<Participant> = posts.iter().map(participant).collect();
                if let Some(t) = self.controller.observe_participants(&participants)? {
                    if matches!(t, Transition::Started { .. }) {
                        self.player_posts = self
                            .controller
                            .participants()
                            .iter()
                            .filter_map(|p| posts.iter().find(|post| post.author_id == p.id))
                            .map(|post| post.id)
                            .collect();
                    }
                    transitions.push(t);
                }
            }
            MatchStatus::Playing => {
                if let Some(t) = self.controller.check_inactivity(now) {
                    transitions.push(t);
                } else if let Some(due) = self.controller.due_player() {
                    let Some(&post_id) = self.player_posts.get(due.index()) else {
                        return Ok(transitions);
                    };
                    let post = with_retry(&self.retry, "read post", || {
                        self.forum.post(self.thread, post_id)
                    })?;
                    let signal = TurnSignal::text(due, post.last_activity(), post.content);
                    if let Some(t) = self.controller.handle_turn_signal(&signal)? {
                        transitions.push(t);
                    }
                }
            }
            MatchStatus::Finished | MatchStatus::Aborted | MatchStatus::Ended => {}
        }

        if self.controller.is_updated() {
            self.publish()?;
            if let Some(t) = self.controller.mark_reported() {
                transitions.push(t);
            }
        }
        Ok(transitions)
    }

    /// Rewrite the opening post, and the title when it changed.
    fn publish(&mut self) -> Result<(), RunError> {
        let title = report::render_title(&self.controller, &self.config.controller.thread_title);
        if let Some(title) = title.filter(|t| self.last_title.as_ref() != Some(t)) {
            with_retry(&self.retry, "set title", || {
                self.forum.set_title(self.thread, &title)
            })?;
            self.last_title = Some(title);
        }

        let body = report::render_body(&self.controller, &self.config.tokens);
        with_retry(&self.retry, "edit opening post", || {
            self.forum.edit_opening_post(self.thread, &body)
        })?;
        Ok(())
    }

    /// Poll until the match has ended, sleeping between cycles.
    pub fn run<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<Option<Verdict>, RunError> {
        let interval = self.config.controller.poll_interval();
        loop {
            if self.is_ended() {
                return Ok(self.controller.verdict());
            }
            for t in self.poll_once(clock.now())? {
                log::debug!("transition: {t:?}");
            }
            if !self.is_ended() && !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }
}

/// Plays matches back to back, each on a fresh thread.
pub struct Bot<F> {
    forum: F,
    config: AppConfig,
    rng: StdRng,
}

impl<F: Forum> Bot<F> {
    pub fn new(forum: F, config: AppConfig, rng: StdRng) -> Self {
        Bot { forum, config, rng }
    }

    pub fn forum(&self) -> &F {
        &self.forum
    }

    /// Run matches until `max_matches` have ended (forever when `None`).
    /// Returns the number of matches played.
    pub fn serve<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        max_matches: Option<usize>,
    ) -> Result<usize, RunError> {
        let mut played = 0;
        while max_matches.map_or(true, |max| played < max) {
            if played > 0 {
                let delay = self.config.controller.restart_delay();
                log::info!("next match in {}s", delay.as_secs());
                thread::sleep(delay);
            }
            let rng = StdRng::from_rng(&mut self.rng);
            let mut runner = MatchRunner::open(&mut self.forum, &self.config, rng)?;
            let verdict = runner.run(clock)?;
            log::info!("match on thread {} ended: {verdict:?}", runner.thread());
            played += 1;
        }
        Ok(played)
    }
}

//! # Forum Connect Four
//!
//! Connect Four matches played through posts on a forum thread. Players join
//! by replying to the thread and play by editing their reply so that it
//! starts with a column number; the bot keeps the opening post up to date
//! with the board.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, players, moves, win/draw detection
//! - [`controller`]: Match lifecycle state machine and turn signal parsing
//! - [`forum`]: Forum abstraction, retries, in-memory forum
//! - [`report`]: Opening post and title rendering
//! - [`runner`]: Poll loop and back-to-back match bot
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod config;
pub mod controller;
pub mod error;
pub mod forum;
pub mod game;
pub mod report;
pub mod runner;

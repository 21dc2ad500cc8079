//! The forum as seen by the match runner.
//!
//! Implement [`Forum`] for a real forum client; [`MemoryForum`] keeps
//! threads in memory for tests and local play.

mod memory;
mod retry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ForumError;

pub use memory::MemoryForum;
pub use retry::{with_retry, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reply in a thread. Timestamps are unix seconds; `edited` equals
/// `created` until the post is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created: u64,
    pub edited: u64,
}

impl Post {
    /// Latest time the author touched this post.
    pub fn last_activity(&self) -> u64 {
        self.created.max(self.edited)
    }
}

/// Operations the runner needs from a forum.
pub trait Forum {
    /// Open a thread; the body becomes its opening post.
    fn create_thread(&mut self, title: &str, body: &str) -> Result<ThreadId, ForumError>;

    /// All replies, oldest first, without the opening post.
    fn replies(&mut self, thread: ThreadId) -> Result<Vec<Post>, ForumError>;

    fn post(&mut self, thread: ThreadId, post: PostId) -> Result<Post, ForumError>;

    fn edit_opening_post(&mut self, thread: ThreadId, body: &str) -> Result<(), ForumError>;

    fn set_title(&mut self, thread: ThreadId, title: &str) -> Result<(), ForumError>;
}

impl<F: Forum + ?Sized> Forum for &mut F {
    fn create_thread(&mut self, title: &str, body: &str) -> Result<ThreadId, ForumError> {
        (**self).create_thread(title, body)
    }

    fn replies(&mut self, thread: ThreadId) -> Result<Vec<Post>, ForumError> {
        (**self).replies(thread)
    }

    fn post(&mut self, thread: ThreadId, post: PostId) -> Result<Post, ForumError> {
        (**self).post(thread, post)
    }

    fn edit_opening_post(&mut self, thread: ThreadId, body: &str) -> Result<(), ForumError> {
        (**self).edit_opening_post(thread, body)
    }

    fn set_title(&mut self, thread: ThreadId, title: &str) -> Result<(), ForumError> {
        (**self).set_title(thread, title)
    }
}

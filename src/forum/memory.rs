use std::collections::BTreeMap;

use super::{Forum, Post, PostId, ThreadId};
use crate::error::ForumError;

#[derive(Debug, Clone, Default)]
struct Thread {
    title: String,
    opening_post: String,
    opening_edits: usize,
    replies: Vec<Post>,
}

/// In-memory forum. Post ids are unique across threads.
#[derive(Debug, Default)]
pub struct MemoryForum {
    threads: BTreeMap<ThreadId, Thread>,
    next_thread: u64,
    next_post: u64,
    /// Number of upcoming requests that fail with a transient error.
    pending_failures: usize,
}

impl MemoryForum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` trait calls fail with [`ForumError::Transient`].
    pub fn fail_next(&mut self, count: usize) {
        self.pending_failures = count;
    }

    fn check_failure(&mut self) -> Result<(), ForumError> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(ForumError::Transient("simulated outage".into()));
        }
        Ok(())
    }

    fn thread(&self, thread: ThreadId) -> Result<&Thread, ForumError> {
        self.threads
            .get(&thread)
            .ok_or(ForumError::ThreadNotFound(thread))
    }

    fn thread_mut(&mut self, thread: ThreadId) -> Result<&mut Thread, ForumError> {
        self.threads
            .get_mut(&thread)
            .ok_or(ForumError::ThreadNotFound(thread))
    }

    /// Add a reply at time `at`.
    pub fn reply(
        &mut self,
        thread: ThreadId,
        author_id: &str,
        author_name: &str,
        content: &str,
        at: u64,
    ) -> Result<PostId, ForumError> {
        self.next_post += 1;
        let id = PostId(self.next_post);
        self.thread_mut(thread)?.replies.push(Post {
            id,
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            content: content.to_string(),
            created: at,
            edited: at,
        });
        Ok(id)
    }

    /// Replace the content of a reply at time `at`.
    pub fn edit(
        &mut self,
        thread: ThreadId,
        post: PostId,
        content: &str,
        at: u64,
    ) -> Result<(), ForumError> {
        let reply = self
            .thread_mut(thread)?
            .replies
            .iter_mut()
            .find(|p| p.id == post)
            .ok_or(ForumError::PostNotFound(post))?;
        reply.content = content.to_string();
        reply.edited = at;
        Ok(())
    }

    /// Most recent reply by `author_id`.
    pub fn latest_post_by(&self, thread: ThreadId, author_id: &str) -> Option<PostId> {
        self.threads
            .get(&thread)?
            .replies
            .iter()
            .rev()
            .find(|p| p.author_id == author_id)
            .map(|p| p.id)
    }

    pub fn latest_thread(&self) -> Option<ThreadId> {
        self.threads.keys().next_back().copied()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn title(&self, thread: ThreadId) -> Option<&str> {
        self.threads.get(&thread).map(|t| t.title.as_str())
    }

    pub fn opening_post(&self, thread: ThreadId) -> Option<&str> {
        self.threads.get(&thread).map(|t| t.opening_post.as_str())
    }

    /// How many times the opening post has been rewritten.
    pub fn opening_edits(&self, thread: ThreadId) -> usize {
        self.threads.get(&thread).map_or(0, |t| t.opening_edits)
    }
}

impl Forum for MemoryForum {
    fn create_thread(&mut self, title: &str, body: &str) -> Result<ThreadId, ForumError> {
        self.check_failure()?;
        self.next_thread += 1;
        let id = ThreadId(self.next_thread);
        self.threads.insert(
            id,
            Thread {
                title: title.to_string(),
                opening_post: body.to_string(),
                ..Thread::default()
            },
        );
        Ok(id)
    }

    fn replies(&mut self, thread: ThreadId) -> Result<Vec<Post>, ForumError> {
        self.check_failure()?;
        Ok(self.thread(thread)?.replies.clone())
    }

    fn post(&mut self, thread: ThreadId, post: PostId) -> Result<Post, ForumError> {
        self.check_failure()?;
        self.thread(thread)?
            .replies
            .iter()
            .find(|p| p.id == post)
            .cloned()
            .ok_or(ForumError::PostNotFound(post))
    }

    fn edit_opening_post(&mut self, thread: ThreadId, body: &str) -> Result<(), ForumError> {
        self.check_failure()?;
        let thread = self.thread_mut(thread)?;
        thread.opening_post = body.to_string();
        thread.opening_edits += 1;
        Ok(())
    }

    fn set_title(&mut self, thread: ThreadId, title: &str) -> Result<(), ForumError> {
        self.check_failure()?;
        self.thread_mut(thread)?.title = title.to_string();
        Ok(())
    }
}

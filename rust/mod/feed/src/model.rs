use serde::Serialize;

use crate::page::{self, PageWindow};

/// A registered user, with follower counts read from the graph lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Opaque password hash. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    /// Number of users following this one.
    pub followers: u64,
    /// Number of users this one follows.
    pub following: u64,
}

/// A published post.
///
/// `username` is the author's name as it was when the post was written. It is
/// a copy, not a reference; usernames cannot change, so it never goes stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub uid: i64,
    pub username: String,
    /// Rendered content: HTML-escaped, mentions turned into profile links.
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub published_at: i64,
}

/// Input for [`crate::SocialGraphDao::save_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub uid: i64,
    pub username: String,
    pub content: String,
    pub published_at: i64,
}

/// One page read from a feed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Length of the whole list the page was cut from.
    pub total: u64,
    /// The window after clamping to `total`.
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.window.has_more(self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.window.page() != self.prev_page()
    }

    pub fn next_page(&self) -> u64 {
        page::next_page(self.total, self.window.size(), self.window.page())
    }

    pub fn prev_page(&self) -> u64 {
        page::prev_page(self.window.page())
    }
}

//! FeedService: account flows and page views on top of [`SocialGraphDao`].
//!
//! This is the surface a front end (HTTP handlers, the CLI) calls with raw
//! user input. It validates form input, hashes passwords, renders post
//! content and assembles page views; all storage goes through the DAO.

use std::sync::{Arc, LazyLock};

use chirp_core::{now_millis, FeedConfig, ServiceError};
use chirp_kv::KVStore;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::content::render_content;
use crate::dao::SocialGraphDao;
use crate::model::{NewPost, Page, Post, User};
use crate::page::PageWindow;
use crate::password::{hash_password, verify_password};

static USERNAME_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,16}$").expect("username pattern compiles"));
static PASSWORD_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{6,16}$").expect("password pattern compiles"));

/// Navigation state of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNav {
    pub page: u64,
    pub has_more: bool,
    pub has_prev: bool,
    pub next: u64,
    pub prev: u64,
}

impl<T> From<&Page<T>> for PageNav {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.window.page(),
            has_more: page.has_more(),
            has_prev: page.has_prev(),
            next: page.next_page(),
            prev: page.prev_page(),
        }
    }
}

/// A user's profile page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub posts: Vec<Post>,
    pub nav: PageNav,
    /// The viewer is looking at their own profile.
    pub is_self: bool,
    /// Whether the viewer follows this user. None without a registered
    /// viewer or on one's own profile.
    pub followed: Option<bool>,
}

/// The global timeline page.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub posts: Vec<Post>,
    /// Newest registered users.
    pub recent_users: Vec<User>,
    pub nav: PageNav,
}

pub struct FeedService {
    dao: SocialGraphDao,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(kv: Arc<dyn KVStore>, config: FeedConfig) -> Self {
        Self {
            dao: SocialGraphDao::new(kv),
            config,
        }
    }

    /// Direct access to the data layer.
    pub fn dao(&self) -> &SocialGraphDao {
        &self.dao
    }

    // ── Accounts ──

    /// Create an account after checking the form input.
    pub fn sign_up(&self, username: &str, password: &str, confirm: &str) -> Result<User, ServiceError> {
        if username.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(ServiceError::Validation(
                "username and password must not be empty".into(),
            ));
        }
        if password != confirm {
            return Err(ServiceError::Validation("passwords do not match".into()));
        }
        if !USERNAME_FORMAT.is_match(username) {
            return Err(ServiceError::Validation(
                "username must be 3-16 letters, digits or underscores".into(),
            ));
        }
        if !PASSWORD_FORMAT.is_match(password) {
            return Err(ServiceError::Validation(
                "password must be 6-16 letters, digits, '_' or '.'".into(),
            ));
        }
        if self.dao.user_exists(username)? {
            return Err(ServiceError::Conflict(format!(
                "username '{}' already exists",
                username
            )));
        }

        let hash = hash_password(password)?;
        self.dao.register(username, &hash)?;
        self.dao.find_user(username)
    }

    /// Check credentials. Unknown users and wrong passwords are reported the
    /// same way.
    pub fn sign_in(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password must not be empty".into(),
            ));
        }
        if !USERNAME_FORMAT.is_match(username) || !PASSWORD_FORMAT.is_match(password) {
            return Err(ServiceError::Validation(
                "malformed username or password".into(),
            ));
        }

        let denied = || ServiceError::Unauthorized("wrong username or password".into());
        let user = match self.dao.find_user(username) {
            Ok(user) => user,
            Err(ServiceError::NotFound(_)) => return Err(denied()),
            Err(e) => return Err(e),
        };
        if !verify_password(password, &user.password_hash) {
            return Err(denied());
        }
        info!(uid = user.id, username, "signed in");
        Ok(user)
    }

    // ── Posting ──

    /// Publish `content` as `username`, stamped with the current time.
    pub fn publish(&self, username: &str, content: &str) -> Result<Post, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation("content must not be empty".into()));
        }
        let uid = self
            .dao
            .find_uid(username)?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{}' not found", username)))?;
        let content = render_content(content, |name| self.dao.user_exists(name))?;

        self.dao.save_post(NewPost {
            uid,
            username: username.to_string(),
            content,
            published_at: now_millis(),
        })
    }

    // ── Following ──

    /// `follower` starts following `target`. Returns false if the edge was
    /// already there.
    pub fn follow(&self, target: &str, follower: &str) -> Result<bool, ServiceError> {
        if target == follower {
            return Err(ServiceError::Validation("cannot follow yourself".into()));
        }
        if self.dao.is_followed(target, follower)? {
            return Ok(false);
        }
        self.dao.follow(target, follower)?;
        Ok(true)
    }

    /// `follower` stops following `target`. Returns false if there was no edge.
    pub fn unfollow(&self, target: &str, follower: &str) -> Result<bool, ServiceError> {
        if !self.dao.is_followed(target, follower)? {
            return Ok(false);
        }
        self.dao.stop_following(target, follower)?;
        Ok(true)
    }

    // ── Pages ──

    /// Profile of `username` at `page` (1-based; anything below 1 reads page 1),
    /// as seen by `viewer`.
    pub fn profile(
        &self,
        username: &str,
        page: i64,
        viewer: Option<&str>,
    ) -> Result<ProfileView, ServiceError> {
        let user = self.dao.find_user(username)?;
        let window = PageWindow::from_raw(page, self.config.profile_page_size);
        let posts = self.dao.user_timeline(username, window)?;

        let is_self = viewer == Some(username);
        // An unregistered viewer reads the page like an anonymous one.
        let followed = match viewer {
            Some(viewer) if !is_self => match self.dao.find_uid(viewer)? {
                Some(_) => Some(self.dao.is_followed(username, viewer)?),
                None => None,
            },
            _ => None,
        };

        Ok(ProfileView {
            nav: PageNav::from(&posts),
            user,
            posts: posts.items,
            is_self,
            followed,
        })
    }

    /// The global timeline at `page`, plus the newest users.
    pub fn timeline(&self, page: i64) -> Result<TimelineView, ServiceError> {
        let window = PageWindow::from_raw(page, self.config.timeline_page_size);
        let posts = self.dao.timeline(window)?;
        let recent_users = self.dao.recent_users(self.config.recent_users)?;

        Ok(TimelineView {
            nav: PageNav::from(&posts),
            posts: posts.items,
            recent_users,
        })
    }
}

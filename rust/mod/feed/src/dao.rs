//! SocialGraphDao: users, posts, follow edges and feeds on top of a KVStore.
//!
//! Writes allocate an id when one is needed, write the entity hash, then
//! prepend references into the feed lists. Reads resolve a username to its
//! id, cut a window out of a list and hydrate every id into a full record.
//!
//! Multi-step writes are not transactional. Registration claims the username
//! before writing anything else, and the list pushes of a post or a follow
//! edge go through [`KVStore::list_batch`], which is atomic on the bundled
//! backends and best effort elsewhere.

use std::sync::Arc;

use chirp_core::ServiceError;
use chirp_kv::KVStore;
use tracing::{debug, info, warn};

use crate::entity::{take_field, take_i64, EntityStore};
use crate::ids::IdAllocator;
use crate::keys::Key;
use crate::list::ListIndex;
use crate::model::{NewPost, Page, Post, User};
use crate::page::PageWindow;

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const UID: &str = "uid";
const CONTENT: &str = "content";
const PUBLISH_TIME: &str = "publishTime";

pub struct SocialGraphDao {
    kv: Arc<dyn KVStore>,
    entities: EntityStore,
    user_ids: IdAllocator,
    post_ids: IdAllocator,
}

impl SocialGraphDao {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            entities: EntityStore::new(kv.clone()),
            user_ids: IdAllocator::new(kv.clone(), Key::UserIdCounter),
            post_ids: IdAllocator::new(kv.clone(), Key::PostIdCounter),
            kv,
        }
    }

    fn list(&self, key: Key<'_>) -> ListIndex {
        ListIndex::new(self.kv.clone(), key)
    }

    // ── Users ──

    /// Register a new user and return the allocated id.
    ///
    /// The record is written under the fresh uid first, then the username is
    /// claimed with a set-if-absent on its index key. The claim is the commit
    /// point: a failure before it leaves the name free for a retry, and of
    /// two concurrent registrations of one name only one can claim it. The
    /// loser gets `Conflict`; its uid stays consumed and its record is
    /// unreachable.
    pub fn register(&self, username: &str, password_hash: &str) -> Result<i64, ServiceError> {
        let uid = self.user_ids.next_id()?;
        self.entities
            .put(Key::User(uid), &[(USERNAME, username), (PASSWORD, password_hash)])?;

        let claimed = self
            .kv
            .set_nx(&Key::UserIdByName(username).to_string(), &uid.to_string())?;
        if !claimed {
            warn!(username, uid, "username already taken, id left unused");
            return Err(ServiceError::Conflict(format!(
                "username '{}' already exists",
                username
            )));
        }
        self.list(Key::Users).prepend(username)?;

        info!(uid, username, "registered user");
        Ok(uid)
    }

    /// Whether `username` is registered.
    pub fn user_exists(&self, username: &str) -> Result<bool, ServiceError> {
        self.entities.exists(Key::UserIdByName(username))
    }

    /// Resolve a username to its id. None if not registered.
    pub fn find_uid(&self, username: &str) -> Result<Option<i64>, ServiceError> {
        let key = Key::UserIdByName(username);
        match self.kv.get(&key.to_string())? {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                ServiceError::Internal(format!("{key} holds a non-numeric id: {raw}"))
            }),
            None => Ok(None),
        }
    }

    fn require_uid(&self, username: &str) -> Result<i64, ServiceError> {
        self.find_uid(username)?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{}' not found", username)))
    }

    fn load_user(&self, uid: i64) -> Result<Option<User>, ServiceError> {
        let key = Key::User(uid);
        let Some(mut fields) = self.entities.get(key)? else {
            return Ok(None);
        };
        Ok(Some(User {
            id: uid,
            username: take_field(&mut fields, USERNAME, key)?,
            password_hash: take_field(&mut fields, PASSWORD, key)?,
            followers: self.list(Key::Followers(uid)).size()?,
            following: self.list(Key::Following(uid)).size()?,
        }))
    }

    /// Full user record with live follower/following counts.
    pub fn find_user(&self, username: &str) -> Result<User, ServiceError> {
        let uid = self.require_uid(username)?;
        self.load_user(uid)?.ok_or_else(|| {
            ServiceError::NotFound(format!("user '{}' has no record", username))
        })
    }

    /// Stored password hash of `username`.
    pub fn password_hash(&self, username: &str) -> Result<String, ServiceError> {
        Ok(self.find_user(username)?.password_hash)
    }

    /// The `count` most recently registered users, newest first.
    pub fn recent_users(&self, count: u64) -> Result<Vec<User>, ServiceError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let names = self.list(Key::Users).range(0, count - 1)?;
        let mut users = Vec::with_capacity(names.len());
        for name in names {
            match self.find_user(&name) {
                Ok(user) => users.push(user),
                Err(ServiceError::NotFound(msg)) => {
                    warn!(name = %name, "skipping registry entry: {}", msg)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    /// Number of registered users.
    pub fn user_count(&self) -> Result<u64, ServiceError> {
        self.list(Key::Users).size()
    }

    // ── Posts ──

    /// Store a post and put it at the head of the global and the author's
    /// timelines. `content` is stored as given; rendering happens upstream.
    pub fn save_post(&self, post: NewPost) -> Result<Post, ServiceError> {
        let pid = self.post_ids.next_id()?;
        let uid = post.uid.to_string();
        let published_at = post.published_at.to_string();
        self.entities.put(
            Key::Post(pid),
            &[
                (UID, uid.as_str()),
                (USERNAME, post.username.as_str()),
                (CONTENT, post.content.as_str()),
                (PUBLISH_TIME, published_at.as_str()),
            ],
        )?;

        let pid_str = pid.to_string();
        let global = self.list(Key::Posts);
        let own = self.list(Key::UserPosts(post.uid));
        self.kv
            .list_batch(&[global.push_write(&pid_str), own.push_write(&pid_str)])?;

        info!(pid, uid = post.uid, username = %post.username, "saved post");
        Ok(Post {
            id: pid,
            uid: post.uid,
            username: post.username,
            content: post.content,
            published_at: post.published_at,
        })
    }

    fn load_post(&self, pid: i64) -> Result<Option<Post>, ServiceError> {
        let key = Key::Post(pid);
        let Some(mut fields) = self.entities.get(key)? else {
            return Ok(None);
        };
        Ok(Some(Post {
            id: pid,
            uid: take_i64(&mut fields, UID, key)?,
            username: take_field(&mut fields, USERNAME, key)?,
            content: take_field(&mut fields, CONTENT, key)?,
            published_at: take_i64(&mut fields, PUBLISH_TIME, key)?,
        }))
    }

    /// A single post by id.
    pub fn find_post(&self, pid: i64) -> Result<Post, ServiceError> {
        self.load_post(pid)?
            .ok_or_else(|| ServiceError::NotFound(format!("post {} not found", pid)))
    }

    /// Number of posts on the global timeline.
    pub fn post_count(&self) -> Result<u64, ServiceError> {
        self.list(Key::Posts).size()
    }

    /// Number of posts written by `username`.
    pub fn user_post_count(&self, username: &str) -> Result<u64, ServiceError> {
        let uid = self.require_uid(username)?;
        self.list(Key::UserPosts(uid)).size()
    }

    /// One page of the global timeline, newest first.
    pub fn timeline(&self, window: PageWindow) -> Result<Page<Post>, ServiceError> {
        self.post_page(Key::Posts, window)
    }

    /// One page of `username`'s own posts, newest first.
    pub fn user_timeline(&self, username: &str, window: PageWindow) -> Result<Page<Post>, ServiceError> {
        let uid = self.require_uid(username)?;
        self.post_page(Key::UserPosts(uid), window)
    }

    fn post_page(&self, key: Key<'_>, window: PageWindow) -> Result<Page<Post>, ServiceError> {
        let list = self.list(key);
        let total = list.size()?;
        let window = window.clamp(total);
        let items = if window.is_empty() {
            Vec::new()
        } else {
            self.hydrate_posts(list.range(window.start(), window.end())?)?
        };
        debug!(%key, total, start = window.start(), end = window.end(), "read feed page");
        Ok(Page { items, total, window })
    }

    fn hydrate_posts(&self, ids: Vec<String>) -> Result<Vec<Post>, ServiceError> {
        let mut posts = Vec::with_capacity(ids.len());
        for raw in ids {
            let pid: i64 = raw
                .parse()
                .map_err(|_| ServiceError::Internal(format!("feed holds a non-numeric post id: {raw}")))?;
            match self.load_post(pid)? {
                Some(post) => posts.push(post),
                None => warn!(pid, "feed references a missing post"),
            }
        }
        Ok(posts)
    }

    // ── Follow graph ──
    //
    // Edge "follower follows username" lives in two lists:
    // followers(uid) holds fid and following(fid) holds uid.

    /// Record that `follower` follows `username`. Does not check for an
    /// existing edge; pushing twice stores the edge twice.
    pub fn follow(&self, username: &str, follower: &str) -> Result<(), ServiceError> {
        let uid = self.require_uid(username)?;
        let fid = self.require_uid(follower)?;
        let (uid_str, fid_str) = (uid.to_string(), fid.to_string());

        let followers = self.list(Key::Followers(uid));
        let following = self.list(Key::Following(fid));
        self.kv.list_batch(&[
            followers.push_write(&fid_str),
            following.push_write(&uid_str),
        ])?;

        info!(uid, fid, "{} now follows {}", follower, username);
        Ok(())
    }

    /// Remove one occurrence of the edge from both lists.
    pub fn stop_following(&self, username: &str, follower: &str) -> Result<(), ServiceError> {
        let uid = self.require_uid(username)?;
        let fid = self.require_uid(follower)?;
        let (uid_str, fid_str) = (uid.to_string(), fid.to_string());

        let followers = self.list(Key::Followers(uid));
        let following = self.list(Key::Following(fid));
        self.kv.list_batch(&[
            followers.remove_write(&fid_str),
            following.remove_write(&uid_str),
        ])?;

        info!(uid, fid, "{} stopped following {}", follower, username);
        Ok(())
    }

    /// Whether `follower` follows `username`.
    pub fn is_followed(&self, username: &str, follower: &str) -> Result<bool, ServiceError> {
        let uid = self.require_uid(username)?;
        let fid = self.require_uid(follower)?;
        self.list(Key::Following(fid)).contains(&uid.to_string())
    }

    /// Number of users following `username`.
    pub fn follower_count(&self, username: &str) -> Result<u64, ServiceError> {
        let uid = self.require_uid(username)?;
        self.list(Key::Followers(uid)).size()
    }

    /// Number of users `username` follows.
    pub fn following_count(&self, username: &str) -> Result<u64, ServiceError> {
        let uid = self.require_uid(username)?;
        self.list(Key::Following(uid)).size()
    }
}

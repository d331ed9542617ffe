//! Feed module: a social feed whose whole state lives in a key-value store.
//!
//! # Layers
//!
//! - **keys**: the store key of every entity kind
//! - **ids**: per-kind id counters on the store's atomic increment
//! - **entity**: hash records for users and posts
//! - **list**: newest-first lists: user registry, global timeline,
//!   per-user timelines, followers, following
//! - **page**: page-window arithmetic
//! - **dao**: [`SocialGraphDao`], registration, posting, following and feeds
//! - **service**: [`FeedService`], form checks, password hashing, content
//!   rendering and page views for front ends
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use chirp_feed::FeedService;
//!
//! let kv = Arc::new(chirp_kv::RedbStore::open(&path)?);
//! let feed = FeedService::new(kv, config.feed.clone());
//! feed.sign_up("alice", "secret.1", "secret.1")?;
//! feed.publish("alice", "hello @bob")?;
//! let page = feed.timeline(1)?;
//! ```

pub mod age;
pub mod content;
pub mod dao;
pub mod entity;
pub mod ids;
pub mod keys;
pub mod list;
pub mod model;
pub mod page;
pub mod password;
pub mod service;

pub use dao::SocialGraphDao;
pub use model::{NewPost, Page, Post, User};
pub use page::PageWindow;
pub use service::{FeedService, PageNav, ProfileView, TimelineView};

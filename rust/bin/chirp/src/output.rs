//! Plain-text and JSON rendering of command results.

use chirp_core::now_millis;
use chirp_feed::age::describe_age;
use chirp_feed::{PageNav, Post, User};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn user_line(user: &User) -> String {
    format!(
        "#{:<5} {:<16} followers: {:<5} following: {}",
        user.id, user.username, user.followers, user.following
    )
}

pub fn post_line(post: &Post, now_ms: i64) -> String {
    format!(
        "#{:<5} {}: {}  ({})",
        post.id,
        post.username,
        post.content,
        describe_age(post.published_at, now_ms)
    )
}

pub fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("(no posts)");
        return;
    }
    let now = now_millis();
    for post in posts {
        println!("{}", post_line(post, now));
    }
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("(no users)");
        return;
    }
    for user in users {
        println!("{}", user_line(user));
    }
}

pub fn nav_line(nav: &PageNav) -> String {
    let mut parts = vec![format!("page {}", nav.page)];
    if nav.has_prev {
        parts.push(format!("prev: {}", nav.prev));
    }
    if nav.has_more {
        parts.push(format!("next: {}", nav.next));
    }
    parts.join("  ")
}

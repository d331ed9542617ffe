//! `chirp timeline`, `chirp profile`, `chirp users`.

use anyhow::Result;
use chirp_feed::FeedService;

use crate::output::{nav_line, print_json, print_posts, print_users, user_line, Format};

pub fn timeline(feed: &FeedService, fmt: Format, page: i64) -> Result<()> {
    let view = feed.timeline(page)?;
    if fmt == Format::Json {
        return print_json(&view);
    }

    print_posts(&view.posts);
    println!("{}", nav_line(&view.nav));
    println!();
    println!("Newest users:");
    print_users(&view.recent_users);
    Ok(())
}

pub fn profile(
    feed: &FeedService,
    fmt: Format,
    username: &str,
    page: i64,
    viewer: Option<&str>,
) -> Result<()> {
    let view = feed.profile(username, page, viewer)?;
    if fmt == Format::Json {
        return print_json(&view);
    }

    println!("{}", user_line(&view.user));
    match view.followed {
        Some(true) => println!("(you follow {})", view.user.username),
        Some(false) => println!("(you do not follow {})", view.user.username),
        None => {}
    }
    println!();
    print_posts(&view.posts);
    println!("{}", nav_line(&view.nav));
    Ok(())
}

pub fn users(feed: &FeedService, fmt: Format, limit: u64) -> Result<()> {
    let users = feed.dao().recent_users(limit)?;
    if fmt == Format::Json {
        return print_json(&users);
    }
    print_users(&users);
    Ok(())
}

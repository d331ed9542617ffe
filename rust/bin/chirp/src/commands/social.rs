//! `chirp post`, `chirp follow`, `chirp unfollow`.

use anyhow::Result;
use chirp_core::now_millis;
use chirp_feed::FeedService;

use crate::output::{post_line, print_json, Format};

pub fn post(feed: &FeedService, fmt: Format, username: &str, content: &str) -> Result<()> {
    let post = feed.publish(username, content)?;
    match fmt {
        Format::Json => print_json(&post),
        Format::Table => {
            println!("{}", post_line(&post, now_millis()));
            Ok(())
        }
    }
}

pub fn follow(feed: &FeedService, target: &str, follower: &str) -> Result<()> {
    if feed.follow(target, follower)? {
        println!("{} now follows {}", follower, target);
    } else {
        println!("{} already follows {}", follower, target);
    }
    Ok(())
}

pub fn unfollow(feed: &FeedService, target: &str, follower: &str) -> Result<()> {
    if feed.unfollow(target, follower)? {
        println!("{} no longer follows {}", follower, target);
    } else {
        println!("{} was not following {}", follower, target);
    }
    Ok(())
}

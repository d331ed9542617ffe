//! Store key layout.
//!
//! Every key the feed layer touches is produced here. Ids are decimal digits
//! only, so `user:{uid}` can never end in `:uid` and never collides with the
//! username index `user:{name}:uid`; all other kinds carry their own literal
//! prefix or are fixed names.

use std::fmt;

/// A store key, by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// Counter that hands out user ids.
    UserIdCounter,
    /// Counter that hands out post ids.
    PostIdCounter,
    /// Hash record of one user.
    User(i64),
    /// String mapping a username to its user id.
    UserIdByName(&'a str),
    /// List of every username, newest first.
    Users,
    /// Hash record of one post.
    Post(i64),
    /// List of every post id, newest first.
    Posts,
    /// List of one user's post ids, newest first.
    UserPosts(i64),
    /// List of the ids following this user.
    Followers(i64),
    /// List of the ids this user follows.
    Following(i64),
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::UserIdCounter => f.write_str("global:uid"),
            Key::PostIdCounter => f.write_str("global:pid"),
            Key::User(uid) => write!(f, "user:{uid}"),
            Key::UserIdByName(name) => write!(f, "user:{name}:uid"),
            Key::Users => f.write_str("users"),
            Key::Post(pid) => write!(f, "pid:{pid}"),
            Key::Posts => f.write_str("posts"),
            Key::UserPosts(uid) => write!(f, "uid:{uid}:posts"),
            Key::Followers(uid) => write!(f, "followers:{uid}:uid"),
            Key::Following(uid) => write!(f, "following:{uid}:uid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn layout() {
        assert_eq!(Key::UserIdCounter.to_string(), "global:uid");
        assert_eq!(Key::PostIdCounter.to_string(), "global:pid");
        assert_eq!(Key::User(1).to_string(), "user:1");
        assert_eq!(Key::UserIdByName("tom").to_string(), "user:tom:uid");
        assert_eq!(Key::Users.to_string(), "users");
        assert_eq!(Key::Post(7).to_string(), "pid:7");
        assert_eq!(Key::Posts.to_string(), "posts");
        assert_eq!(Key::UserPosts(1).to_string(), "uid:1:posts");
        assert_eq!(Key::Followers(1).to_string(), "followers:1:uid");
        assert_eq!(Key::Following(1).to_string(), "following:1:uid");
    }

    #[test]
    fn kinds_do_not_collide() {
        // Usernames that look like ids or other keys still land in their own slot.
        let names = ["1", "users", "posts", "global", "1:posts", "x:uid"];
        let mut seen = HashSet::new();
        let mut keys = vec![
            Key::UserIdCounter,
            Key::PostIdCounter,
            Key::Users,
            Key::Posts,
        ];
        for id in 1..=3 {
            keys.extend([
                Key::User(id),
                Key::Post(id),
                Key::UserPosts(id),
                Key::Followers(id),
                Key::Following(id),
            ]);
        }
        keys.extend(names.iter().map(|n| Key::UserIdByName(n)));

        for key in &keys {
            assert!(seen.insert(key.to_string()), "duplicate key {key}");
        }
    }
}

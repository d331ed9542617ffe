use std::collections::BTreeMap;

use crate::error::KVError;

/// A single list mutation inside a [`KVStore::list_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListWrite<'a> {
    /// Insert `value` at the head of the list at `key`.
    Push { key: &'a str, value: &'a str },
    /// Remove the first occurrence of `value` from the list at `key`.
    Remove { key: &'a str, value: &'a str },
}

/// KVStore exposes the primitive structures the feed layer is built on:
/// plain strings, atomic counters, hashes and ordered lists.
///
/// Keys follow a namespaced convention (`user:1`, `uid:1:posts`,
/// `followers:1:uid`). A key is expected to hold one kind of value; callers
/// keep the namespaces apart.
///
/// Every method is a single round-trip to the backend. Each call is atomic on
/// its own; nothing spans two calls except [`KVStore::list_batch`] on
/// backends that override it.
pub trait KVStore: Send + Sync {
    /// Get a string value. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, KVError>;

    /// Set a string value only if the key holds none. Returns whether the
    /// value was written.
    fn set_nx(&self, key: &str, value: &str) -> Result<bool, KVError>;

    /// Atomically increment the integer at `key` and return the new value.
    /// An absent key counts as 0, so the first call returns 1. A counter at
    /// `i64::MAX` is left as is and reported as [`KVError::Overflow`].
    fn incr(&self, key: &str) -> Result<i64, KVError>;

    /// Upsert fields of the hash at `key`. Fields not named are left alone.
    fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), KVError>;

    /// Read every field of the hash at `key`. None if the hash does not exist.
    fn hgetall(&self, key: &str) -> Result<Option<BTreeMap<String, String>>, KVError>;

    /// Whether `key` holds a string, hash or non-empty list.
    fn exists(&self, key: &str) -> Result<bool, KVError>;

    /// Insert at the head of the list. Returns the new length.
    fn lpush(&self, key: &str, value: &str) -> Result<usize, KVError>;

    /// Read the inclusive, 0-based range `[start, end]`, head first.
    /// Indices past the tail are clipped; `start > end` yields nothing.
    fn lrange(&self, key: &str, start: usize, end: usize) -> Result<Vec<String>, KVError>;

    /// Length of the list, 0 if absent.
    fn llen(&self, key: &str) -> Result<usize, KVError>;

    /// Remove the first occurrence of `value`. Returns whether one was found.
    fn lrem(&self, key: &str, value: &str) -> Result<bool, KVError>;

    /// Apply several list writes in order.
    ///
    /// The default applies them one by one, so a failure part-way leaves the
    /// earlier writes in place. Backends with a native transaction override
    /// this to commit all of them or none.
    fn list_batch(&self, writes: &[ListWrite<'_>]) -> Result<(), KVError> {
        for write in writes {
            match *write {
                ListWrite::Push { key, value } => {
                    self.lpush(key, value)?;
                }
                ListWrite::Remove { key, value } => {
                    self.lrem(key, value)?;
                }
            }
        }
        Ok(())
    }
}

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::KVError;
use crate::traits::{KVStore, ListWrite};

#[derive(Default)]
struct Inner {
    strings: HashMap<String, String>,
    hashes: HashMap<String, BTreeMap<String, String>>,
    lists: HashMap<String, VecDeque<String>>,
}

impl Inner {
    fn push_front(&mut self, key: &str, value: &str) -> usize {
        let list = self.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        list.len()
    }

    fn remove_first(&mut self, key: &str, value: &str) -> bool {
        let Some(list) = self.lists.get_mut(key) else {
            return false;
        };
        let Some(pos) = list.iter().position(|v| v == value) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.lists.remove(key);
        }
        true
    }
}

/// MemoryStore keeps every structure in process memory behind a single lock.
///
/// Nothing is persisted. Each call takes the lock once, so every primitive,
/// and every `list_batch`, is atomic with respect to other callers.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, KVError> {
        self.inner
            .read()
            .map_err(|_| KVError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, KVError> {
        self.inner
            .write()
            .map_err(|_| KVError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, KVError> {
        Ok(self.read()?.strings.get(key).cloned())
    }

    fn set_nx(&self, key: &str, value: &str) -> Result<bool, KVError> {
        let mut inner = self.write()?;
        if inner.strings.contains_key(key) {
            return Ok(false);
        }
        inner.strings.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn incr(&self, key: &str) -> Result<i64, KVError> {
        let mut inner = self.write()?;
        let current = match inner.strings.get(key) {
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| KVError::NotAnInteger(key.to_string()))?,
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| KVError::Overflow(key.to_string()))?;
        inner.strings.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), KVError> {
        let mut inner = self.write()?;
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    fn hgetall(&self, key: &str) -> Result<Option<BTreeMap<String, String>>, KVError> {
        Ok(self
            .read()?
            .hashes
            .get(key)
            .filter(|h| !h.is_empty())
            .cloned())
    }

    fn exists(&self, key: &str) -> Result<bool, KVError> {
        let inner = self.read()?;
        Ok(inner.strings.contains_key(key)
            || inner.hashes.get(key).is_some_and(|h| !h.is_empty())
            || inner.lists.contains_key(key))
    }

    fn lpush(&self, key: &str, value: &str) -> Result<usize, KVError> {
        Ok(self.write()?.push_front(key, value))
    }

    fn lrange(&self, key: &str, start: usize, end: usize) -> Result<Vec<String>, KVError> {
        if start > end {
            return Ok(Vec::new());
        }
        let inner = self.read()?;
        Ok(inner
            .lists
            .get(key)
            .map(|list| {
                list.iter()
                    .skip(start)
                    .take((end - start).saturating_add(1))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn llen(&self, key: &str) -> Result<usize, KVError> {
        Ok(self.read()?.lists.get(key).map_or(0, VecDeque::len))
    }

    fn lrem(&self, key: &str, value: &str) -> Result<bool, KVError> {
        Ok(self.write()?.remove_first(key, value))
    }

    fn list_batch(&self, writes: &[ListWrite<'_>]) -> Result<(), KVError> {
        let mut inner = self.write()?;
        for write in writes {
            match *write {
                ListWrite::Push { key, value } => {
                    inner.push_front(key, value);
                }
                ListWrite::Remove { key, value } => {
                    inner.remove_first(key, value);
                }
            }
        }
        Ok(())
    }
}

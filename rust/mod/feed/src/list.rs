use std::sync::Arc;

use chirp_core::ServiceError;
use chirp_kv::{KVStore, ListWrite};

use crate::keys::Key;

/// One store-resident ordered list, newest element first.
///
/// Inserts only ever go to the head. Nothing is de-duplicated: a value pushed
/// twice is stored twice, so callers that need set semantics check first.
pub struct ListIndex {
    kv: Arc<dyn KVStore>,
    key: String,
}

impl ListIndex {
    pub fn new(kv: Arc<dyn KVStore>, key: Key<'_>) -> Self {
        Self {
            kv,
            key: key.to_string(),
        }
    }

    pub fn prepend(&self, value: &str) -> Result<(), ServiceError> {
        self.kv.lpush(&self.key, value)?;
        Ok(())
    }

    /// Inclusive, 0-based `[start, end]`. Returns fewer elements when `end`
    /// runs past the tail and nothing when `start > end`.
    pub fn range(&self, start: u64, end: u64) -> Result<Vec<String>, ServiceError> {
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        let end = usize::try_from(end).unwrap_or(usize::MAX);
        Ok(self.kv.lrange(&self.key, start, end)?)
    }

    pub fn size(&self) -> Result<u64, ServiceError> {
        Ok(self.kv.llen(&self.key)? as u64)
    }

    /// Remove the first occurrence of `value`. O(n).
    pub fn remove_first(&self, value: &str) -> Result<bool, ServiceError> {
        Ok(self.kv.lrem(&self.key, value)?)
    }

    /// Membership scan over the whole list. O(n).
    pub fn contains(&self, value: &str) -> Result<bool, ServiceError> {
        let len = self.kv.llen(&self.key)?;
        if len == 0 {
            return Ok(false);
        }
        Ok(self.kv.lrange(&self.key, 0, len - 1)?.iter().any(|v| v == value))
    }

    /// A head insert of `value`, for use in [`KVStore::list_batch`].
    pub fn push_write<'a>(&'a self, value: &'a str) -> ListWrite<'a> {
        ListWrite::Push { key: &self.key, value }
    }

    /// A first-match removal of `value`, for use in [`KVStore::list_batch`].
    pub fn remove_write<'a>(&'a self, value: &'a str) -> ListWrite<'a> {
        ListWrite::Remove { key: &self.key, value }
    }
}

#[cfg(test)]
mod tests {
    use chirp_kv::MemoryStore;

    use super::*;

    fn posts() -> ListIndex {
        ListIndex::new(Arc::new(MemoryStore::new()), Key::Posts)
    }

    #[test]
    fn prepend_keeps_newest_first() {
        let list = posts();
        for id in ["1", "2", "3"] {
            list.prepend(id).unwrap();
        }
        assert_eq!(list.size().unwrap(), 3);
        assert_eq!(list.range(0, 2).unwrap(), vec!["3", "2", "1"]);
        assert_eq!(list.range(1, 50).unwrap(), vec!["2", "1"]);
        assert!(list.range(2, 1).unwrap().is_empty());
    }

    #[test]
    fn duplicates_are_kept_and_removed_one_at_a_time() {
        let list = posts();
        list.prepend("7").unwrap();
        list.prepend("7").unwrap();
        assert!(list.contains("7").unwrap());
        assert!(list.remove_first("7").unwrap());
        assert!(list.contains("7").unwrap());
        assert!(list.remove_first("7").unwrap());
        assert!(!list.contains("7").unwrap());
        assert!(!list.remove_first("7").unwrap());
    }

    #[test]
    fn empty_list_reads() {
        let list = posts();
        assert_eq!(list.size().unwrap(), 0);
        assert!(list.range(0, 0).unwrap().is_empty());
        assert!(!list.contains("1").unwrap());
    }
}

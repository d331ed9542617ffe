use std::sync::Arc;

use chirp_core::ServiceError;
use chirp_kv::KVStore;

use crate::keys::Key;

/// Hands out ids for one entity kind from a counter kept in the store.
///
/// Ids start at 1, only grow, and are never handed out twice: the store's
/// `incr` is atomic and nothing ever decrements the counter. An id whose
/// record never got written stays consumed.
pub struct IdAllocator {
    kv: Arc<dyn KVStore>,
    key: String,
}

impl IdAllocator {
    pub fn new(kv: Arc<dyn KVStore>, counter: Key<'_>) -> Self {
        Self {
            kv,
            key: counter.to_string(),
        }
    }

    pub fn next_id(&self) -> Result<i64, ServiceError> {
        Ok(self.kv.incr(&self.key)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use chirp_kv::MemoryStore;

    use super::*;

    #[test]
    fn kinds_count_independently() {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let users = IdAllocator::new(kv.clone(), Key::UserIdCounter);
        let posts = IdAllocator::new(kv.clone(), Key::PostIdCounter);

        assert_eq!(users.next_id().unwrap(), 1);
        assert_eq!(users.next_id().unwrap(), 2);
        assert_eq!(posts.next_id().unwrap(), 1);
        assert_eq!(kv.get("global:uid").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn concurrent_callers_get_a_contiguous_range() {
        let tmp = tempfile::TempDir::new().unwrap();
        let kv: Arc<dyn KVStore> =
            Arc::new(chirp_kv::RedbStore::open(&tmp.path().join("ids.redb")).unwrap());
        let alloc = IdAllocator::new(kv, Key::PostIdCounter);

        let ids: Vec<i64> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..25).map(|_| alloc.next_id().unwrap()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let distinct: HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), 100);
        assert_eq!(*ids.iter().min().unwrap(), 1);
        assert_eq!(*ids.iter().max().unwrap(), 100);
    }
}

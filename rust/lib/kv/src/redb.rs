use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, Table, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::{KVStore, ListWrite};

const STRINGS: TableDefinition<&str, &str> = TableDefinition::new("strings");
const HASHES: TableDefinition<(&str, &str), &str> = TableDefinition::new("hashes");
/// list key -> (sequence number of the head slot, element count)
const LIST_META: TableDefinition<&str, (i64, u64)> = TableDefinition::new("list_meta");
/// (list key, sequence number) -> element; lower sequence numbers sit nearer the head
const LIST_ITEMS: TableDefinition<(&str, i64), &str> = TableDefinition::new("list_items");

type MetaTable<'txn> = Table<'txn, &'static str, (i64, u64)>;
type ItemTable<'txn> = Table<'txn, (&'static str, i64), &'static str>;

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database.
///
/// Lists are stored one element per row, keyed by a sequence number that
/// decreases with every push, so a prepend is a single insert and a range
/// read is an ordered scan. Every mutating call runs in its own write
/// transaction; redb serializes writers, which is what makes `incr` and
/// `set_nx` atomic.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(KVError::storage)?;

        // Ensure the tables exist by doing a write transaction.
        let write_txn = db.begin_write().map_err(KVError::storage)?;
        {
            write_txn.open_table(STRINGS).map_err(KVError::storage)?;
            write_txn.open_table(HASHES).map_err(KVError::storage)?;
            write_txn.open_table(LIST_META).map_err(KVError::storage)?;
            write_txn.open_table(LIST_ITEMS).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;

        debug!(path = %path.display(), "opened redb store");
        Ok(Self { db: Arc::new(db) })
    }
}

fn push_front(
    meta: &mut MetaTable<'_>,
    items: &mut ItemTable<'_>,
    key: &str,
    value: &str,
) -> Result<usize, KVError> {
    let (head, len) = meta
        .get(key)
        .map_err(KVError::storage)?
        .map(|guard| guard.value())
        .unwrap_or((0, 0));
    let head = head - 1;
    items.insert((key, head), value).map_err(KVError::storage)?;
    meta.insert(key, (head, len + 1)).map_err(KVError::storage)?;
    Ok((len + 1) as usize)
}

fn remove_first(
    meta: &mut MetaTable<'_>,
    items: &mut ItemTable<'_>,
    key: &str,
    value: &str,
) -> Result<bool, KVError> {
    let Some((head, len)) = meta
        .get(key)
        .map_err(KVError::storage)?
        .map(|guard| guard.value())
    else {
        return Ok(false);
    };

    let mut found = None;
    for entry in items
        .range((key, i64::MIN)..=(key, i64::MAX))
        .map_err(KVError::storage)?
    {
        let (slot, element) = entry.map_err(KVError::storage)?;
        if element.value() == value {
            found = Some(slot.value().1);
            break;
        }
    }
    let Some(seq) = found else {
        return Ok(false);
    };

    items.remove((key, seq)).map_err(KVError::storage)?;
    if len <= 1 {
        meta.remove(key).map_err(KVError::storage)?;
    } else {
        meta.insert(key, (head, len - 1)).map_err(KVError::storage)?;
    }
    Ok(true)
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(STRINGS).map_err(KVError::storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::storage(e)),
        }
    }

    fn set_nx(&self, key: &str, value: &str) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let written = {
            let mut table = write_txn.open_table(STRINGS).map_err(KVError::storage)?;
            if table.get(key).map_err(KVError::storage)?.is_some() {
                false
            } else {
                table.insert(key, value).map_err(KVError::storage)?;
                true
            }
        };
        if written {
            write_txn.commit().map_err(KVError::storage)?;
        } else {
            write_txn.abort().map_err(KVError::storage)?;
        }
        Ok(written)
    }

    fn incr(&self, key: &str) -> Result<i64, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let next = {
            let mut table = write_txn.open_table(STRINGS).map_err(KVError::storage)?;
            let current = match table.get(key).map_err(KVError::storage)? {
                Some(val) => val
                    .value()
                    .parse::<i64>()
                    .map_err(|_| KVError::NotAnInteger(key.to_string()))?,
                None => 0,
            };
            let next = current
                .checked_add(1)
                .ok_or_else(|| KVError::Overflow(key.to_string()))?;
            table
                .insert(key, next.to_string().as_str())
                .map_err(KVError::storage)?;
            next
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(next)
    }

    fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        {
            let mut table = write_txn.open_table(HASHES).map_err(KVError::storage)?;
            for (field, value) in fields {
                table.insert((key, *field), *value).map_err(KVError::storage)?;
            }
        }
        write_txn.commit().map_err(KVError::storage)?;
        Ok(())
    }

    fn hgetall(&self, key: &str) -> Result<Option<BTreeMap<String, String>>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(HASHES).map_err(KVError::storage)?;

        let mut fields = BTreeMap::new();
        for entry in table.range((key, "")..).map_err(KVError::storage)? {
            let (slot, value) = entry.map_err(KVError::storage)?;
            let (owner, field) = slot.value();
            if owner != key {
                break;
            }
            fields.insert(field.to_string(), value.value().to_string());
        }

        Ok(if fields.is_empty() { None } else { Some(fields) })
    }

    fn exists(&self, key: &str) -> Result<bool, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;

        let strings = read_txn.open_table(STRINGS).map_err(KVError::storage)?;
        if strings.get(key).map_err(KVError::storage)?.is_some() {
            return Ok(true);
        }

        let meta = read_txn.open_table(LIST_META).map_err(KVError::storage)?;
        if meta.get(key).map_err(KVError::storage)?.is_some() {
            return Ok(true);
        }

        let hashes = read_txn.open_table(HASHES).map_err(KVError::storage)?;
        let mut iter = hashes.range((key, "")..).map_err(KVError::storage)?;
        match iter.next() {
            Some(entry) => {
                let (slot, _) = entry.map_err(KVError::storage)?;
                Ok(slot.value().0 == key)
            }
            None => Ok(false),
        }
    }

    fn lpush(&self, key: &str, value: &str) -> Result<usize, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let len = {
            let mut meta = write_txn.open_table(LIST_META).map_err(KVError::storage)?;
            let mut items = write_txn.open_table(LIST_ITEMS).map_err(KVError::storage)?;
            push_front(&mut meta, &mut items, key, value)?
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(len)
    }

    fn lrange(&self, key: &str, start: usize, end: usize) -> Result<Vec<String>, KVError> {
        if start > end {
            return Ok(Vec::new());
        }
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(LIST_ITEMS).map_err(KVError::storage)?;

        let mut results = Vec::new();
        let iter = table
            .range((key, i64::MIN)..=(key, i64::MAX))
            .map_err(KVError::storage)?;
        for entry in iter.skip(start).take((end - start).saturating_add(1)) {
            let (_, value) = entry.map_err(KVError::storage)?;
            results.push(value.value().to_string());
        }

        Ok(results)
    }

    fn llen(&self, key: &str) -> Result<usize, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let meta = read_txn.open_table(LIST_META).map_err(KVError::storage)?;
        let len = meta
            .get(key)
            .map_err(KVError::storage)?
            .map(|guard| guard.value().1)
            .unwrap_or(0);
        Ok(len as usize)
    }

    fn lrem(&self, key: &str, value: &str) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let removed = {
            let mut meta = write_txn.open_table(LIST_META).map_err(KVError::storage)?;
            let mut items = write_txn.open_table(LIST_ITEMS).map_err(KVError::storage)?;
            remove_first(&mut meta, &mut items, key, value)?
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(removed)
    }

    /// All writes share one redb transaction: either every write lands or,
    /// if any step fails, the transaction is dropped uncommitted.
    fn list_batch(&self, writes: &[ListWrite<'_>]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        {
            let mut meta = write_txn.open_table(LIST_META).map_err(KVError::storage)?;
            let mut items = write_txn.open_table(LIST_ITEMS).map_err(KVError::storage)?;
            for write in writes {
                match *write {
                    ListWrite::Push { key, value } => {
                        push_front(&mut meta, &mut items, key, value)?;
                    }
                    ListWrite::Remove { key, value } => {
                        remove_first(&mut meta, &mut items, key, value)?;
                    }
                }
            }
        }
        write_txn.commit().map_err(KVError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RedbStore, tempfile::TempDir) {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = RedbStore::open(&tmp.path().join("test.redb")).unwrap();
        (store, tmp)
    }

    #[test]
    fn incr_starts_at_one_and_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            assert_eq!(store.incr("global:uid").unwrap(), 1);
            assert_eq!(store.incr("global:uid").unwrap(), 2);
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.incr("global:uid").unwrap(), 3);
    }

    #[test]
    fn incr_rejects_non_integer() {
        let (store, _tmp) = open_temp();
        store.set_nx("k", "abc").unwrap();
        assert!(matches!(store.incr("k"), Err(KVError::NotAnInteger(_))));
    }

    #[test]
    fn incr_at_max_fails_without_committing() {
        let (store, _tmp) = open_temp();
        let max = i64::MAX.to_string();
        store.set_nx("global:uid", &max).unwrap();
        assert!(matches!(store.incr("global:uid"), Err(KVError::Overflow(_))));
        assert_eq!(store.get("global:uid").unwrap(), Some(max));
    }

    #[test]
    fn set_nx_only_writes_once() {
        let (store, _tmp) = open_temp();
        assert!(store.set_nx("user:alice:uid", "1").unwrap());
        assert!(!store.set_nx("user:alice:uid", "2").unwrap());
        assert_eq!(store.get("user:alice:uid").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn hash_fields_are_isolated_per_key() {
        let (store, _tmp) = open_temp();
        store.hset("user:1", &[("username", "alice"), ("password", "x")]).unwrap();
        store.hset("user:10", &[("username", "bob")]).unwrap();
        store.hset("user:1", &[("password", "y")]).unwrap();

        let alice = store.hgetall("user:1").unwrap().unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice["username"], "alice");
        assert_eq!(alice["password"], "y");
        assert_eq!(store.hgetall("user:10").unwrap().unwrap().len(), 1);
        assert!(store.hgetall("user:2").unwrap().is_none());
    }

    #[test]
    fn list_prepends_and_ranges_newest_first() {
        let (store, _tmp) = open_temp();
        for v in ["1", "2", "3", "4"] {
            store.lpush("posts", v).unwrap();
        }
        assert_eq!(store.llen("posts").unwrap(), 4);
        assert_eq!(store.lrange("posts", 0, 1).unwrap(), vec!["4", "3"]);
        assert_eq!(store.lrange("posts", 2, 99).unwrap(), vec!["2", "1"]);
        assert!(store.lrange("posts", 3, 2).unwrap().is_empty());
        assert!(store.lrange("missing", 0, 0).unwrap().is_empty());
    }

    #[test]
    fn lrem_removes_first_match_only() {
        let (store, _tmp) = open_temp();
        for v in ["a", "b", "a"] {
            store.lpush("l", v).unwrap();
        }
        assert!(store.lrem("l", "a").unwrap());
        assert_eq!(store.lrange("l", 0, 10).unwrap(), vec!["b", "a"]);
        assert!(!store.lrem("l", "z").unwrap());
        assert!(store.lrem("l", "b").unwrap());
        assert!(store.lrem("l", "a").unwrap());
        assert_eq!(store.llen("l").unwrap(), 0);
        assert!(!store.exists("l").unwrap());
        store.lpush("l", "c").unwrap();
        assert_eq!(store.lrange("l", 0, 0).unwrap(), vec!["c"]);
    }

    #[test]
    fn exists_covers_every_kind() {
        let (store, _tmp) = open_temp();
        store.set_nx("s", "1").unwrap();
        store.hset("h", &[("f", "v")]).unwrap();
        store.lpush("l", "v").unwrap();
        assert!(store.exists("s").unwrap());
        assert!(store.exists("h").unwrap());
        assert!(store.exists("l").unwrap());
        assert!(!store.exists("nope").unwrap());
        assert!(!store.exists("g").unwrap());
    }

    #[test]
    fn list_batch_applies_in_order() {
        let (store, _tmp) = open_temp();
        store
            .list_batch(&[
                ListWrite::Push { key: "followers:1:uid", value: "2" },
                ListWrite::Push { key: "following:2:uid", value: "1" },
            ])
            .unwrap();
        assert_eq!(store.lrange("followers:1:uid", 0, 0).unwrap(), vec!["2"]);
        assert_eq!(store.lrange("following:2:uid", 0, 0).unwrap(), vec!["1"]);

        store
            .list_batch(&[
                ListWrite::Remove { key: "followers:1:uid", value: "2" },
                ListWrite::Remove { key: "following:2:uid", value: "1" },
            ])
            .unwrap();
        assert_eq!(store.llen("followers:1:uid").unwrap(), 0);
        assert_eq!(store.llen("following:2:uid").unwrap(), 0);
    }
}

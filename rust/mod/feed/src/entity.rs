use std::collections::BTreeMap;
use std::sync::Arc;

use chirp_core::ServiceError;
use chirp_kv::KVStore;

use crate::keys::Key;

/// Field map of one stored record.
pub type Fields = BTreeMap<String, String>;

/// Hash-record access for single entities (users, posts).
#[derive(Clone)]
pub struct EntityStore {
    kv: Arc<dyn KVStore>,
}

impl EntityStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    /// Upsert the given fields; fields not named keep their stored value.
    pub fn put(&self, key: Key<'_>, fields: &[(&str, &str)]) -> Result<(), ServiceError> {
        Ok(self.kv.hset(&key.to_string(), fields)?)
    }

    /// All fields of the record, or None if nothing is stored under `key`.
    pub fn get(&self, key: Key<'_>) -> Result<Option<Fields>, ServiceError> {
        Ok(self.kv.hgetall(&key.to_string())?)
    }

    pub fn exists(&self, key: Key<'_>) -> Result<bool, ServiceError> {
        Ok(self.kv.exists(&key.to_string())?)
    }
}

/// Take a required string field out of a record.
pub(crate) fn take_field(fields: &mut Fields, name: &str, key: Key<'_>) -> Result<String, ServiceError> {
    fields
        .remove(name)
        .ok_or_else(|| ServiceError::Internal(format!("record {key} has no '{name}' field")))
}

/// Take a required integer field out of a record.
pub(crate) fn take_i64(fields: &mut Fields, name: &str, key: Key<'_>) -> Result<i64, ServiceError> {
    let raw = take_field(fields, name, key)?;
    raw.parse()
        .map_err(|_| ServiceError::Internal(format!("record {key} field '{name}' is not an integer: {raw}")))
}

#[cfg(test)]
mod tests {
    use chirp_kv::MemoryStore;

    use super::*;

    #[test]
    fn put_merges_fields() {
        let store = EntityStore::new(Arc::new(MemoryStore::new()));
        assert!(!store.exists(Key::Post(1)).unwrap());
        assert!(store.get(Key::Post(1)).unwrap().is_none());

        store.put(Key::Post(1), &[("uid", "3"), ("content", "hi")]).unwrap();
        store.put(Key::Post(1), &[("publishTime", "10")]).unwrap();

        let fields = store.get(Key::Post(1)).unwrap().unwrap();
        assert_eq!(fields.len(), 3);
        assert!(store.exists(Key::Post(1)).unwrap());
    }

    #[test]
    fn field_helpers_report_corrupt_records() {
        let mut fields = Fields::new();
        fields.insert("uid".into(), "x".into());
        assert!(matches!(
            take_i64(&mut fields, "uid", Key::Post(1)),
            Err(ServiceError::Internal(_))
        ));
        assert!(matches!(
            take_field(&mut fields, "content", Key::Post(1)),
            Err(ServiceError::Internal(_))
        ));
    }
}

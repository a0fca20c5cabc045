use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{Record, RecordStore, StoreError};

/// Process-local store. Collections are kept as JSON documents keyed by
/// collection name, the same shape the file backend writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Value>>,
}

impl RecordStore for MemoryStore {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let guard = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))?;

        match guard.get(R::COLLECTION) {
            Some(document) => {
                serde_json::from_value(document.clone()).map_err(|source| StoreError::Codec {
                    collection: R::COLLECTION,
                    source,
                })
            }
            None => Ok(Vec::new()),
        }
    }

    fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        let document = serde_json::to_value(records).map_err(|source| StoreError::Codec {
            collection: R::COLLECTION,
            source,
        })?;

        let mut guard = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))?;
        guard.insert(R::COLLECTION, document);
        Ok(())
    }
}

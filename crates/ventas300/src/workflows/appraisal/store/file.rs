use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Record, RecordStore, StoreError};

/// Directory-backed store writing one pretty-printed JSON array per
/// collection (`<dir>/ventas300_solicitudes.json`, ...). A missing file reads
/// as an empty collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            collection: "data directory",
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for<R: Record>(&self) -> PathBuf {
        self.root.join(format!("{}.json", R::COLLECTION))
    }
}

impl RecordStore for JsonFileStore {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let raw = match fs::read_to_string(self.path_for::<R>()) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    collection: R::COLLECTION,
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Codec {
            collection: R::COLLECTION,
            source,
        })
    }

    fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        let document = serde_json::to_string_pretty(records).map_err(|source| StoreError::Codec {
            collection: R::COLLECTION,
            source,
        })?;

        // Readers only ever see a complete collection file.
        let path = self.path_for::<R>();
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, document)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|source| StoreError::Io {
                collection: R::COLLECTION,
                source,
            })
    }
}

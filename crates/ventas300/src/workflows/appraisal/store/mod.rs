//! Record store over the six flat collections.
//!
//! Backends only load and save whole collections; the per-record operations
//! are layered on top so every backend behaves the same way.

mod file;
mod memory;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::domain::{
    Appraisal, AppraisalId, AppraisalRequest, Appraiser, AppraiserId, Owner, OwnerId, Property,
    PropertyId, RequestId, User, UserId,
};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A record kept in its own named collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    type Id: PartialEq + Clone + fmt::Display;

    /// Stable key of the collection, shared by every backend.
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;
}

macro_rules! impl_record {
    ($record:ty, $id:ty, $collection:literal) => {
        impl Record for $record {
            type Id = $id;
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

impl_record!(Owner, OwnerId, "ventas300_propietarios");
impl_record!(Property, PropertyId, "ventas300_propiedades");
impl_record!(Appraiser, AppraiserId, "ventas300_peritos");
impl_record!(AppraisalRequest, RequestId, "ventas300_solicitudes");
impl_record!(Appraisal, AppraisalId, "ventas300_evaluaciones");
impl_record!(User, UserId, "ventas300_usuarios");

/// Storage abstraction so the service can run against memory or disk.
pub trait RecordStore: Send + Sync {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError>;
    fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError>;

    fn all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.load()
    }

    fn fetch<R: Record>(&self, id: &R::Id) -> Result<Option<R>, StoreError> {
        Ok(self
            .load::<R>()?
            .into_iter()
            .find(|record| record.id() == id))
    }

    fn insert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        let mut records = self.load::<R>()?;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(StoreError::Conflict {
                collection: R::COLLECTION,
                id: record.id().to_string(),
            });
        }
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }

    fn update<R: Record>(&self, record: R) -> Result<(), StoreError> {
        let mut records = self.load::<R>()?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| StoreError::NotFound {
                collection: R::COLLECTION,
                id: record.id().to_string(),
            })?;
        *slot = record;
        self.save(&records)
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection}: record {id} already exists")]
    Conflict {
        collection: &'static str,
        id: String,
    },
    #[error("{collection}: record {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{collection}: io error")]
    Io {
        collection: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{collection}: malformed collection document")]
    Codec {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use ventas300::config::StorageConfig;
use ventas300::workflows::appraisal::{
    AppraisalService, JsonFileStore, MemoryStore, Record, RecordStore, ServiceError, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backend chosen at startup from `APP_DATA_DIR`.
#[derive(Debug)]
pub(crate) enum Storage {
    Memory(MemoryStore),
    Files(JsonFileStore),
}

impl Storage {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        match &config.data_dir {
            Some(dir) => {
                let store = JsonFileStore::open(dir)?;
                info!(data_dir = %store.root().display(), "using json file store");
                Ok(Self::Files(store))
            }
            None => {
                info!("using in-memory store; records are lost on exit");
                Ok(Self::Memory(MemoryStore::default()))
            }
        }
    }
}

impl RecordStore for Storage {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::Files(store) => store.load(),
        }
    }

    fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save(records),
            Self::Files(store) => store.save(records),
        }
    }
}

/// Open the configured store, seeding the sample data when asked to.
pub(crate) fn build_service(
    config: &StorageConfig,
) -> Result<AppraisalService<Storage>, ServiceError> {
    let storage = Storage::open(config)?;
    let service = AppraisalService::new(Arc::new(storage), config.commission_policy());
    if config.seed_demo {
        service.load_demo_data()?;
    }
    Ok(service)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::appraisal::domain::{
    AppraisalSubmission, AppraiserRegistration, OwnerId, OwnerRegistration, PropertyKind,
    PropertyRegistration,
};
use crate::workflows::appraisal::router::USER_HEADER;
use crate::workflows::appraisal::store::{MemoryStore, Record, RecordStore, StoreError};
use crate::workflows::appraisal::{appraisal_router, AppraisalService, CommissionPolicy};

pub(super) const ADMIN: &str = "1";
pub(super) const COORDINATOR: &str = "2";
pub(super) const APPRAISER: &str = "3";
pub(super) const FINANCE: &str = "4";

pub(super) fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn build_service() -> (AppraisalService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = AppraisalService::new(store.clone(), CommissionPolicy::default());
    (service, store)
}

pub(super) fn seeded_service() -> AppraisalService<MemoryStore> {
    let (service, _) = build_service();
    service.load_demo_data().expect("demo data loads");
    service
}

pub(super) fn owner_registration() -> OwnerRegistration {
    OwnerRegistration {
        name: "Carlos Mendoza".to_string(),
        phone: "555-0123".to_string(),
        email: "carlos.mendoza@email.com".to_string(),
    }
}

pub(super) fn house_registration(owner_id: &OwnerId) -> PropertyRegistration {
    PropertyRegistration {
        owner_id: owner_id.clone(),
        address: "Av. Libertad 123, Col. Centro".to_string(),
        kind: PropertyKind::House,
        features: "3 habitaciones, 2 baños".to_string(),
    }
}

pub(super) fn appraiser_registration(name: &str, percentage: Option<f64>) -> AppraiserRegistration {
    AppraiserRegistration {
        name: name.to_string(),
        phone: "555-1001".to_string(),
        email: format!("{}@ventas300.com", name.to_lowercase().replace(' ', ".")),
        specialty: "Residencial".to_string(),
        available: true,
        commission_percentage: percentage,
    }
}

pub(super) fn submission(value: &str) -> AppraisalSubmission {
    AppraisalSubmission {
        observations: "Casa bien conservada".to_string(),
        appraised_value: value.to_string(),
        photos: vec!["foto1.jpg".to_string(), "  ".to_string()],
    }
}

pub(super) fn router_with_service(service: AppraisalService<MemoryStore>) -> axum::Router {
    appraisal_router(Arc::new(service))
}

pub(super) fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(super) fn post_json(uri: &str, user: Option<&str>, payload: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder
        .body(Body::from(serde_json::to_vec(payload).expect("payload serializes")))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Store whose backing medium is gone.
pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save<R: Record>(&self, _records: &[R]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

/// Memory store that refuses writes to one collection on demand.
#[derive(Default)]
pub(super) struct FlakyStore {
    inner: MemoryStore,
    refused: Mutex<Option<&'static str>>,
}

impl FlakyStore {
    pub(super) fn refuse_writes_to(&self, collection: Option<&'static str>) {
        *self.refused.lock().expect("refusal lock") = collection;
    }
}

impl RecordStore for FlakyStore {
    fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.inner.load()
    }

    fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        if *self.refused.lock().expect("refusal lock") == Some(R::COLLECTION) {
            return Err(StoreError::Unavailable(format!("{} write refused", R::COLLECTION)));
        }
        self.inner.save(records)
    }
}

pub(super) fn flaky_seeded_service() -> (AppraisalService<FlakyStore>, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::default());
    let service = AppraisalService::new(store.clone(), CommissionPolicy::default());
    service.load_demo_data().expect("demo data loads");
    (service, store)
}

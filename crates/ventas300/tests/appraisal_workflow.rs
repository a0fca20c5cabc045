//! End-to-end brokerage scenarios driven through the public service facade,
//! the HTTP router and the on-disk store.

mod common {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use chrono::NaiveDate;

    use ventas300::workflows::appraisal::{
        AppraisalService, AppraisalSubmission, AppraiserRegistration, CommissionPolicy,
        JsonFileStore, OwnerId, OwnerRegistration, PropertyKind, PropertyRegistration,
    };

    pub(super) fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
    }

    pub(super) fn temp_dir(prefix: &str) -> PathBuf {
        let base = std::env::temp_dir();
        let pid = std::process::id();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = base.join(format!("{prefix}_{pid}_{nonce}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    pub(super) fn file_service(dir: &Path) -> AppraisalService<JsonFileStore> {
        let store = JsonFileStore::open(dir).expect("store opens");
        AppraisalService::new(Arc::new(store), CommissionPolicy::default())
    }

    pub(super) fn owner() -> OwnerRegistration {
        OwnerRegistration {
            name: "Carlos Mendoza".to_string(),
            phone: "555-0123".to_string(),
            email: "carlos.mendoza@email.com".to_string(),
        }
    }

    pub(super) fn house(owner_id: &OwnerId) -> PropertyRegistration {
        PropertyRegistration {
            owner_id: owner_id.clone(),
            address: "Av. Libertad 123, Col. Centro".to_string(),
            kind: PropertyKind::House,
            features: "3 habitaciones, 2 baños, piscina".to_string(),
        }
    }

    pub(super) fn ana_torres() -> AppraiserRegistration {
        AppraiserRegistration {
            name: "Ana Torres".to_string(),
            phone: "555-1001".to_string(),
            email: "ana.torres@ventas300.com".to_string(),
            specialty: "Residencial".to_string(),
            available: true,
            commission_percentage: Some(10.0),
        }
    }

    pub(super) fn valuation(value: &str) -> AppraisalSubmission {
        AppraisalSubmission {
            observations: "Casa bien conservada, cocina remodelada".to_string(),
            appraised_value: value.to_string(),
            photos: vec!["foto1.jpg".to_string()],
        }
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::*;
use ventas300::workflows::appraisal::{
    appraisal_router, write_commission_csv, AppraisalRequest, AppraisalService, CommissionPolicy,
    MemoryStore, RecordStore, RequestStatus, ServiceError, USER_HEADER,
};

#[test]
fn lifecycle_survives_reopening_the_data_directory() {
    let dir = temp_dir("ventas300_lifecycle");

    let (request_id, appraiser_id) = {
        let service = file_service(&dir);
        let owner = service.register_owner(owner(), day(1, 15)).expect("owner");
        let property = service
            .register_property(house(&owner.id), day(1, 15))
            .expect("property");
        let request = service
            .create_request(&owner.id, &property.id, day(1, 15))
            .expect("request");
        let appraiser = service.register_appraiser(ana_torres()).expect("appraiser");
        service
            .assign_appraiser(&request.id, &appraiser.id, day(1, 16))
            .expect("assign");
        (request.id, appraiser.id)
    };

    let service = file_service(&dir);
    let detail = service.request_detail(&request_id).expect("detail after reopen");
    assert_eq!(detail.status, RequestStatus::Assigned);
    assert_eq!(detail.request.stage.appraiser_id(), Some(&appraiser_id));

    let appraisal = service
        .record_appraisal(&request_id, valuation("150,000"), day(1, 18))
        .expect("appraisal");
    assert_eq!(appraisal.commission, 15_000.0);

    let stats = service.dashboard().expect("dashboard");
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.evaluated_requests, 1);
    assert_eq!(stats.total_commissions, 15_000.0);
    assert_eq!(stats.total_appraised_value, 150_000.0);

    assert!(dir.join("ventas300_solicitudes.json").exists());
    assert!(dir.join("ventas300_evaluaciones.json").exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn stored_requests_use_flat_status_documents() {
    let dir = temp_dir("ventas300_documents");
    let service = file_service(&dir);
    service.load_demo_data().expect("seed");

    let raw = std::fs::read_to_string(dir.join("ventas300_solicitudes.json")).expect("read");
    let documents: Value = serde_json::from_str(&raw).expect("json array");
    let pending = documents
        .as_array()
        .and_then(|docs| docs.iter().find(|doc| doc["status"] == "pending"))
        .expect("pending request present");
    assert!(pending.get("appraiser_id").is_none());
    assert_eq!(pending["number"], "SOL-2025-01-003");

    let reloaded: Vec<AppraisalRequest> = service.store().all().expect("reload");
    assert_eq!(reloaded.len(), 3);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn out_of_order_operations_leave_state_untouched() {
    let service = AppraisalService::new(Arc::new(MemoryStore::default()), CommissionPolicy::default());
    let owner = service.register_owner(owner(), day(3, 1)).expect("owner");
    let property = service
        .register_property(house(&owner.id), day(3, 1))
        .expect("property");
    let request = service
        .create_request(&owner.id, &property.id, day(3, 2))
        .expect("request");

    let err = service
        .record_appraisal(&request.id, valuation("1000"), day(3, 3))
        .expect_err("pending request cannot be appraised");
    assert!(matches!(err, ServiceError::Transition(_)));
    assert!(service.appraisals().expect("appraisals").is_empty());
    assert_eq!(
        service.requests(Some(RequestStatus::Pending)).expect("pending").len(),
        1
    );
}

#[tokio::test]
async fn router_serves_the_seeded_dashboard_and_report() {
    let service = AppraisalService::new(Arc::new(MemoryStore::default()), CommissionPolicy::default());
    service.load_demo_data().expect("seed");
    let service = Arc::new(service);
    let router = appraisal_router(service.clone());

    let response = router
        .oneshot(
            Request::get("/api/v1/dashboard")
                .header(USER_HEADER, "1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["total_requests"], 3);
    assert_eq!(payload["assigned_requests"], 1);

    let rows = service.commission_report().expect("rows");
    let mut csv = Vec::new();
    write_commission_csv(&rows, &mut csv).expect("csv");
    let csv = String::from_utf8(csv).expect("utf-8");
    assert_eq!(csv.lines().count(), 2);
}

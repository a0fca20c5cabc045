use super::common::*;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::appraisal::router::{dashboard_handler, error_response, USER_HEADER};
use crate::workflows::appraisal::{AppraisalService, RequestId, ServiceError, StoreError};

#[tokio::test]
async fn dashboard_handler_reports_seeded_totals() {
    let service = Arc::new(seeded_service());
    let mut headers = HeaderMap::new();
    headers.insert(USER_HEADER, HeaderValue::from_static(FINANCE));

    let response = dashboard_handler(State(service), headers).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_requests"], json!(3));
    assert_eq!(payload["pending_requests"], json!(1));
    assert_eq!(payload["total_commissions"], json!(15000.0));
    assert_eq!(payload["status_counts"][2]["status"], json!("evaluated"));
}

#[tokio::test]
async fn dashboard_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(AppraisalService::new(
        Arc::new(UnavailableStore),
        Default::default(),
    ));
    let mut headers = HeaderMap::new();
    headers.insert(USER_HEADER, HeaderValue::from_static(ADMIN));

    let response = dashboard_handler(State(service), headers).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let router = router_with_service(seeded_service());

    let response = router
        .oneshot(get("/api/v1/dashboard", None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn finance_cannot_assign_appraisers() {
    let router = router_with_service(seeded_service());

    let response = router
        .oneshot(post_json(
            "/api/v1/requests/3/assignment",
            Some(FINANCE),
            &json!({ "appraiser_id": "1" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assignment_route_moves_request_forward() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/requests/3/assignment",
            Some(COORDINATOR),
            &json!({ "appraiser_id": "1" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("assigned"));
    assert_eq!(payload["appraiser_id"], json!("1"));

    let response = router
        .oneshot(post_json(
            "/api/v1/requests/3/assignment",
            Some(COORDINATOR),
            &json!({ "appraiser_id": "2" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["current_status"], json!("assigned"));
}

#[tokio::test]
async fn appraisal_route_validates_amount() {
    let router = router_with_service(seeded_service());

    let response = router
        .oneshot(post_json(
            "/api/v1/requests/2/appraisal",
            Some(ADMIN),
            &json!({ "observations": "Local comercial", "appraised_value": "mucho" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("mucho"));
}

#[tokio::test]
async fn appraisal_route_records_numeric_values() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/requests/2/appraisal",
            Some(ADMIN),
            &json!({ "observations": "Local comercial", "appraised_value": 200000 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["commission"], json!(24000.0));

    let response = router
        .oneshot(get("/api/v1/requests/2", Some(ADMIN)))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("evaluated"));
    assert_eq!(payload["appraisal"]["appraised_value"], json!(200000.0));
}

#[tokio::test]
async fn appraiser_session_is_limited_to_own_requests() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/requests/2/appraisal",
            Some(APPRAISER),
            &json!({ "appraised_value": "100" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(get("/api/v1/requests", Some(APPRAISER)))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    let numbers: Vec<&str> = payload
        .as_array()
        .map(|requests| {
            requests
                .iter()
                .filter_map(|request| request["number"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(numbers, vec!["SOL-2025-01-001"]);
}

#[tokio::test]
async fn appraiser_session_cannot_read_other_appraisers_work() {
    let router = router_with_service(seeded_service());

    for uri in ["/api/v1/appraisers/2/queue", "/api/v1/requests/2"] {
        let response = router
            .clone()
            .oneshot(get(uri, Some(APPRAISER)))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let response = router
        .clone()
        .oneshot(get("/api/v1/appraisers/1/queue", Some(APPRAISER)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let queue = read_json_body(response).await;
    assert_eq!(queue.as_array().map(Vec::len), Some(1));

    let response = router
        .clone()
        .oneshot(get("/api/v1/requests/1", Some(APPRAISER)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn appraiser_session_lists_only_own_appraisals() {
    let service = seeded_service();
    service
        .record_appraisal(&RequestId::from("2"), submission("98500"), day(1, 21))
        .expect("pedro records");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/appraisals", Some(APPRAISER)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let appraisers: Vec<&str> = payload
        .as_array()
        .map(|appraisals| {
            appraisals
                .iter()
                .filter_map(|appraisal| appraisal["appraiser_id"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(appraisers, vec!["1"]);

    let response = router
        .oneshot(get("/api/v1/appraisals", Some(ADMIN)))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unknown_status_filter_is_unprocessable() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(get("/api/v1/requests?status=archived", Some(ADMIN)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(get("/api/v1/requests?status=pendiente", Some(ADMIN)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn missing_request_is_not_found() {
    let router = router_with_service(seeded_service());

    let response = router
        .oneshot(get("/api/v1/requests/nope", Some(ADMIN)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_lists_sections_for_role() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(get("/api/v1/session", Some(COORDINATOR)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["role_label"], json!("Coordinator"));
    assert_eq!(
        payload["sections"].as_array().map(Vec::len),
        Some(4),
        "coordinator menu: {payload}"
    );

    let response = router
        .oneshot(get("/api/v1/session", Some("unknown")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_registration_route_creates_records() {
    let router = router_with_service(seeded_service());

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/owners",
            Some(COORDINATOR),
            &json!({ "name": "Elena Ruiz", "email": "elena@email.com" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let owner = read_json_body(response).await;
    let owner_id = owner["id"].as_str().unwrap_or_default().to_string();
    assert!(owner_id.starts_with("own-"));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/properties",
            Some(COORDINATOR),
            &json!({ "owner_id": owner_id, "address": "Calle 8", "kind": "warehouse" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(get(
            &format!("/api/v1/properties?owner_id={owner_id}"),
            Some(COORDINATOR),
        ))
        .await
        .expect("route executes");
    let payload: Value = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["kind"], json!("warehouse"));
}

#[tokio::test]
async fn commission_csv_is_served_to_finance() {
    let router = router_with_service(seeded_service());

    let response = router
        .oneshot(get("/api/v1/reports/commissions.csv", Some(FINANCE)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = read_text_body(response).await;
    assert!(body.starts_with("request_number,appraiser"));
    assert!(body.contains("SOL-2025-01-001,Ana Torres,2025-01-18,150000.0,10.0,15000.0"));
}

#[tokio::test]
async fn store_conflicts_map_to_conflict_and_outages_to_server_error() {
    let conflict = error_response(ServiceError::Store(StoreError::Conflict {
        collection: "ventas300_evaluaciones",
        id: "1".to_string(),
    }));
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
    let payload = read_json_body(conflict).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("already exists")));

    let outage = error_response(ServiceError::Store(StoreError::Unavailable(
        "disk offline".to_string(),
    )));
    assert_eq!(outage.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

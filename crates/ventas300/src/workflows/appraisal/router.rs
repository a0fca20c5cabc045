use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::Capability;
use super::dashboard::{DashboardStats, StatusCountEntry};
use super::domain::{
    AppraisalSubmission, AppraiserId, AppraiserRegistration, OwnerId, OwnerRegistration,
    PropertyId, PropertyRegistration, RequestId, User, UserId,
};
use super::export::write_commission_csv;
use super::lifecycle::RequestStatus;
use super::service::{AppraisalService, ServiceError};
use super::store::{RecordStore, StoreError};

/// Header carrying the id of the logged-in user.
pub const USER_HEADER: &str = "x-user-id";

type SharedService<S> = State<Arc<AppraisalService<S>>>;

/// Router builder exposing the brokerage records and the request lifecycle.
pub fn appraisal_router<S>(service: Arc<AppraisalService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/session", get(session_handler::<S>))
        .route("/api/v1/users", get(users_handler::<S>))
        .route(
            "/api/v1/owners",
            get(list_owners_handler::<S>).post(register_owner_handler::<S>),
        )
        .route(
            "/api/v1/properties",
            get(list_properties_handler::<S>).post(register_property_handler::<S>),
        )
        .route(
            "/api/v1/appraisers",
            get(list_appraisers_handler::<S>).post(register_appraiser_handler::<S>),
        )
        .route(
            "/api/v1/appraisers/:appraiser_id/queue",
            get(appraiser_queue_handler::<S>),
        )
        .route(
            "/api/v1/requests",
            get(list_requests_handler::<S>).post(create_request_handler::<S>),
        )
        .route(
            "/api/v1/requests/:request_id",
            get(request_detail_handler::<S>),
        )
        .route(
            "/api/v1/requests/:request_id/assignment",
            post(assign_handler::<S>),
        )
        .route(
            "/api/v1/requests/:request_id/appraisal",
            post(record_appraisal_handler::<S>),
        )
        .route("/api/v1/appraisals", get(list_appraisals_handler::<S>))
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .route(
            "/api/v1/reports/commissions",
            get(commission_report_handler::<S>),
        )
        .route(
            "/api/v1/reports/commissions.csv",
            get(commission_csv_handler::<S>),
        )
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn caller_id(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(UserId::from)
}

fn authorize<S>(
    service: &AppraisalService<S>,
    headers: &HeaderMap,
    capability: Capability,
) -> Result<User, ServiceError>
where
    S: RecordStore + 'static,
{
    service.authorize(caller_id(headers).as_ref(), capability)
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Transition(_) => StatusCode::CONFLICT,
        ServiceError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
    };

    let mut payload = json!({ "error": error.to_string() });
    if let ServiceError::Transition(transition) = &error {
        payload["current_status"] = json!(transition.current.label());
    }
    (status, Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = caller_id(&headers)
        .ok_or(ServiceError::Unauthenticated)
        .and_then(|user_id| match service.session(&user_id) {
            Err(ServiceError::NotFound { .. }) => Err(ServiceError::Unauthenticated),
            other => other,
        });
    respond(StatusCode::OK, result)
}

/// Login selection list; no identity required.
pub(crate) async fn users_handler<S>(State(service): SharedService<S>) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.users())
}

pub(crate) async fn list_owners_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ViewDashboard)
        .and_then(|_| service.owners());
    respond(StatusCode::OK, result)
}

pub(crate) async fn register_owner_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Json(registration): Json<OwnerRegistration>,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ManageOwners)
        .and_then(|_| service.register_owner(registration, today()));
    respond(StatusCode::CREATED, result)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PropertyFilter {
    owner_id: Option<String>,
}

pub(crate) async fn list_properties_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Query(filter): Query<PropertyFilter>,
) -> Response
where
    S: RecordStore + 'static,
{
    let owner_id = filter.owner_id.map(OwnerId);
    let result = authorize(&service, &headers, Capability::ViewDashboard)
        .and_then(|_| service.properties(owner_id.as_ref()));
    respond(StatusCode::OK, result)
}

pub(crate) async fn register_property_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Json(registration): Json<PropertyRegistration>,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ManageOwners)
        .and_then(|_| service.register_property(registration, today()));
    respond(StatusCode::CREATED, result)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AppraiserFilter {
    #[serde(default)]
    available: bool,
}

pub(crate) async fn list_appraisers_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Query(filter): Query<AppraiserFilter>,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ViewDashboard)
        .and_then(|_| service.appraisers(filter.available));
    respond(StatusCode::OK, result)
}

pub(crate) async fn register_appraiser_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Json(registration): Json<AppraiserRegistration>,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ManageAppraisers)
        .and_then(|_| service.register_appraiser(registration));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn appraiser_queue_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Path(appraiser_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let appraiser_id = AppraiserId(appraiser_id);
    let result = authorize(&service, &headers, Capability::ViewAppraisals).and_then(|user| {
        service.ensure_can_view_queue(&user, &appraiser_id)?;
        service.appraiser_queue(&appraiser_id)
    });
    respond(StatusCode::OK, result)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RequestFilter {
    status: Option<String>,
}

pub(crate) async fn list_requests_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Query(filter): Query<RequestFilter>,
) -> Response
where
    S: RecordStore + 'static,
{
    let user = match authorize(&service, &headers, Capability::ViewDashboard) {
        Ok(user) => user,
        Err(error) => return error_response(error),
    };

    let status = match filter.status.as_deref() {
        Some(raw) => match RequestStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                let payload = json!({ "error": format!("unknown request status '{raw}'") });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
            }
        },
        None => None,
    };

    let result = service.requests_visible_to(&user, status);
    respond(StatusCode::OK, result)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequestBody {
    owner_id: OwnerId,
    property_id: PropertyId,
}

pub(crate) async fn create_request_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::CreateRequests)
        .and_then(|_| service.create_request(&body.owner_id, &body.property_id, today()));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn request_detail_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let request_id = RequestId(request_id);
    let result = authorize(&service, &headers, Capability::ViewDashboard).and_then(|user| {
        service.ensure_can_view_request(&user, &request_id)?;
        service.request_detail(&request_id)
    });
    respond(StatusCode::OK, result)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentBody {
    appraiser_id: AppraiserId,
}

pub(crate) async fn assign_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    Json(body): Json<AssignmentBody>,
) -> Response
where
    S: RecordStore + 'static,
{
    let request_id = RequestId(request_id);
    let result = authorize(&service, &headers, Capability::AssignAppraisers)
        .and_then(|_| service.assign_appraiser(&request_id, &body.appraiser_id, today()));
    respond(StatusCode::OK, result)
}

pub(crate) async fn record_appraisal_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    Json(submission): Json<AppraisalSubmission>,
) -> Response
where
    S: RecordStore + 'static,
{
    let request_id = RequestId(request_id);
    let result = authorize(&service, &headers, Capability::RecordAppraisals)
        .and_then(|user| service.ensure_can_record(&user, &request_id))
        .and_then(|_| service.record_appraisal(&request_id, submission, today()));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_appraisals_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ViewAppraisals)
        .and_then(|user| service.appraisals_visible_to(&user));
    respond(StatusCode::OK, result)
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    #[serde(flatten)]
    stats: DashboardStats,
    status_counts: Vec<StatusCountEntry>,
}

pub(crate) async fn dashboard_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ViewDashboard)
        .and_then(|_| service.dashboard())
        .map(|stats| DashboardResponse {
            status_counts: stats.status_counts(),
            stats,
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn commission_report_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let result = authorize(&service, &headers, Capability::ExportReports).and_then(|_| {
        Ok(json!({
            "by_appraiser": service.commission_breakdown()?,
            "rows": service.commission_report()?,
        }))
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn commission_csv_handler<S>(
    State(service): SharedService<S>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + 'static,
{
    let rows = match authorize(&service, &headers, Capability::ExportReports)
        .and_then(|_| service.commission_report())
    {
        Ok(rows) => rows,
        Err(error) => return error_response(error),
    };

    let mut buffer = Vec::new();
    if let Err(err) = write_commission_csv(&rows, &mut buffer) {
        let payload = json!({ "error": err.to_string() });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        buffer,
    )
        .into_response()
}

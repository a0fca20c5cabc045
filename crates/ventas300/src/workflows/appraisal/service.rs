use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::access::{allows, Capability, SessionView};
use super::commission::{commission_for, CommissionPolicy};
use super::dashboard::{commission_breakdown, AppraiserCommissionEntry, DashboardStats};
use super::domain::{
    Appraisal, AppraisalId, AppraisalRequest, AppraisalSubmission, Appraiser, AppraiserId,
    AppraiserRegistration, Owner, OwnerId, OwnerRegistration, Property, PropertyId,
    PropertyRegistration, RequestId, Role, User, UserId,
};
use super::export::{commission_rows, CommissionReportRow};
use super::lifecycle::{RequestStage, RequestStatus, TransitionError};
use super::numbering::next_request_number;
use super::seed::DemoDataset;
use super::store::{Record, RecordStore, StoreError};
use super::validation::{parse_appraised_value, require_text, validate_percentage, ValidationError};

/// Service owning the record store and running the request lifecycle.
///
/// Every write is a read-modify-write of whole collections, so writes are
/// serialised behind a single lock.
pub struct AppraisalService<S> {
    store: Arc<S>,
    policy: CommissionPolicy,
    write_lock: Mutex<()>,
}

impl<S> AppraisalService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, policy: CommissionPolicy) -> Self {
        Self {
            store,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> CommissionPolicy {
        self.policy
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".to_string()).into())
    }

    fn require<R: Record>(&self, entity: &'static str, id: &R::Id) -> Result<R, ServiceError> {
        self.store
            .fetch::<R>(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity,
                id: id.to_string(),
            })
    }

    /// Seed the sample brokerage data into any empty collection.
    pub fn load_demo_data(&self) -> Result<bool, ServiceError> {
        let _guard = self.write_guard()?;
        let seeded = DemoDataset::standard().load_into(self.store.as_ref())?;
        if seeded {
            info!("demo dataset loaded");
        }
        Ok(seeded)
    }

    pub fn register_owner(
        &self,
        registration: OwnerRegistration,
        today: NaiveDate,
    ) -> Result<Owner, ServiceError> {
        let name = require_text("name", &registration.name)?;
        let email = require_text("email", &registration.email)?;

        let _guard = self.write_guard()?;
        let existing = self.store.all::<Owner>()?;
        let owner = Owner {
            id: OwnerId(next_id(&existing, "own")),
            name,
            phone: registration.phone.trim().to_string(),
            email,
            registered_on: today,
        };

        let stored = self.store.insert(owner)?;
        info!(owner_id = %stored.id, "owner registered");
        Ok(stored)
    }

    pub fn register_property(
        &self,
        registration: PropertyRegistration,
        today: NaiveDate,
    ) -> Result<Property, ServiceError> {
        let address = require_text("address", &registration.address)?;

        let _guard = self.write_guard()?;
        let owner: Owner = self.require("owner", &registration.owner_id)?;
        let existing = self.store.all::<Property>()?;
        let property = Property {
            id: PropertyId(next_id(&existing, "prop")),
            owner_id: owner.id,
            address,
            kind: registration.kind,
            features: registration.features.trim().to_string(),
            registered_on: today,
        };

        let stored = self.store.insert(property)?;
        info!(property_id = %stored.id, owner_id = %stored.owner_id, "property registered");
        Ok(stored)
    }

    pub fn register_appraiser(
        &self,
        registration: AppraiserRegistration,
    ) -> Result<Appraiser, ServiceError> {
        let name = require_text("name", &registration.name)?;
        let email = require_text("email", &registration.email)?;
        let commission_percentage = validate_percentage(
            registration
                .commission_percentage
                .unwrap_or_else(|| self.policy.default_percentage()),
        )?;

        let _guard = self.write_guard()?;
        let existing = self.store.all::<Appraiser>()?;
        let appraiser = Appraiser {
            id: AppraiserId(next_id(&existing, "per")),
            name,
            phone: registration.phone.trim().to_string(),
            email,
            specialty: registration.specialty.trim().to_string(),
            available: registration.available,
            commission_percentage,
        };

        let stored = self.store.insert(appraiser)?;
        info!(appraiser_id = %stored.id, commission_percentage, "appraiser registered");
        Ok(stored)
    }

    /// Open a pending request for an owner's property.
    pub fn create_request(
        &self,
        owner_id: &OwnerId,
        property_id: &PropertyId,
        today: NaiveDate,
    ) -> Result<AppraisalRequest, ServiceError> {
        let _guard = self.write_guard()?;
        let owner: Owner = self.require("owner", owner_id)?;
        let property: Property = self.require("property", property_id)?;
        if property.owner_id != owner.id {
            warn!(%owner_id, %property_id, "request rejected: property belongs to another owner");
            return Err(ValidationError::PropertyOwnerMismatch {
                property_id: property.id.to_string(),
                owner_id: owner.id.to_string(),
            }
            .into());
        }

        let existing = self.store.all::<AppraisalRequest>()?;
        let request = AppraisalRequest {
            id: RequestId(next_id(&existing, "req")),
            number: next_request_number(&existing, today),
            owner_id: owner.id,
            property_id: property.id,
            created_on: today,
            stage: RequestStage::Pending,
        };

        let stored = self.store.insert(request)?;
        info!(request_id = %stored.id, number = %stored.number, "appraisal request created");
        Ok(stored)
    }

    /// Move a pending request to assigned.
    pub fn assign_appraiser(
        &self,
        request_id: &RequestId,
        appraiser_id: &AppraiserId,
        today: NaiveDate,
    ) -> Result<AppraisalRequest, ServiceError> {
        let _guard = self.write_guard()?;
        let mut request: AppraisalRequest = self.require("request", request_id)?;
        let appraiser: Appraiser = self.require("appraiser", appraiser_id)?;

        let stage = request
            .stage
            .assign(appraiser.id.clone(), today)
            .inspect_err(|err| warn!(%request_id, %err, "assignment rejected"))?;
        if !appraiser.available {
            warn!(%request_id, %appraiser_id, "assignment rejected: appraiser unavailable");
            return Err(ValidationError::AppraiserUnavailable {
                appraiser_id: appraiser.id.to_string(),
            }
            .into());
        }

        request.stage = stage;
        self.store.update(request.clone())?;
        info!(%request_id, %appraiser_id, "appraiser assigned");
        Ok(request)
    }

    /// Record the valuation of an assigned request and close it.
    pub fn record_appraisal(
        &self,
        request_id: &RequestId,
        submission: AppraisalSubmission,
        today: NaiveDate,
    ) -> Result<Appraisal, ServiceError> {
        let _guard = self.write_guard()?;
        let mut request: AppraisalRequest = self.require("request", request_id)?;

        let appraiser_id = request
            .stage
            .assigned_appraiser()
            .inspect_err(|err| warn!(%request_id, %err, "appraisal rejected"))?
            .clone();
        let appraised_value = parse_appraised_value(&submission.appraised_value)
            .inspect_err(|err| warn!(%request_id, %err, "appraisal rejected"))?;

        let appraiser: Appraiser = self.require("appraiser", &appraiser_id)?;
        let commission = commission_for(appraised_value, appraiser.commission_percentage);

        let existing = self.store.all::<Appraisal>()?;
        if let Some(recorded) = existing
            .iter()
            .find(|appraisal| appraisal.request_id == request.id)
        {
            warn!(%request_id, appraisal_id = %recorded.id, "request already has an appraisal");
            return Err(StoreError::Conflict {
                collection: Appraisal::COLLECTION,
                id: recorded.id.to_string(),
            }
            .into());
        }
        let appraisal = Appraisal {
            id: AppraisalId(next_id(&existing, "eval")),
            request_id: request.id.clone(),
            appraiser_id,
            observations: submission.observations.trim().to_string(),
            appraised_value,
            commission,
            photos: submission
                .photos
                .into_iter()
                .map(|photo| photo.trim().to_string())
                .filter(|photo| !photo.is_empty())
                .collect(),
            appraised_on: today,
        };

        // The request closes first; a failed appraisal write reopens it.
        let previous = request.clone();
        request.stage = request.stage.evaluate(today)?;
        self.store.update(request)?;
        let stored = match self.store.insert(appraisal) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%request_id, %err, "appraisal not stored; reopening request");
                if let Err(rollback) = self.store.update(previous) {
                    error!(%request_id, %rollback, "request left evaluated without an appraisal");
                }
                return Err(err.into());
            }
        };
        info!(
            %request_id,
            appraisal_id = %stored.id,
            appraised_value,
            commission,
            "appraisal recorded"
        );
        Ok(stored)
    }

    pub fn dashboard(&self) -> Result<DashboardStats, ServiceError> {
        let requests = self.store.all::<AppraisalRequest>()?;
        let appraisals = self.store.all::<Appraisal>()?;
        Ok(DashboardStats::compute(&requests, &appraisals))
    }

    pub fn commission_breakdown(&self) -> Result<Vec<AppraiserCommissionEntry>, ServiceError> {
        let appraisers = self.store.all::<Appraiser>()?;
        let appraisals = self.store.all::<Appraisal>()?;
        Ok(commission_breakdown(&appraisers, &appraisals))
    }

    pub fn commission_report(&self) -> Result<Vec<CommissionReportRow>, ServiceError> {
        let requests = self.store.all::<AppraisalRequest>()?;
        let appraisers = self.store.all::<Appraiser>()?;
        let appraisals = self.store.all::<Appraisal>()?;
        Ok(commission_rows(&requests, &appraisers, &appraisals))
    }

    pub fn owners(&self) -> Result<Vec<Owner>, ServiceError> {
        Ok(self.store.all()?)
    }

    pub fn properties(&self, owner_id: Option<&OwnerId>) -> Result<Vec<Property>, ServiceError> {
        let properties = self.store.all::<Property>()?;
        Ok(match owner_id {
            Some(owner_id) => properties
                .into_iter()
                .filter(|property| &property.owner_id == owner_id)
                .collect(),
            None => properties,
        })
    }

    pub fn appraisers(&self, only_available: bool) -> Result<Vec<Appraiser>, ServiceError> {
        let appraisers = self.store.all::<Appraiser>()?;
        Ok(appraisers
            .into_iter()
            .filter(|appraiser| !only_available || appraiser.available)
            .collect())
    }

    pub fn appraisals(&self) -> Result<Vec<Appraisal>, ServiceError> {
        Ok(self.store.all()?)
    }

    pub fn users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.all()?)
    }

    /// Requests, newest first, optionally narrowed to one status.
    pub fn requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<AppraisalRequest>, ServiceError> {
        let mut requests: Vec<AppraisalRequest> = self
            .store
            .all::<AppraisalRequest>()?
            .into_iter()
            .filter(|request| status.map_or(true, |status| request.stage.status() == status))
            .collect();
        requests.sort_by(|a, b| {
            b.created_on
                .cmp(&a.created_on)
                .then_with(|| b.number.cmp(&a.number))
        });
        Ok(requests)
    }

    /// A request joined with the records it references. References that no
    /// longer resolve come back empty rather than failing the lookup.
    pub fn request_detail(&self, request_id: &RequestId) -> Result<RequestDetail, ServiceError> {
        let request: AppraisalRequest = self.require("request", request_id)?;
        let owner = self.store.fetch::<Owner>(&request.owner_id)?;
        let property = self.store.fetch::<Property>(&request.property_id)?;
        let appraiser = match request.stage.appraiser_id() {
            Some(id) => self.store.fetch::<Appraiser>(id)?,
            None => None,
        };
        let appraisal = self
            .store
            .all::<Appraisal>()?
            .into_iter()
            .find(|appraisal| appraisal.request_id == request.id);

        Ok(RequestDetail {
            status: request.stage.status(),
            status_label: request.stage.status().label(),
            request,
            owner,
            property,
            appraiser,
            appraisal,
        })
    }

    /// Requests referencing an appraiser, newest first.
    pub fn appraiser_queue(
        &self,
        appraiser_id: &AppraiserId,
    ) -> Result<Vec<AppraisalRequest>, ServiceError> {
        let _: Appraiser = self.require("appraiser", appraiser_id)?;
        Ok(self
            .requests(None)?
            .into_iter()
            .filter(|request| request.stage.appraiser_id() == Some(appraiser_id))
            .collect())
    }

    /// The Appraiser record behind an appraiser-role session, matched by email.
    pub fn appraiser_for_user(&self, user: &User) -> Result<Option<Appraiser>, ServiceError> {
        if user.role != Role::Appraiser {
            return Ok(None);
        }
        Ok(self
            .store
            .all::<Appraiser>()?
            .into_iter()
            .find(|appraiser| appraiser.email.eq_ignore_ascii_case(&user.email)))
    }

    pub fn session(&self, user_id: &UserId) -> Result<SessionView, ServiceError> {
        let user: User = self.require("user", user_id)?;
        Ok(SessionView::for_user(user))
    }

    /// Resolve the caller and check the role table.
    pub fn authorize(
        &self,
        user_id: Option<&UserId>,
        capability: Capability,
    ) -> Result<User, ServiceError> {
        let user_id = user_id.ok_or(ServiceError::Unauthenticated)?;
        let user = self
            .store
            .fetch::<User>(user_id)?
            .ok_or(ServiceError::Unauthenticated)?;

        if !allows(user.role, capability) {
            warn!(user_id = %user.id, role = user.role.label(), action = capability.label(), "forbidden");
            return Err(ServiceError::Forbidden {
                role: user.role,
                action: capability.label(),
            });
        }
        Ok(user)
    }

    /// Appraiser sessions may only record appraisals on their own requests.
    pub fn ensure_can_record(
        &self,
        user: &User,
        request_id: &RequestId,
    ) -> Result<(), ServiceError> {
        self.ensure_owns_request(
            user,
            request_id,
            "record appraisals for requests assigned to another appraiser",
        )
    }

    /// Appraiser sessions may only open the requests assigned to them.
    pub fn ensure_can_view_request(
        &self,
        user: &User,
        request_id: &RequestId,
    ) -> Result<(), ServiceError> {
        self.ensure_owns_request(user, request_id, "view requests assigned to another appraiser")
    }

    pub fn ensure_can_view_queue(
        &self,
        user: &User,
        appraiser_id: &AppraiserId,
    ) -> Result<(), ServiceError> {
        match self.appraiser_scope(user)? {
            Some(own) if &own != appraiser_id => Err(ServiceError::Forbidden {
                role: user.role,
                action: "view another appraiser's queue",
            }),
            _ => Ok(()),
        }
    }

    /// Requests the session may list: all of them, or only its own for appraisers.
    pub fn requests_visible_to(
        &self,
        user: &User,
        status: Option<RequestStatus>,
    ) -> Result<Vec<AppraisalRequest>, ServiceError> {
        let requests = self.requests(status)?;
        Ok(match self.appraiser_scope(user)? {
            Some(own) => requests
                .into_iter()
                .filter(|request| request.stage.appraiser_id() == Some(&own))
                .collect(),
            None => requests,
        })
    }

    /// Appraisals the session may list: all of them, or only its own for appraisers.
    pub fn appraisals_visible_to(&self, user: &User) -> Result<Vec<Appraisal>, ServiceError> {
        let appraisals = self.appraisals()?;
        Ok(match self.appraiser_scope(user)? {
            Some(own) => appraisals
                .into_iter()
                .filter(|appraisal| appraisal.appraiser_id == own)
                .collect(),
            None => appraisals,
        })
    }

    /// `None` for roles that see every record. An appraiser session without a
    /// matching Appraiser record has no visible records and is forbidden.
    fn appraiser_scope(&self, user: &User) -> Result<Option<AppraiserId>, ServiceError> {
        if user.role != Role::Appraiser {
            return Ok(None);
        }
        match self.appraiser_for_user(user)? {
            Some(appraiser) => Ok(Some(appraiser.id)),
            None => Err(ServiceError::Forbidden {
                role: user.role,
                action: "act without a registered appraiser profile",
            }),
        }
    }

    fn ensure_owns_request(
        &self,
        user: &User,
        request_id: &RequestId,
        action: &'static str,
    ) -> Result<(), ServiceError> {
        let Some(own) = self.appraiser_scope(user)? else {
            return Ok(());
        };
        let request: AppraisalRequest = self.require("request", request_id)?;
        if request.stage.appraiser_id() == Some(&own) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden {
                role: user.role,
                action,
            })
        }
    }
}

/// `<prefix>-<n>` where `n` starts after the current collection size and skips taken ids.
fn next_id<R: Record>(existing: &[R], prefix: &str) -> String {
    let mut sequence = existing.len() + 1;
    loop {
        let candidate = format!("{prefix}-{sequence:06}");
        if !existing
            .iter()
            .any(|record| record.id().to_string() == candidate)
        {
            return candidate;
        }
        sequence += 1;
    }
}

/// Request with its owner, property, appraiser and appraisal.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    pub request: AppraisalRequest,
    pub status: RequestStatus,
    pub status_label: &'static str,
    pub owner: Option<Owner>,
    pub property: Option<Property>,
    pub appraiser: Option<Appraiser>,
    pub appraisal: Option<Appraisal>,
}

/// Error raised by the appraisal service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no known user identity supplied")]
    Unauthenticated,
    #[error("role '{}' may not {action}", role.label())]
    Forbidden { role: Role, action: &'static str },
}

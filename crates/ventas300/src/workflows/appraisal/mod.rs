//! Appraisal brokerage: owners register properties, coordinators open and
//! assign appraisal requests, appraisers record valuations and finance reads
//! the commissions those valuations produce.

pub mod access;
pub mod commission;
pub mod dashboard;
pub mod domain;
pub mod export;
pub mod lifecycle;
pub mod numbering;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use access::{Capability, Section, SessionView};
pub use commission::{commission_for, CommissionPolicy};
pub use dashboard::{AppraiserCommissionEntry, DashboardStats, StatusCountEntry};
pub use domain::{
    Appraisal, AppraisalId, AppraisalRequest, AppraisalSubmission, Appraiser, AppraiserId,
    AppraiserRegistration, Owner, OwnerId, OwnerRegistration, Property, PropertyId, PropertyKind,
    PropertyRegistration, RequestId, Role, User, UserId,
};
pub use export::{write_commission_csv, CommissionReportRow, ExportError};
pub use lifecycle::{LifecycleAction, RequestStage, RequestStatus, TransitionError};
pub use router::{appraisal_router, USER_HEADER};
pub use seed::DemoDataset;
pub use service::{AppraisalService, RequestDetail, ServiceError};
pub use store::{JsonFileStore, MemoryStore, Record, RecordStore, StoreError};
pub use validation::ValidationError;

//! Forward-only request lifecycle: `pending -> assigned -> evaluated`.
//!
//! The appraiser reference and the transition dates live inside the stage
//! variants, so a pending request cannot carry an appraiser and an evaluated
//! request always knows when it was assigned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::AppraiserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    Evaluated,
}

impl RequestStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Assigned, Self::Evaluated]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Evaluated => "evaluated",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "pendiente" => Some(Self::Pending),
            "assigned" | "asignada" => Some(Self::Assigned),
            "evaluated" | "evaluada" => Some(Self::Evaluated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestStage {
    Pending,
    Assigned {
        appraiser_id: AppraiserId,
        assigned_on: NaiveDate,
    },
    Evaluated {
        appraiser_id: AppraiserId,
        assigned_on: NaiveDate,
        evaluated_on: NaiveDate,
    },
}

impl RequestStage {
    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Pending => RequestStatus::Pending,
            Self::Assigned { .. } => RequestStatus::Assigned,
            Self::Evaluated { .. } => RequestStatus::Evaluated,
        }
    }

    pub fn appraiser_id(&self) -> Option<&AppraiserId> {
        match self {
            Self::Pending => None,
            Self::Assigned { appraiser_id, .. } | Self::Evaluated { appraiser_id, .. } => {
                Some(appraiser_id)
            }
        }
    }

    pub fn assigned_on(&self) -> Option<NaiveDate> {
        match self {
            Self::Pending => None,
            Self::Assigned { assigned_on, .. } | Self::Evaluated { assigned_on, .. } => {
                Some(*assigned_on)
            }
        }
    }

    pub fn evaluated_on(&self) -> Option<NaiveDate> {
        match self {
            Self::Evaluated { evaluated_on, .. } => Some(*evaluated_on),
            _ => None,
        }
    }

    /// Attach an appraiser to a pending request.
    pub fn assign(
        &self,
        appraiser_id: AppraiserId,
        on: NaiveDate,
    ) -> Result<RequestStage, TransitionError> {
        match self {
            Self::Pending => Ok(Self::Assigned {
                appraiser_id,
                assigned_on: on,
            }),
            other => Err(TransitionError {
                action: LifecycleAction::Assign,
                current: other.status(),
            }),
        }
    }

    /// The appraiser of a request that is ready to be evaluated.
    pub fn assigned_appraiser(&self) -> Result<&AppraiserId, TransitionError> {
        match self {
            Self::Assigned { appraiser_id, .. } => Ok(appraiser_id),
            other => Err(TransitionError {
                action: LifecycleAction::Evaluate,
                current: other.status(),
            }),
        }
    }

    /// Close an assigned request, keeping the appraiser and assignment date.
    pub fn evaluate(&self, on: NaiveDate) -> Result<RequestStage, TransitionError> {
        match self {
            Self::Assigned {
                appraiser_id,
                assigned_on,
            } => Ok(Self::Evaluated {
                appraiser_id: appraiser_id.clone(),
                assigned_on: *assigned_on,
                evaluated_on: on,
            }),
            other => Err(TransitionError {
                action: LifecycleAction::Evaluate,
                current: other.status(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Assign,
    Evaluate,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assign => "assign an appraiser to",
            Self::Evaluate => "record an appraisal for",
        }
    }

    pub const fn required(self) -> RequestStatus {
        match self {
            Self::Assign => RequestStatus::Pending,
            Self::Evaluate => RequestStatus::Assigned,
        }
    }
}

/// Out-of-order lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "cannot {} a request in status '{}' (expected '{}')",
    action.label(),
    current.label(),
    action.required().label()
)]
pub struct TransitionError {
    pub action: LifecycleAction,
    pub current: RequestStatus,
}

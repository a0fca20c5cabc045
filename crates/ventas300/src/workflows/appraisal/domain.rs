use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lifecycle::RequestStage;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier wrapper for registered owners.
    OwnerId
);
record_id!(PropertyId);
record_id!(AppraiserId);
record_id!(
    /// Identifier wrapper for appraisal requests. Distinct from the human readable request number.
    RequestId
);
record_id!(AppraisalId);
record_id!(UserId);

/// Person who owns a property and requests its appraisal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub registered_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    House,
    Land,
    Apartment,
    CommercialPremises,
    Warehouse,
}

impl PropertyKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::House,
            Self::Land,
            Self::Apartment,
            Self::CommercialPremises,
            Self::Warehouse,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Land => "Land",
            Self::Apartment => "Apartment",
            Self::CommercialPremises => "Commercial premises",
            Self::Warehouse => "Warehouse",
        }
    }
}

/// Parcel or building referenced by its owner id, never embedded in the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: OwnerId,
    pub address: String,
    pub kind: PropertyKind,
    pub features: String,
    pub registered_on: NaiveDate,
}

/// Field professional who values properties for a commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraiser {
    pub id: AppraiserId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub specialty: String,
    pub available: bool,
    pub commission_percentage: f64,
}

/// Request to have a property appraised. The lifecycle stage carries the
/// appraiser reference and the transition dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppraisalRequest {
    pub id: RequestId,
    pub number: String,
    pub owner_id: OwnerId,
    pub property_id: PropertyId,
    pub created_on: NaiveDate,
    #[serde(flatten)]
    pub stage: RequestStage,
}

/// Completed valuation. The commission is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    pub id: AppraisalId,
    pub request_id: RequestId,
    pub appraiser_id: AppraiserId,
    pub observations: String,
    pub appraised_value: f64,
    pub commission: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    pub appraised_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Coordinator,
    Appraiser,
    Finance,
}

impl Role {
    pub const fn ordered() -> [Self; 4] {
        [Self::Admin, Self::Coordinator, Self::Appraiser, Self::Finance]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Coordinator => "Coordinator",
            Self::Appraiser => "Appraiser",
            Self::Finance => "Finance",
        }
    }
}

/// Session identity supplied by the login collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerRegistration {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyRegistration {
    pub owner_id: OwnerId,
    pub address: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub features: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppraiserRegistration {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Falls back to the configured default rate when omitted.
    #[serde(default)]
    pub commission_percentage: Option<f64>,
}

fn default_available() -> bool {
    true
}

/// Form input for recording an appraisal. The value arrives as raw text and is
/// validated before any commission is computed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppraisalSubmission {
    #[serde(default)]
    pub observations: String,
    #[serde(deserialize_with = "deserialize_raw_amount")]
    pub appraised_value: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(f64),
}

fn deserialize_raw_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(raw) => raw,
        RawAmount::Number(value) => value.to_string(),
    })
}

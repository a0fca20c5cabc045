use chrono::NaiveDate;

use super::domain::{
    Appraisal, AppraisalId, AppraisalRequest, Appraiser, AppraiserId, Owner, OwnerId, Property,
    PropertyId, PropertyKind, RequestId, Role, User, UserId,
};
use super::lifecycle::RequestStage;
use super::store::{RecordStore, StoreError};

/// Brokerage sample data: one request in each lifecycle stage.
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub owners: Vec<Owner>,
    pub properties: Vec<Property>,
    pub appraisers: Vec<Appraiser>,
    pub requests: Vec<AppraisalRequest>,
    pub appraisals: Vec<Appraisal>,
    pub users: Vec<User>,
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
}

impl DemoDataset {
    pub fn standard() -> Self {
        let owners = vec![
            owner("1", "Carlos Mendoza", "555-0123", "carlos.mendoza@email.com", 15),
            owner("2", "María González", "555-0456", "maria.gonzalez@email.com", 16),
            owner("3", "Roberto Silva", "555-0789", "roberto.silva@email.com", 17),
        ];

        let properties = vec![
            property(
                "1",
                "1",
                "Av. Libertad 123, Col. Centro",
                PropertyKind::House,
                "3 habitaciones, 2 baños, piscina, jardín amplio",
                15,
            ),
            property(
                "2",
                "2",
                "Calle Principal 456, Col. San José",
                PropertyKind::Apartment,
                "2 habitaciones, 1 baño, balcón, estacionamiento",
                16,
            ),
            property(
                "3",
                "3",
                "Carretera Norte Km 5, Zona Industrial",
                PropertyKind::Land,
                "500 m², uso comercial, frente a carretera",
                17,
            ),
        ];

        let appraisers = vec![
            appraiser(
                "1",
                "Ana Torres",
                "555-1001",
                "ana.torres@ventas300.com",
                "Residencial",
                true,
                10.0,
            ),
            appraiser(
                "2",
                "Pedro Ramírez",
                "555-1002",
                "pedro.ramirez@ventas300.com",
                "Comercial",
                true,
                12.0,
            ),
            appraiser(
                "3",
                "Luisa Herrera",
                "555-1003",
                "luisa.herrera@ventas300.com",
                "Terrenos",
                false,
                15.0,
            ),
        ];

        let requests = vec![
            AppraisalRequest {
                id: RequestId::from("1"),
                number: "SOL-2025-01-001".to_string(),
                owner_id: OwnerId::from("1"),
                property_id: PropertyId::from("1"),
                created_on: date(1, 15),
                stage: RequestStage::Evaluated {
                    appraiser_id: AppraiserId::from("1"),
                    assigned_on: date(1, 16),
                    evaluated_on: date(1, 18),
                },
            },
            AppraisalRequest {
                id: RequestId::from("2"),
                number: "SOL-2025-01-002".to_string(),
                owner_id: OwnerId::from("2"),
                property_id: PropertyId::from("2"),
                created_on: date(1, 16),
                stage: RequestStage::Assigned {
                    appraiser_id: AppraiserId::from("2"),
                    assigned_on: date(1, 17),
                },
            },
            AppraisalRequest {
                id: RequestId::from("3"),
                number: "SOL-2025-01-003".to_string(),
                owner_id: OwnerId::from("3"),
                property_id: PropertyId::from("3"),
                created_on: date(1, 17),
                stage: RequestStage::Pending,
            },
        ];

        let appraisals = vec![Appraisal {
            id: AppraisalId::from("1"),
            request_id: RequestId::from("1"),
            appraiser_id: AppraiserId::from("1"),
            observations: "Casa bien conservada, cocina remodelada recientemente, jardín en excelente estado. Requiere pintura exterior menor.".to_string(),
            appraised_value: 150_000.0,
            commission: 15_000.0,
            photos: vec![
                "foto1.jpg".to_string(),
                "foto2.jpg".to_string(),
                "foto3.jpg".to_string(),
            ],
            appraised_on: date(1, 18),
        }];

        let users = vec![
            user("1", "Admin Principal", "admin@ventas300.com", Role::Admin),
            user("2", "Coordinador López", "coordinador@ventas300.com", Role::Coordinator),
            user("3", "Ana Torres", "ana.torres@ventas300.com", Role::Appraiser),
            user("4", "Finanzas Dept.", "finanzas@ventas300.com", Role::Finance),
        ];

        Self {
            owners,
            properties,
            appraisers,
            requests,
            appraisals,
            users,
        }
    }

    /// Write the whole dataset into a store that holds no records at all.
    ///
    /// A store with data in any collection is left untouched, so sample rows
    /// never end up referencing records that were never written.
    pub fn load_into<S: RecordStore>(&self, store: &S) -> Result<bool, StoreError> {
        let untouched = store.all::<Owner>()?.is_empty()
            && store.all::<Property>()?.is_empty()
            && store.all::<Appraiser>()?.is_empty()
            && store.all::<AppraisalRequest>()?.is_empty()
            && store.all::<Appraisal>()?.is_empty()
            && store.all::<User>()?.is_empty();
        if !untouched {
            return Ok(false);
        }

        store.save(&self.owners)?;
        store.save(&self.properties)?;
        store.save(&self.appraisers)?;
        store.save(&self.requests)?;
        store.save(&self.appraisals)?;
        store.save(&self.users)?;
        Ok(true)
    }
}

fn owner(id: &str, name: &str, phone: &str, email: &str, day: u32) -> Owner {
    Owner {
        id: OwnerId::from(id),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        registered_on: date(1, day),
    }
}

fn property(
    id: &str,
    owner_id: &str,
    address: &str,
    kind: PropertyKind,
    features: &str,
    day: u32,
) -> Property {
    Property {
        id: PropertyId::from(id),
        owner_id: OwnerId::from(owner_id),
        address: address.to_string(),
        kind,
        features: features.to_string(),
        registered_on: date(1, day),
    }
}

fn appraiser(
    id: &str,
    name: &str,
    phone: &str,
    email: &str,
    specialty: &str,
    available: bool,
    commission_percentage: f64,
) -> Appraiser {
    Appraiser {
        id: AppraiserId::from(id),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        specialty: specialty.to_string(),
        available,
        commission_percentage,
    }
}

fn user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

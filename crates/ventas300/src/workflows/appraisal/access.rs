//! Role keyed navigation and permission tables consulted by the HTTP layer.

use serde::Serialize;

use super::domain::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Owners,
    Requests,
    Assignments,
    Appraisals,
    MyAppraisals,
    Reports,
}

impl Section {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Owners => "Owners",
            Self::Requests => "Requests",
            Self::Assignments => "Assignments",
            Self::Appraisals => "Appraisals",
            Self::MyAppraisals => "My appraisals",
            Self::Reports => "Reports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ManageOwners,
    ManageAppraisers,
    CreateRequests,
    AssignAppraisers,
    RecordAppraisals,
    ViewAppraisals,
    ExportReports,
}

impl Capability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewDashboard => "view the dashboard",
            Self::ManageOwners => "register owners and properties",
            Self::ManageAppraisers => "register appraisers",
            Self::CreateRequests => "create appraisal requests",
            Self::AssignAppraisers => "assign appraisers",
            Self::RecordAppraisals => "record appraisals",
            Self::ViewAppraisals => "view appraisals",
            Self::ExportReports => "export commission reports",
        }
    }
}

pub fn sections_for(role: Role) -> &'static [Section] {
    match role {
        Role::Admin => &[
            Section::Dashboard,
            Section::Owners,
            Section::Requests,
            Section::Assignments,
            Section::Appraisals,
        ],
        Role::Coordinator => &[
            Section::Dashboard,
            Section::Owners,
            Section::Requests,
            Section::Assignments,
        ],
        Role::Appraiser => &[Section::Dashboard, Section::MyAppraisals],
        Role::Finance => &[Section::Dashboard, Section::Reports],
    }
}

pub fn capabilities_for(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => &[
            Capability::ViewDashboard,
            Capability::ManageOwners,
            Capability::ManageAppraisers,
            Capability::CreateRequests,
            Capability::AssignAppraisers,
            Capability::RecordAppraisals,
            Capability::ViewAppraisals,
            Capability::ExportReports,
        ],
        Role::Coordinator => &[
            Capability::ViewDashboard,
            Capability::ManageOwners,
            Capability::CreateRequests,
            Capability::AssignAppraisers,
            Capability::ViewAppraisals,
        ],
        // Appraisers may only record on requests assigned to them; the service checks ownership.
        Role::Appraiser => &[
            Capability::ViewDashboard,
            Capability::RecordAppraisals,
            Capability::ViewAppraisals,
        ],
        Role::Finance => &[
            Capability::ViewDashboard,
            Capability::ViewAppraisals,
            Capability::ExportReports,
        ],
    }
}

pub fn allows(role: Role, capability: Capability) -> bool {
    capabilities_for(role).contains(&capability)
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionEntry {
    pub section: Section,
    pub label: &'static str,
}

/// Menu and permissions returned to a logged-in session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub user: User,
    pub role_label: &'static str,
    pub sections: Vec<SectionEntry>,
    pub capabilities: Vec<Capability>,
}

impl SessionView {
    pub fn for_user(user: User) -> Self {
        let role = user.role;
        Self {
            user,
            role_label: role.label(),
            sections: sections_for(role)
                .iter()
                .map(|section| SectionEntry {
                    section: *section,
                    label: section.label(),
                })
                .collect(),
            capabilities: capabilities_for(role).to_vec(),
        }
    }
}

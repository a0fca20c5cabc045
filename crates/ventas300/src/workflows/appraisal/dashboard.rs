use std::collections::HashMap;

use serde::Serialize;

use super::commission::round_currency;
use super::domain::{Appraisal, AppraisalRequest, Appraiser, AppraiserId};
use super::lifecycle::RequestStatus;

/// Aggregate figures shown on the landing view. Recomputed from the full
/// collections on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_requests: usize,
    pub pending_requests: usize,
    pub assigned_requests: usize,
    pub evaluated_requests: usize,
    pub total_commissions: f64,
    pub total_appraised_value: f64,
}

impl DashboardStats {
    pub fn compute(requests: &[AppraisalRequest], appraisals: &[Appraisal]) -> Self {
        let mut counts: HashMap<RequestStatus, usize> = HashMap::new();
        for request in requests {
            *counts.entry(request.stage.status()).or_default() += 1;
        }
        let count = |status: RequestStatus| counts.get(&status).copied().unwrap_or_default();

        let total_commissions: f64 = appraisals.iter().map(|appraisal| appraisal.commission).sum();
        let total_appraised_value: f64 = appraisals
            .iter()
            .map(|appraisal| appraisal.appraised_value)
            .sum();

        Self {
            total_requests: requests.len(),
            pending_requests: count(RequestStatus::Pending),
            assigned_requests: count(RequestStatus::Assigned),
            evaluated_requests: count(RequestStatus::Evaluated),
            total_commissions: round_currency(total_commissions),
            total_appraised_value: round_currency(total_appraised_value),
        }
    }

    pub fn status_counts(&self) -> Vec<StatusCountEntry> {
        RequestStatus::ordered()
            .into_iter()
            .map(|status| StatusCountEntry {
                status,
                status_label: status.label(),
                count: match status {
                    RequestStatus::Pending => self.pending_requests,
                    RequestStatus::Assigned => self.assigned_requests,
                    RequestStatus::Evaluated => self.evaluated_requests,
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status: RequestStatus,
    pub status_label: &'static str,
    pub count: usize,
}

/// Finance view: earnings per appraiser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppraiserCommissionEntry {
    pub appraiser_id: AppraiserId,
    pub appraiser_name: String,
    pub appraisals: usize,
    pub total_appraised_value: f64,
    pub total_commission: f64,
}

/// Group appraisals by appraiser, sorted by name. Appraisals whose appraiser
/// no longer resolves are reported under the raw id.
pub fn commission_breakdown(
    appraisers: &[Appraiser],
    appraisals: &[Appraisal],
) -> Vec<AppraiserCommissionEntry> {
    let mut entries: HashMap<&AppraiserId, AppraiserCommissionEntry> = HashMap::new();

    for appraisal in appraisals {
        let entry = entries
            .entry(&appraisal.appraiser_id)
            .or_insert_with(|| AppraiserCommissionEntry {
                appraiser_id: appraisal.appraiser_id.clone(),
                appraiser_name: appraisers
                    .iter()
                    .find(|appraiser| appraiser.id == appraisal.appraiser_id)
                    .map(|appraiser| appraiser.name.clone())
                    .unwrap_or_else(|| appraisal.appraiser_id.to_string()),
                appraisals: 0,
                total_appraised_value: 0.0,
                total_commission: 0.0,
            });
        entry.appraisals += 1;
        entry.total_appraised_value += appraisal.appraised_value;
        entry.total_commission += appraisal.commission;
    }

    let mut breakdown: Vec<AppraiserCommissionEntry> = entries
        .into_values()
        .map(|mut entry| {
            entry.total_appraised_value = round_currency(entry.total_appraised_value);
            entry.total_commission = round_currency(entry.total_commission);
            entry
        })
        .collect();
    breakdown.sort_by(|a, b| {
        a.appraiser_name
            .cmp(&b.appraiser_name)
            .then_with(|| a.appraiser_id.cmp(&b.appraiser_id))
    });
    breakdown
}

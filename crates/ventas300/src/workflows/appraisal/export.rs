use std::io::Write;

use serde::Serialize;

use super::domain::{Appraisal, AppraisalRequest, Appraiser};

/// One line of the finance commission report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionReportRow {
    pub request_number: String,
    pub appraiser: String,
    pub appraised_on: String,
    pub appraised_value: f64,
    pub commission_percentage: Option<f64>,
    pub commission: f64,
}

pub fn commission_rows(
    requests: &[AppraisalRequest],
    appraisers: &[Appraiser],
    appraisals: &[Appraisal],
) -> Vec<CommissionReportRow> {
    let mut rows: Vec<CommissionReportRow> = appraisals
        .iter()
        .map(|appraisal| {
            let request_number = requests
                .iter()
                .find(|request| request.id == appraisal.request_id)
                .map(|request| request.number.clone())
                .unwrap_or_else(|| appraisal.request_id.to_string());
            let appraiser = appraisers
                .iter()
                .find(|appraiser| appraiser.id == appraisal.appraiser_id);

            CommissionReportRow {
                request_number,
                appraiser: appraiser
                    .map(|appraiser| appraiser.name.clone())
                    .unwrap_or_else(|| appraisal.appraiser_id.to_string()),
                appraised_on: appraisal.appraised_on.format("%Y-%m-%d").to_string(),
                appraised_value: appraisal.appraised_value,
                commission_percentage: appraiser.map(|appraiser| appraiser.commission_percentage),
                commission: appraisal.commission,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.appraised_on
            .cmp(&b.appraised_on)
            .then_with(|| a.request_number.cmp(&b.request_number))
    });
    rows
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write commission report row")]
    Csv(#[from] csv::Error),
    #[error("failed to flush commission report")]
    Io(#[from] std::io::Error),
}

const REPORT_HEADER: [&str; 6] = [
    "request_number",
    "appraiser",
    "appraised_on",
    "appraised_value",
    "commission_percentage",
    "commission",
];

/// Write the rows as CSV with a header line, even when there are no rows.
pub fn write_commission_csv<W: Write>(
    rows: &[CommissionReportRow],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(REPORT_HEADER)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

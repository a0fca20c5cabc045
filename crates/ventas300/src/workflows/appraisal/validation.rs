/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("appraised value '{raw}' is not a number")]
    UnparsableAmount { raw: String },
    #[error("appraised value must be a non-negative finite amount (found {value})")]
    NegativeAmount { value: f64 },
    #[error("commission percentage must be between 0 and 100 (found {value})")]
    PercentageOutOfRange { value: f64 },
    #[error("property {property_id} does not belong to owner {owner_id}")]
    PropertyOwnerMismatch {
        property_id: String,
        owner_id: String,
    },
    #[error("appraiser {appraiser_id} is not available for new assignments")]
    AppraiserUnavailable { appraiser_id: String },
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(trimmed.to_string())
}

/// Parse the raw form value of an appraisal. Accepts thousands separators
/// (`150,000.50`) and a leading currency sign.
pub fn parse_appraised_value(raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::UnparsableAmount {
            raw: raw.to_string(),
        });
    }

    let value = cleaned
        .parse::<f64>()
        .map_err(|_| ValidationError::UnparsableAmount {
            raw: raw.to_string(),
        })?;

    if !value.is_finite() {
        return Err(ValidationError::UnparsableAmount {
            raw: raw.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeAmount { value });
    }

    Ok(value)
}

pub fn validate_percentage(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::PercentageOutOfRange { value })
    }
}

const CURRENCY_SCALE: f64 = 100.0;

/// Commission earned on an appraisal, rounded to cents.
pub fn commission_for(appraised_value: f64, commission_percentage: f64) -> f64 {
    round_currency(appraised_value * commission_percentage / 100.0)
}

pub fn round_currency(amount: f64) -> f64 {
    (amount * CURRENCY_SCALE).round() / CURRENCY_SCALE
}

/// Rate applied to appraisers registered without an explicit percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionPolicy {
    default_percentage: f64,
}

impl CommissionPolicy {
    pub const DEFAULT_PERCENTAGE: f64 = 10.0;

    pub fn new(default_percentage: f64) -> Self {
        let sanitized = if default_percentage.is_finite()
            && (0.0..=100.0).contains(&default_percentage)
        {
            default_percentage
        } else {
            Self::DEFAULT_PERCENTAGE
        };

        Self {
            default_percentage: sanitized,
        }
    }

    pub fn default_percentage(&self) -> f64 {
        self.default_percentage
    }
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERCENTAGE)
    }
}

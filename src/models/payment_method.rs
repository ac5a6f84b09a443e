use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub brand: String,
    pub last4: String,
    pub exp_month: i64,
    pub exp_year: i64,
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentMethod {
    #[validate(length(min = 1, max = 30))]
    pub brand: String,
    #[validate(length(equal = 4), custom(function = "validate_last4"))]
    pub last4: String,
    #[validate(range(min = 1, max = 12))]
    pub exp_month: i64,
    #[validate(range(min = 2020, max = 2100))]
    pub exp_year: i64,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePaymentMethod {
    #[validate(length(min = 1, max = 30))]
    pub brand: Option<String>,
    #[validate(length(equal = 4), custom(function = "validate_last4"))]
    pub last4: Option<String>,
    #[validate(range(min = 1, max = 12))]
    pub exp_month: Option<i64>,
    #[validate(range(min = 2020, max = 2100))]
    pub exp_year: Option<i64>,
    pub is_default: Option<bool>,
}

fn validate_last4(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("last4_digits"))
    }
}

/// A card is usable through the last day of its expiry month.
pub fn is_expired(exp_month: i64, exp_year: i64, now: DateTime<Utc>) -> bool {
    let (year, month) = (i64::from(now.year()), i64::from(now.month()));
    exp_year < year || (exp_year == year && exp_month < month)
}

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub number: Option<String>,
    pub city: String,
    pub country: String,
    pub province: String,
    pub postal_code: Option<String>,
    #[serde(skip)]
    pub client_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddress {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(max = 20))]
    pub number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAddress {
    #[validate(length(min = 1, max = 200))]
    pub street: Option<String>,
    #[validate(length(max = 20))]
    pub number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub province: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
}

use serde::Serialize;

/// Owner record for addresses and orders, keyed by email.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Client {
    pub id: i64,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub telephone: Option<String>,
}

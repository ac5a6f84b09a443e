use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::display_name;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub rating: f64,
    pub comment: Option<String>,
    pub product_id: i64,
    pub user_id: i64,
    pub user_name: String,
}

/// A review joined with the columns needed to label its author.
#[derive(Debug, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub rating: f64,
    pub comment: Option<String>,
    pub product_id: i64,
    pub user_id: i64,
    pub author_name: Option<String>,
    pub author_lastname: Option<String>,
    pub author_email: String,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        let user_name = display_name(
            row.author_name.as_deref(),
            row.author_lastname.as_deref(),
            &row.author_email,
        );
        Self {
            id: row.id,
            rating: row.rating,
            comment: row.comment,
            product_id: row.product_id,
            user_id: row.user_id,
            user_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: f64,
    #[validate(length(min = 10, max = 1000))]
    pub comment: Option<String>,
    pub product_id: i64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReview {
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewSummary {
    pub product_id: i64,
    pub avg_rating: f64,
    pub count: i64,
}

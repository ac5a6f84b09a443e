use sqlx::SqlitePool;

use super::Page;
use crate::models::review::{CreateReview, Review, ReviewRow, ReviewSummary, UpdateReview};

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT r.id, r.rating, r.comment, r.product_id, r.user_id,
           u.name AS author_name, u.lastname AS author_lastname, u.email AS author_email
    FROM reviews r
    JOIN users u ON u.id = r.user_id
"#;

pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_product(&self, product_id: i64) -> Result<Vec<Review>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_AUTHOR} WHERE r.product_id = ? ORDER BY r.id");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Review>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_AUTHOR} WHERE r.user_id = ? ORDER BY r.id");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    pub async fn list_all(&self, page: Page) -> Result<Vec<Review>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_AUTHOR} ORDER BY r.id LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    pub async fn find(&self, id: i64) -> Result<Option<Review>, sqlx::Error> {
        let sql = format!("{SELECT_WITH_AUTHOR} WHERE r.id = ?");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Review::from))
    }

    pub async fn find_by_author(
        &self,
        product_id: i64,
        user_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM reviews WHERE product_id = ? AND user_id = ?")
                .bind(product_id)
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Average rating and review count per reviewed product.
    pub async fn summary(&self) -> Result<Vec<ReviewSummary>, sqlx::Error> {
        sqlx::query_as::<_, ReviewSummary>(
            "SELECT product_id, CAST(AVG(rating) AS REAL) AS avg_rating, COUNT(id) AS count \
             FROM reviews GROUP BY product_id ORDER BY product_id",
        )
        .fetch_all(self.pool)
        .await
    }

    /// Whether any order of the client with `email` contains `product_id`.
    pub async fn has_purchased(&self, email: &str, product_id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT d.id
            FROM order_details d
            JOIN orders o ON o.id = d.order_id
            JOIN clients c ON c.id = o.client_id
            WHERE d.product_id = ? AND c.email = ?
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// A second review of the same product by the same user is a unique violation.
    pub async fn create(&self, user_id: i64, payload: &CreateReview) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO reviews (rating, comment, product_id, user_id) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(payload.rating)
        .bind(payload.comment.as_deref())
        .bind(payload.product_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// An empty comment clears the stored one.
    pub async fn update(&self, id: i64, changes: &UpdateReview) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE reviews SET
                rating = COALESCE(?, rating),
                comment = CASE WHEN ? THEN NULLIF(?, '') ELSE comment END
            WHERE id = ?
            "#,
        )
        .bind(changes.rating)
        .bind(changes.comment.is_some())
        .bind(changes.comment.as_deref())
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

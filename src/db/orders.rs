use sqlx::SqlitePool;

use crate::models::order::{group_order_lines, Order, OrderLineRow};

pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Orders placed by the client with `email`, newest first.
    pub async fn history_for_email(&self, email: &str) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT o.id AS order_id, o.date, o.total, o.status, o.delivery_method,
                   d.product_id, p.name AS product_name, d.quantity, d.price
            FROM orders o
            JOIN clients c ON c.id = o.client_id
            JOIN order_details d ON d.order_id = o.id
            JOIN products p ON p.id = d.product_id
            WHERE c.email = ?
            ORDER BY o.date DESC, o.id DESC, d.id
            "#,
        )
        .bind(email)
        .fetch_all(self.pool)
        .await?;

        Ok(group_order_lines(rows))
    }
}

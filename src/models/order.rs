use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub date: NaiveDateTime,
    pub total: f64,
    pub status: Option<String>,
    pub delivery_method: Option<String>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// One order line joined with its order header and product name.
#[derive(Debug, sqlx::FromRow)]
pub struct OrderLineRow {
    pub order_id: i64,
    pub date: NaiveDateTime,
    pub total: f64,
    pub status: Option<String>,
    pub delivery_method: Option<String>,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Folds joined rows into orders, keeping the row order of first appearance.
pub fn group_order_lines(rows: Vec<OrderLineRow>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();
    for row in rows {
        let item = OrderItem {
            product_id: row.product_id,
            name: row.product_name,
            quantity: row.quantity,
            unit_price: row.price,
        };
        match orders.iter_mut().find(|order| order.id == row.order_id) {
            Some(order) => order.items.push(item),
            None => orders.push(Order {
                id: row.order_id,
                date: row.date,
                total: row.total,
                status: row.status,
                delivery_method: row.delivery_method,
                items: vec![item],
            }),
        }
    }
    orders
}

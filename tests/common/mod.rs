// Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use shop_api::{
    clock::{Clock, FixedClock},
    config::Config,
    db, rest, AppState,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const PASSWORD: &str = "hunter22";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub clock: Arc<FixedClock>,
    pub uploads_dir: PathBuf,
}

impl TestApp {
    /// Fresh in-memory database, cheap argon2 parameters, a frozen clock at
    /// 2026-01-15 12:00 UTC and a private uploads directory.
    pub async fn spawn() -> Self {
        let uploads_dir = std::env::temp_dir().join(format!(
            "shop-api-test-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let dir = uploads_dir.to_string_lossy().into_owned();
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET_KEY" => Some("integration-test-secret".to_string()),
            "ARGON2_MEMORY_KIB" => Some("1024".to_string()),
            "ARGON2_ITERATIONS" => Some("1".to_string()),
            "ARGON2_PARALLELISM" => Some("1".to_string()),
            "UPLOADS_DIR" => Some(dir.clone()),
            "MAX_UPLOAD_BYTES" => Some("65536".to_string()),
            _ => None,
        })
        .expect("test config");

        let pool = db::connect_in_memory().await.expect("in-memory database");
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        ));
        let state = AppState::new(pool.clone(), config, clock.clone() as Arc<dyn Clock>)
            .expect("app state");

        Self {
            router: rest::router(state),
            pool,
            clock,
            uploads_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
        body
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {email}: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register and log in, returning the bearer token.
    pub async fn signup(&self, email: &str) -> String {
        self.register(email).await;
        self.login(email).await
    }

    pub async fn make_admin(&self, email: &str) {
        sqlx::query("UPDATE users SET is_admin = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn admin_token(&self, email: &str) -> String {
        self.register(email).await;
        self.make_admin(email).await;
        self.login(email).await
    }

    pub async fn seed_category(&self, name: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as("INSERT INTO categories (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        id
    }

    pub async fn seed_product(&self, name: &str, price: f64) -> i64 {
        let category_id = self.seed_category("Remeras").await;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO products (name, price, stock, category_id) VALUES (?, ?, 10, ?) RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        id
    }

    /// Place an order for `email` containing `quantity` units of `product_id`.
    pub async fn seed_order(&self, email: &str, date: &str, product_id: i64, quantity: i64) -> i64 {
        sqlx::query("INSERT OR IGNORE INTO clients (email) VALUES (?)")
            .bind(email)
            .execute(&self.pool)
            .await
            .unwrap();
        let (client_id,): (i64,) = sqlx::query_as("SELECT id FROM clients WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        let (price,): (f64,) = sqlx::query_as("SELECT price FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (date, total, status, delivery_method, client_id) \
             VALUES (?, ?, 'paid', 'shipping', ?) RETURNING id",
        )
        .bind(date)
        .bind(price * quantity as f64)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO order_details (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .execute(&self.pool)
        .await
        .unwrap();
        order_id
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .unwrap();
        count
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

//! Repositories over the SQLite pool.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::{
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
    FromRow,
};
use validator::Validate;

use crate::error::AppError;

pub mod addresses;
pub mod catalog;
pub mod clients;
pub mod orders;
pub mod payment_methods;
pub mod reviews;
pub mod users;

pub use addresses::AddressRepository;
pub use catalog::{CategoryRepository, ProductRepository};
pub use clients::ClientRepository;
pub use orders::OrderRepository;
pub use payment_methods::PaymentMethodRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Connect and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// A single long-lived connection to a private in-memory database.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// `?skip=&limit=` paging for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "Page::default_limit")]
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 1000;

    fn default_limit() -> i64 {
        100
    }

    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::default_limit(),
        }
    }
}

/// Plain create/read/update/delete over one table.
///
/// Reads and deletes are generic over the table name; each entity supplies
/// its own insert and update statements.
#[async_trait]
pub trait CrudRepository: Send + Sync + 'static {
    type Entity: Serialize + Send + Unpin + 'static + for<'r> FromRow<'r, SqliteRow>;
    type Payload: DeserializeOwned + Validate + Send + Sync + 'static;

    const TABLE: &'static str;
    /// Human-readable name used in error messages.
    const NAME: &'static str;

    async fn insert(pool: &SqlitePool, payload: &Self::Payload) -> Result<Self::Entity, AppError>;

    async fn update(
        pool: &SqlitePool,
        id: i64,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Entity>, AppError>;

    async fn list(pool: &SqlitePool, page: Page) -> Result<Vec<Self::Entity>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} ORDER BY id LIMIT ? OFFSET ?", Self::TABLE);
        sqlx::query_as::<_, Self::Entity>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Self::Entity>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", Self::TABLE);
        sqlx::query_as::<_, Self::Entity>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Returns whether a row was deleted.
    async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

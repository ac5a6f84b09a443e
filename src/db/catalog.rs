use async_trait::async_trait;
use sqlx::SqlitePool;

use super::CrudRepository;
use crate::error::AppError;
use crate::models::catalog::{Category, CategoryPayload, Product, ProductPayload};

pub struct CategoryRepository;

#[async_trait]
impl CrudRepository for CategoryRepository {
    type Entity = Category;
    type Payload = CategoryPayload;

    const TABLE: &'static str = "categories";
    const NAME: &'static str = "Category";

    async fn insert(pool: &SqlitePool, payload: &CategoryPayload) -> Result<Category, AppError> {
        let category =
            sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES (?) RETURNING *")
                .bind(payload.name.trim())
                .fetch_one(pool)
                .await?;
        Ok(category)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        payload: &CategoryPayload,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ? WHERE id = ? RETURNING *",
        )
        .bind(payload.name.trim())
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(category)
    }
}

pub struct ProductRepository;

impl ProductRepository {
    async fn ensure_category(pool: &SqlitePool, category_id: i64) -> Result<(), AppError> {
        match CategoryRepository::find(pool, category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "category {category_id} does not exist"
            ))),
        }
    }
}

#[async_trait]
impl CrudRepository for ProductRepository {
    type Entity = Product;
    type Payload = ProductPayload;

    const TABLE: &'static str = "products";
    const NAME: &'static str = "Product";

    async fn insert(pool: &SqlitePool, payload: &ProductPayload) -> Result<Product, AppError> {
        Self::ensure_category(pool, payload.category_id).await?;
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, price, stock, image_url, category_id) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(payload.name.trim())
        .bind(payload.price)
        .bind(payload.stock)
        .bind(payload.image_url.as_deref())
        .bind(payload.category_id)
        .fetch_one(pool)
        .await?;
        Ok(product)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        payload: &ProductPayload,
    ) -> Result<Option<Product>, AppError> {
        Self::ensure_category(pool, payload.category_id).await?;
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET name = ?, price = ?, stock = ?, image_url = ?, category_id = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(payload.name.trim())
        .bind(payload.price)
        .bind(payload.stock)
        .bind(payload.image_url.as_deref())
        .bind(payload.category_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(product)
    }
}

use sqlx::SqlitePool;

use crate::models::address::{Address, CreateAddress, UpdateAddress};

/// Addresses are always read and written through their owning client.
pub struct AddressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AddressRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_client(&self, client_id: i64) -> Result<Vec<Address>, sqlx::Error> {
        sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE client_id = ? ORDER BY id")
            .bind(client_id)
            .fetch_all(self.pool)
            .await
    }

    pub async fn create(
        &self,
        client_id: i64,
        payload: &CreateAddress,
    ) -> Result<Address, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (street, number, city, country, province, postal_code, client_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&payload.street)
        .bind(payload.number.as_deref())
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.province)
        .bind(payload.postal_code.as_deref())
        .bind(client_id)
        .fetch_one(self.pool)
        .await
    }

    /// `None` when no address `id` belongs to `client_id`.
    pub async fn update_owned(
        &self,
        id: i64,
        client_id: i64,
        changes: &UpdateAddress,
    ) -> Result<Option<Address>, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            r#"
            UPDATE addresses SET
                street = COALESCE(?, street),
                number = COALESCE(?, number),
                city = COALESCE(?, city),
                country = COALESCE(?, country),
                province = COALESCE(?, province),
                postal_code = COALESCE(?, postal_code)
            WHERE id = ? AND client_id = ?
            RETURNING *
            "#,
        )
        .bind(changes.street.as_deref())
        .bind(changes.number.as_deref())
        .bind(changes.city.as_deref())
        .bind(changes.country.as_deref())
        .bind(changes.province.as_deref())
        .bind(changes.postal_code.as_deref())
        .bind(id)
        .bind(client_id)
        .fetch_optional(self.pool)
        .await
    }

    /// Returns whether an address `id` owned by `client_id` was deleted.
    pub async fn delete_owned(&self, id: i64, client_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ? AND client_id = ?")
            .bind(id)
            .bind(client_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::payment_method::{CreatePaymentMethod, PaymentMethod, UpdatePaymentMethod};

pub struct PaymentMethodRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PaymentMethodRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<PaymentMethod>, sqlx::Error> {
        sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn find_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn create(
        &self,
        user_id: i64,
        payload: &CreatePaymentMethod,
    ) -> Result<PaymentMethod, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        if payload.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let method = sqlx::query_as::<_, PaymentMethod>(
            "INSERT INTO payment_methods (user_id, brand, last4, exp_month, exp_year, is_default) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(payload.brand.trim())
        .bind(&payload.last4)
        .bind(payload.exp_month)
        .bind(payload.exp_year)
        .bind(payload.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(method)
    }

    /// `None` when no method `id` belongs to `user_id`.
    pub async fn update_owned(
        &self,
        id: i64,
        user_id: i64,
        changes: &UpdatePaymentMethod,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        if changes.is_default == Some(true) {
            clear_default(&mut tx, user_id).await?;
        }

        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_methods SET
                brand = COALESCE(?, brand),
                last4 = COALESCE(?, last4),
                exp_month = COALESCE(?, exp_month),
                exp_year = COALESCE(?, exp_year),
                is_default = COALESCE(?, is_default)
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(changes.brand.as_deref().map(str::trim))
        .bind(changes.last4.as_deref())
        .bind(changes.exp_month)
        .bind(changes.exp_year)
        .bind(changes.is_default)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Nothing matched: drop the transaction so a cleared default is rolled back.
        if method.is_some() {
            tx.commit().await?;
        }
        Ok(method)
    }

    pub async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn clear_default(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE payment_methods SET is_default = 0 WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

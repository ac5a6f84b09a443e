//! User repository for database operations.

use sqlx::SqlitePool;

use crate::models::user::{UpdateUser, User};

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    /// Insert a new, active, non-admin user.
    ///
    /// A duplicate email surfaces as a unique-violation `sqlx::Error`.
    pub async fn create(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, password_hash, is_active, is_admin) \
             VALUES (?, ?, ?, 1, 0) RETURNING *",
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
    }

    /// Apply the fields present in `changes`.
    ///
    /// When the email changes, the user's client record follows it so
    /// addresses and order history stay attached. If a client record for the
    /// new email already exists (a guest checkout), that record is left to
    /// be picked up by email instead.
    pub async fn update_profile(
        &self,
        user: &User,
        changes: &UpdateUser,
        new_email: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                lastname = COALESCE(?, lastname),
                email = COALESCE(?, email),
                country = COALESCE(?, country),
                province = COALESCE(?, province),
                locality = COALESCE(?, locality),
                street = COALESCE(?, street),
                postal_code = COALESCE(?, postal_code),
                extra_info = COALESCE(?, extra_info)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(changes.name.as_deref())
        .bind(changes.lastname.as_deref())
        .bind(new_email)
        .bind(changes.country.as_deref())
        .bind(changes.province.as_deref())
        .bind(changes.locality.as_deref())
        .bind(changes.street.as_deref())
        .bind(changes.postal_code.as_deref())
        .bind(changes.extra_info.as_deref())
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        if updated.email != user.email {
            sqlx::query(
                "UPDATE clients SET email = ? WHERE email = ? \
                 AND NOT EXISTS (SELECT 1 FROM clients WHERE email = ?)",
            )
            .bind(&updated.email)
            .bind(&user.email)
            .bind(&updated.email)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }
}

use sqlx::SqlitePool;

use super::is_unique_violation;
use crate::models::{client::Client, user::User};

pub struct ClientRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ClientRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await
    }

    /// Return the client record for `user`, creating it on first use.
    pub async fn get_or_create(&self, user: &User) -> Result<Client, sqlx::Error> {
        if let Some(client) = self.find_by_email(&user.email).await? {
            return Ok(client);
        }
        self.insert_or_fetch(user).await
    }

    /// Insert the client for `user`; if another request created it first,
    /// the unique index rejects the insert and the winner's row is returned.
    pub async fn insert_or_fetch(&self, user: &User) -> Result<Client, sqlx::Error> {
        let inserted = sqlx::query_as::<_, Client>(
            "INSERT INTO clients (name, lastname, email, telephone) \
             VALUES (?, ?, ?, NULL) RETURNING *",
        )
        .bind(user.name.as_deref())
        .bind(user.lastname.as_deref())
        .bind(&user.email)
        .fetch_one(self.pool)
        .await;

        match inserted {
            Ok(client) => Ok(client),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(email = %user.email, "client created concurrently, re-reading");
                self.find_by_email(&user.email).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }
}

//! Repository for the `users` table.
//!
//! Account management lives elsewhere; this only covers creation for
//! seeding and tests. Everything else keys on the id carried in the JWT.

use sqlx::PgPool;
use stxry_core::types::DbId;

pub struct UserRepo;

impl UserRepo {
    /// Insert a user, returning the generated id.
    pub async fn create(pool: &PgPool, username: &str) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
            .bind(username)
            .fetch_one(pool)
            .await
    }
}

//! User repository

use async_trait::async_trait;
use clinic_types::{Identity, Role};
use sqlx::PgPool;

use crate::error::map_unique_violation;
use crate::{DbResult, DbUser, UserRecord, UserStore};

/// Staff account repository backed by the `users` table
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        user.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, username: &str, password_hash: &str, role: Role) -> DbResult<Identity> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, "users_username_key", || {
                format!("Username {} already exists", username)
            })
        })?;

        Ok(UserRecord::try_from(user)?.identity)
    }
}

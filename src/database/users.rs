use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, email, password_hash, role, refresh_tokens, created_at, updated_at";

/// Store interface for user records so the session lifecycle can be
/// exercised against an in-memory implementation in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError>;
    async fn push_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError>;
    async fn remove_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError>;
    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), DatabaseError>;
    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), DatabaseError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn push_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET refresh_tokens = array_append(refresh_tokens, $2), \
             updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET refresh_tokens = array_remove(refresh_tokens, $2), \
             updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET email = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

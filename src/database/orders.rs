use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::order::{Order, OrderItem};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, user_id: Uuid, items: Vec<OrderItem>) -> Result<Order, DatabaseError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DatabaseError>;
}

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        items: row.try_get::<Json<Vec<OrderItem>>, _>("items")?.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, user_id: Uuid, items: Vec<OrderItem>) -> Result<Order, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO orders (id, user_id, items) VALUES ($1, $2, $3) \
             RETURNING id, user_id, items, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(&items))
        .fetch_one(&self.pool)
        .await?;

        Ok(order_from_row(&row)?)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, user_id, items, created_at, updated_at FROM orders \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| order_from_row(row).map_err(DatabaseError::from))
            .collect()
    }
}

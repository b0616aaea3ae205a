use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::cart::{Cart, CartItem};

/// Store interface for carts. `save` persists the whole items document;
/// reconciliation stays a read-modify-write in the service layer.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DatabaseError>;
    async fn save(&self, cart: &Cart) -> Result<Cart, DatabaseError>;
}

pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn cart_from_row(row: &PgRow) -> Result<Cart, sqlx::Error> {
    Ok(Cart {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        items: row.try_get::<Json<Vec<CartItem>>, _>("items")?.0,
    })
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DatabaseError> {
        let row = sqlx::query("SELECT id, user_id, items FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(cart_from_row).transpose()?)
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO carts (id, user_id, items) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items \
             RETURNING id, user_id, items",
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(Json(&cart.items))
        .fetch_one(&self.pool)
        .await?;

        Ok(cart_from_row(&row)?)
    }
}

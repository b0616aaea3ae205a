use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::product::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, product_name, product_desc, image_url, product_price, \
                               screen_option, color, badges, category";

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, DatabaseError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DatabaseError>;
    async fn insert(&self, new_product: NewProduct) -> Result<Product, DatabaseError>;
    /// Returns false when no product with that id existed.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products");
        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn insert(&self, new_product: NewProduct) -> Result<Product, DatabaseError> {
        let query = format!(
            "INSERT INTO products (id, product_name, product_desc, image_url, product_price, \
             screen_option, color, badges, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_product.product_name)
            .bind(&new_product.product_desc)
            .bind(&new_product.image_url)
            .bind(&new_product.product_price)
            .bind(&new_product.screen_option)
            .bind(&new_product.color)
            .bind(&new_product.badges)
            .bind(&new_product.category)
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

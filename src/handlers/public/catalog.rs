use axum::{extract::Path, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::products::{PgProductStore, ProductStore};
use crate::error::ApiError;

/// GET /get-data - list the whole inventory
pub async fn get_data() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let products = PgProductStore::new(pool).list().await?;
    Ok(Json(json!({ "data": products })))
}

/// DELETE /delete-product/:id
pub async fn delete_product(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let deleted = PgProductStore::new(pool).delete(id).await?;

    if !deleted {
        return Err(ApiError::not_found("Product not found"));
    }
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

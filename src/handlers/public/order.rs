use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::order::OrderItem;
use crate::database::orders::{OrderStore, PgOrderStore};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(rename = "UsrId")]
    pub user_id: Uuid,
    #[serde(rename = "Items")]
    pub items: Vec<OrderItem>,
}

/// POST /order/place-order - persist a denormalized order snapshot
pub async fn place_order(Json(payload): Json<PlaceOrderRequest>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    PgOrderStore::new(pool)
        .insert(payload.user_id, payload.items)
        .await
        .map_err(|err| {
            tracing::error!("failed to place order: {}", err);
            ApiError::internal_server_error("Failed to place order")
        })?;

    Ok(Json(json!({ "message": "Order placed successfully" })))
}

/// GET /order/history/:user_id
pub async fn order_history(Path(user_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let orders = PgOrderStore::new(pool)
        .find_by_user(user_id)
        .await
        .map_err(|err| {
            tracing::error!("failed to fetch order history: {}", err);
            ApiError::internal_server_error("Failed to fetch order history")
        })?;

    Ok(Json(json!({ "orders": orders })))
}

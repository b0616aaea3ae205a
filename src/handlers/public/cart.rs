// Cart handlers. Mutations take `UserId`/`productId` in the body; reads take
// the user id in the path.

use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::carts::PgCartStore;
use crate::database::manager::DatabaseManager;
use crate::database::products::PgProductStore;
use crate::error::ApiError;
use crate::services::cart::{CartService, DecrementOutcome};

async fn cart_service() -> Result<CartService<PgCartStore, PgProductStore>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(CartService::new(
        PgCartStore::new(pool.clone()),
        PgProductStore::new(pool),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CartMutationRequest {
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
    #[serde(rename = "productId")]
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ClearCartRequest {
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
}

/// POST /cart/addtocart (and /cart/increase) - add a product or bump its
/// quantity by one
pub async fn add_to_cart(Json(payload): Json<CartMutationRequest>) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    let cart = carts
        .add_or_increment(payload.user_id, payload.product_id)
        .await?;
    Ok(Json(json!(cart)))
}

/// PUT /cart/decrease-cart
pub async fn decrease_cart(
    Json(payload): Json<CartMutationRequest>,
) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    match carts.decrement(payload.user_id, payload.product_id).await? {
        DecrementOutcome::Updated(cart) => Ok(Json(json!(cart))),
        DecrementOutcome::CartMissing => Ok(Json(json!({ "message": "Cart not found!" }))),
        DecrementOutcome::ItemMissing => Ok(Json(json!({ "message": "Item not found in cart!" }))),
    }
}

/// DELETE /cart/remove
pub async fn remove_item(Json(payload): Json<CartMutationRequest>) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    match carts.remove(payload.user_id, payload.product_id).await? {
        Some(cart) => Ok(Json(json!(cart))),
        None => Ok(Json(json!({ "message": "Cart not found!" }))),
    }
}

/// PUT /cart/clear-cart
pub async fn clear_cart(Json(payload): Json<ClearCartRequest>) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    carts.clear(payload.user_id).await?;
    Ok(Json(json!({ "message": "Cart cleared after order placed" })))
}

/// GET /cart/:user_id - cart items hydrated with product details
pub async fn get_cart(Path(user_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    let items = carts.hydrate(user_id).await?;
    Ok(Json(json!({ "items": items })))
}

/// GET /cart/:user_id/quantity - product ids and quantities only
pub async fn get_cart_quantities(Path(user_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let carts = cart_service().await?;
    let items = carts.quantities(user_id).await?;
    Ok(Json(json!({ "items": items })))
}

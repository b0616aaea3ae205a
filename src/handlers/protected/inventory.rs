use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::database::models::product::NewProduct;
use crate::database::products::{PgProductStore, ProductStore};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /admin-management - add a product to the inventory (admin only)
pub async fn admin_management(
    Extension(admin): Extension<AuthUser>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let product = PgProductStore::new(pool).insert(payload).await?;

    tracing::info!(admin = %admin.email, product = %product.id, "product added to inventory");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product add successfully!",
            "product": product,
        })),
    ))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placed order. Items are a write-once snapshot of product data at order
/// time; later product edits never reach past orders.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "UsrId")]
    pub user_id: Uuid,
    #[serde(rename = "Items")]
    pub items: Vec<OrderItem>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub product_name: String,
    pub product_price: f64,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

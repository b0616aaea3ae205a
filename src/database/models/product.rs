use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Inventory item. The price is stored as text and only parsed to a number
/// when a cart is hydrated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub product_desc: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub product_price: String,
    pub screen_option: String,
    pub color: String,
    pub badges: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_name: String,
    #[serde(default)]
    pub product_desc: String,
    #[serde(default, rename = "imageURL")]
    pub image_url: String,
    #[serde(default)]
    pub product_price: String,
    #[serde(default)]
    pub screen_option: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub badges: String,
    #[serde(default)]
    pub category: String,
}

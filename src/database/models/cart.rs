use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user cart. Items are a JSONB document; the invariant of at most one
/// entry per product is maintained by find-or-append in the service layer,
/// not by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
    #[serde(rename = "Items")]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Cart entry joined with its product and a numeric price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCartItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub product_name: String,
    pub product_desc: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub product_price: f64,
}

/// Cart entry projected to id and quantity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartQuantity {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i64,
}

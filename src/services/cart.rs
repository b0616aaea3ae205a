use uuid::Uuid;

use crate::database::carts::CartStore;
use crate::database::manager::DatabaseError;
use crate::database::models::cart::{Cart, CartItem, CartQuantity, DetailedCartItem};
use crate::database::models::product::Product;
use crate::database::products::ProductStore;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("cart not found")]
    CartNotFound,
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Outcome of a decrement. A missing cart or item surfaces as a message to
/// the caller, not an error status.
#[derive(Debug)]
pub enum DecrementOutcome {
    Updated(Cart),
    CartMissing,
    ItemMissing,
}

/// Read-modify-write reconciliation of per-user carts. There is no locking:
/// two concurrent mutations for the same user can interleave their read and
/// write halves and lose an update.
pub struct CartService<C, P> {
    carts: C,
    products: P,
}

impl<C: CartStore, P: ProductStore> CartService<C, P> {
    pub fn new(carts: C, products: P) -> Self {
        Self { carts, products }
    }

    /// Load or lazily create the cart, then find-or-append the product with
    /// quantity +1.
    pub async fn add_or_increment(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Cart, CartError> {
        let mut cart = match self.carts.find_by_user(user_id).await? {
            Some(cart) => cart,
            None => Cart::empty(user_id),
        };

        bump_quantity(&mut cart.items, product_id);
        Ok(self.carts.save(&cart).await?)
    }

    pub async fn decrement(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<DecrementOutcome, CartError> {
        let Some(mut cart) = self.carts.find_by_user(user_id).await? else {
            return Ok(DecrementOutcome::CartMissing);
        };

        if !drop_quantity(&mut cart.items, product_id) {
            return Ok(DecrementOutcome::ItemMissing);
        }

        Ok(DecrementOutcome::Updated(self.carts.save(&cart).await?))
    }

    /// Filter the product out of the cart. Removing an absent item returns
    /// the unchanged cart.
    pub async fn remove(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Cart>, CartError> {
        let Some(mut cart) = self.carts.find_by_user(user_id).await? else {
            return Ok(None);
        };

        cart.items.retain(|item| item.product_id != product_id);
        Ok(Some(self.carts.save(&cart).await?))
    }

    /// Empty the items sequence, typically after order placement. The cart
    /// row itself stays around.
    pub async fn clear(&self, user_id: Uuid) -> Result<(), CartError> {
        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        cart.items.clear();
        self.carts.save(&cart).await?;
        Ok(())
    }

    /// Join cart entries with their products. Entries whose product has been
    /// deleted are dropped. An absent or empty cart yields an empty list.
    pub async fn hydrate(&self, user_id: Uuid) -> Result<Vec<DetailedCartItem>, CartError> {
        let Some(cart) = self.non_empty_cart(user_id).await? else {
            return Ok(Vec::new());
        };

        let products = self.fetch_products(&cart).await?;
        Ok(join_details(&cart.items, &products))
    }

    /// Same join as `hydrate`, projected to product id and quantity.
    pub async fn quantities(&self, user_id: Uuid) -> Result<Vec<CartQuantity>, CartError> {
        let Some(cart) = self.non_empty_cart(user_id).await? else {
            return Ok(Vec::new());
        };

        let products = self.fetch_products(&cart).await?;
        Ok(join_quantities(&cart.items, &products))
    }

    async fn non_empty_cart(&self, user_id: Uuid) -> Result<Option<Cart>, CartError> {
        Ok(self
            .carts
            .find_by_user(user_id)
            .await?
            .filter(|cart| !cart.items.is_empty()))
    }

    async fn fetch_products(&self, cart: &Cart) -> Result<Vec<Product>, CartError> {
        let ids: Vec<Uuid> = cart.items.iter().map(|item| item.product_id).collect();
        Ok(self.products.find_by_ids(&ids).await?)
    }
}

/// Find-or-append keeps at most one entry per product.
fn bump_quantity(items: &mut Vec<CartItem>, product_id: Uuid) {
    match items.iter_mut().find(|item| item.product_id == product_id) {
        Some(item) => item.quantity += 1,
        None => items.push(CartItem {
            product_id,
            quantity: 1,
        }),
    }
}

/// Returns false when the product is not in the cart.
// TODO: decide with the product owner whether quantity should clamp at zero;
// today repeated decrements drive it negative.
fn drop_quantity(items: &mut [CartItem], product_id: Uuid) -> bool {
    match items.iter_mut().find(|item| item.product_id == product_id) {
        Some(item) => {
            item.quantity -= 1;
            true
        }
        None => false,
    }
}

fn join_details(items: &[CartItem], products: &[Product]) -> Vec<DetailedCartItem> {
    items
        .iter()
        .filter_map(|item| {
            let product = products.iter().find(|p| p.id == item.product_id)?;
            Some(DetailedCartItem {
                product_id: item.product_id,
                quantity: item.quantity,
                product_name: product.product_name.clone(),
                product_desc: product.product_desc.clone(),
                image_url: product.image_url.clone(),
                product_price: product.product_price.parse().unwrap_or(0.0),
            })
        })
        .collect()
}

fn join_quantities(items: &[CartItem], products: &[Product]) -> Vec<CartQuantity> {
    items
        .iter()
        .filter(|item| products.iter().any(|p| p.id == item.product_id))
        .map(|item| CartQuantity {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect()
}

//! In-memory store implementations and fixtures backing the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::database::carts::CartStore;
use crate::database::manager::DatabaseError;
use crate::database::models::cart::Cart;
use crate::database::models::product::Product;
use crate::database::models::user::{NewUser, Role, User};
use crate::database::products::ProductStore;
use crate::database::users::UserStore;

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(
        "test-access-secret",
        "test-refresh-secret",
        Duration::minutes(15),
        Duration::days(7),
    )
    .expect("test issuer")
}

pub fn test_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: None,
        role: Role::User,
        refresh_tokens: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_product(name: &str, price: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        product_name: name.to_string(),
        product_desc: format!("{name} description"),
        image_url: format!("https://images.example.com/{name}.png"),
        product_price: price.to_string(),
        screen_option: String::new(),
        color: String::new(),
        badges: String::new(),
        category: String::new(),
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn push_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_tokens.push(token.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn remove_refresh_token(&self, id: Uuid, token: &str) -> Result<(), DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_tokens.retain(|t| t != token);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<(), DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = Some(hash.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_email(&self, id: Uuid, email: &str) -> Result<(), DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.email = email.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCartStore {
    carts: Mutex<HashMap<Uuid, Cart>>,
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DatabaseError> {
        Ok(self.carts.lock().unwrap().get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, DatabaseError> {
        self.carts
            .lock()
            .unwrap()
            .insert(cart.user_id, cart.clone());
        Ok(cart.clone())
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn with(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DatabaseError> {
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        new_product: crate::database::models::product::NewProduct,
    ) -> Result<Product, DatabaseError> {
        let product = Product {
            id: Uuid::new_v4(),
            product_name: new_product.product_name,
            product_desc: new_product.product_desc,
            image_url: new_product.image_url,
            product_price: new_product.product_price,
            screen_option: new_product.screen_option,
            color: new_product.color,
            badges: new_product.badges,
            category: new_product.category,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

pub mod carts;
pub mod manager;
pub mod models;
pub mod orders;
pub mod products;
pub mod users;

pub mod auth;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod stock;
pub mod transactions;
pub mod users;

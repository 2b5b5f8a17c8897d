use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod params;
pub mod product_types;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod stock_movements;
pub mod transactions;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/product-types", product_types::router())
        .nest("/transactions", transactions::router())
        .nest("/dashboard", dashboard::router())
        .nest("/management", management_router())
        .nest("/admin/users", users::router())
}

// Back-office surface; every service behind it checks admin/owner.
fn management_router() -> Router<AppState> {
    Router::new()
        .nest("/purchases", purchases::router())
        .nest("/stock-movements", stock_movements::router())
        .nest("/reports", reports::router())
}

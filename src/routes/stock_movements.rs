use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    dto::stock::{MovementList, ProductMovements, StockAdjustmentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::StockMovement,
    response::ApiResponse,
    routes::params::{LowStockQuery, MovementQuery},
    services::stock_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movements))
        .route("/adjustment", post(adjust_stock))
        .route("/product/{id}", get(product_history))
        .route("/low-stock", get(low_stock))
}

#[utoipa::path(
    get,
    path = "/api/management/stock-movements",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("type" = Option<String>, Query, description = "restock, sale or adjustment"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Match on reference code"),
    ),
    responses(
        (status = 200, description = "List stock movements", body = ApiResponse<MovementList>)
    ),
    tag = "Stock"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<ApiResponse<MovementList>>> {
    let resp = stock_service::list_movements(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/management/stock-movements/adjustment",
    request_body = StockAdjustmentRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<StockMovement>),
        (status = 400, description = "Zero delta, missing notes or negative result"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "Stock"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<StockAdjustmentRequest>,
) -> AppResult<Json<ApiResponse<StockMovement>>> {
    let resp = stock_service::adjust_stock(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/management/stock-movements/product/{id}", tag = "Stock")]
pub async fn product_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductMovements>>> {
    let resp = stock_service::product_history(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/management/stock-movements/low-stock",
    params(
        ("threshold" = Option<Decimal>, Query, description = "Flag stock at or below this, default 10"),
    ),
    responses(
        (status = 200, description = "Low stock products", body = ApiResponse<ProductList>)
    ),
    tag = "Stock"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = stock_service::low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

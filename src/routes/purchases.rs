use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::purchases::{CreatePurchaseRequest, PurchaseList, PurchaseWithItems},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::PurchaseQuery,
    services::purchase_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases))
        .route("/", post(create_purchase))
        .route("/{id}", get(get_purchase))
        .route("/{id}", delete(delete_purchase))
}

#[utoipa::path(
    get,
    path = "/api/management/purchases",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("user_id" = Option<Uuid>, Query, description = "Filter by recorder"),
        ("status" = Option<String>, Query, description = "pending or completed"),
        ("search" = Option<String>, Query, description = "Match on code or supplier"),
    ),
    responses(
        (status = 200, description = "List purchases", body = ApiResponse<PurchaseList>)
    ),
    tag = "Purchases"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PurchaseQuery>,
) -> AppResult<Json<ApiResponse<PurchaseList>>> {
    let resp = purchase_service::list_purchases(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/management/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 200, description = "Restock recorded", body = ApiResponse<PurchaseWithItems>),
        (status = 400, description = "Invalid quantity or price"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "Purchases"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePurchaseRequest>,
) -> AppResult<Json<ApiResponse<PurchaseWithItems>>> {
    let resp = purchase_service::create_purchase(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/management/purchases/{id}", tag = "Purchases")]
pub async fn get_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PurchaseWithItems>>> {
    let resp = purchase_service::get_purchase(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/management/purchases/{id}",
    responses(
        (status = 200, description = "Deleted purchase"),
        (status = 400, description = "Purchase is not pending"),
    ),
    tag = "Purchases"
)]
pub async fn delete_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = purchase_service::delete_purchase(&state, &user, id).await?;
    Ok(Json(resp))
}

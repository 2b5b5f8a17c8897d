use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::ProductTypeList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::ProductType,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_product_types))
        .route("/{id}", get(get_product_type))
}

#[utoipa::path(
    get,
    path = "/api/product-types",
    responses(
        (status = 200, description = "List product types", body = ApiResponse<ProductTypeList>)
    ),
    tag = "Products"
)]
pub async fn list_product_types(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductTypeList>>> {
    let resp = product_service::list_product_types(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/product-types/{id}", tag = "Products")]
pub async fn get_product_type(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductType>>> {
    let resp = product_service::get_product_type(&state, id).await?;
    Ok(Json(resp))
}

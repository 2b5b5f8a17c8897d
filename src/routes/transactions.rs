use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::transactions::{CheckoutRequest, TodaySummary, TransactionList, TransactionWithItems},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::TransactionQuery,
    services::transaction_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/", post(checkout))
        .route("/today-summary", get(today_summary))
        .route("/{id}", get(get_transaction))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("today" = Option<bool>, Query, description = "Only today's transactions"),
        ("user_id" = Option<Uuid>, Query, description = "Filter by cashier"),
        ("payment_method" = Option<String>, Query, description = "cash or transfer"),
        ("search" = Option<String>, Query, description = "Match on transaction code"),
        ("sort_by" = Option<String>, Query, description = "transaction_date, transaction_code, total_amount or total_profit"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List transactions", body = ApiResponse<TransactionList>)
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = transaction_service::list_transactions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout", body = ApiResponse<TransactionWithItems>),
        (status = 400, description = "Insufficient stock or payment, inactive product"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "Transactions"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<TransactionWithItems>>> {
    let resp = transaction_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/today-summary",
    responses(
        (status = 200, description = "Today's totals", body = ApiResponse<TodaySummary>)
    ),
    tag = "Transactions"
)]
pub async fn today_summary(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<TodaySummary>>> {
    let resp = transaction_service::today_summary(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Get transaction", body = ApiResponse<TransactionWithItems>),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransactionWithItems>>> {
    let resp = transaction_service::get_transaction(&state, id).await?;
    Ok(Json(resp))
}

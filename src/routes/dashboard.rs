use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reports::TodayDashboard,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/today", get(today))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/today",
    responses(
        (status = 200, description = "Live report, transactions and hourly breakdown", body = ApiResponse<TodayDashboard>)
    ),
    tag = "Dashboard"
)]
pub async fn today(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<TodayDashboard>>> {
    let resp = report_service::today_dashboard(&state).await?;
    Ok(Json(resp))
}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;

use crate::{
    dto::reports::{
        DailyReportDetail, DailyReportList, GenerateReportRequest, MonthlySummary, RangeSummary,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::DailyReport,
    response::ApiResponse,
    routes::params::{MonthlyQuery, RangeQuery, ReportQuery},
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/date/{date}", get(get_report_by_date))
        .route("/generate", post(generate))
        .route("/monthly-summary", get(monthly_summary))
        .route("/range-summary", get(range_summary))
}

#[utoipa::path(
    get,
    path = "/api/management/reports",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
    ),
    responses(
        (status = 200, description = "List daily reports", body = ApiResponse<DailyReportList>)
    ),
    tag = "Reports"
)]
pub async fn list_reports(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<DailyReportList>>> {
    let resp = report_service::list_reports(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/management/reports/date/{date}",
    params(
        ("date" = String, Path, description = "YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Report with the day's transactions", body = ApiResponse<DailyReportDetail>),
        (status = 404, description = "No report generated for that date"),
    ),
    tag = "Reports"
)]
pub async fn get_report_by_date(
    State(state): State<AppState>,
    user: AuthUser,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<ApiResponse<DailyReportDetail>>> {
    let resp = report_service::get_report_by_date(&state, &user, date).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/management/reports/generate",
    request_body = GenerateReportRequest,
    responses(
        (status = 200, description = "Report generated", body = ApiResponse<DailyReport>)
    ),
    tag = "Reports"
)]
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GenerateReportRequest>,
) -> AppResult<Json<ApiResponse<DailyReport>>> {
    let resp = report_service::generate(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/management/reports/monthly-summary",
    params(
        ("month" = Option<u32>, Query, description = "1-12, defaults to the current month"),
        ("year" = Option<i32>, Query, description = "Defaults to the current year"),
    ),
    responses(
        (status = 200, description = "Month folded from stored reports", body = ApiResponse<MonthlySummary>)
    ),
    tag = "Reports"
)]
pub async fn monthly_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthlyQuery>,
) -> AppResult<Json<ApiResponse<MonthlySummary>>> {
    let resp = report_service::monthly_summary(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/management/reports/range-summary",
    params(
        ("start_date" = String, Query, description = "YYYY-MM-DD, inclusive"),
        ("end_date" = String, Query, description = "YYYY-MM-DD, inclusive"),
    ),
    responses(
        (status = 200, description = "Range folded from stored reports", body = ApiResponse<RangeSummary>),
        (status = 400, description = "Missing or inverted bounds"),
    ),
    tag = "Reports"
)]
pub async fn range_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<RangeSummary>>> {
    let resp = report_service::range_summary(&state, &user, query).await?;
    Ok(Json(resp))
}

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::reports::{
        DailyReportDetail, DailyReportList, GenerateReportRequest, HourlyBucket, MonthlySummary,
        RangeSummary, TodayDashboard,
    },
    engine::inventory,
    entity::{
        daily_reports::{Column as ReportCol, Entity as DailyReports, Model as ReportModel},
        transactions::{Column as TransactionCol, Entity as Transactions,
            Model as TransactionModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_management, AuthUser},
    models::{DailyReport, TopProduct, Transaction},
    response::{ApiResponse, Meta},
    routes::params::{MonthlyQuery, RangeQuery, ReportQuery},
    state::AppState,
};

pub async fn list_reports(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<DailyReportList>> {
    ensure_management(user)?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut finder = DailyReports::find();

    if let Some(start_date) = query.start_date {
        finder = finder.filter(ReportCol::ReportDate.gte(start_date));
    }
    if let Some(end_date) = query.end_date {
        finder = finder.filter(ReportCol::ReportDate.lte(end_date));
    }
    let finder = finder.order_by_desc(ReportCol::ReportDate);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(report_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Daily reports",
        DailyReportList { items },
        Some(meta),
    ))
}

pub async fn get_report_by_date(
    state: &AppState,
    user: &AuthUser,
    date: NaiveDate,
) -> AppResult<ApiResponse<DailyReportDetail>> {
    ensure_management(user)?;

    let report = DailyReports::find()
        .filter(ReportCol::ReportDate.eq(date))
        .one(&state.orm)
        .await?;
    let report = match report {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let transactions = day_transactions(state, date).await?;

    Ok(ApiResponse::success(
        "Daily report",
        DailyReportDetail {
            report: report_from_entity(report),
            transactions,
        },
        Some(Meta::empty()),
    ))
}

pub async fn generate(
    state: &AppState,
    user: &AuthUser,
    payload: GenerateReportRequest,
) -> AppResult<ApiResponse<DailyReport>> {
    ensure_management(user)?;

    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());
    let report = generate_daily_report(state, date).await?;

    Ok(ApiResponse::success(
        "Report generated",
        report,
        Some(Meta::empty()),
    ))
}

/// Aggregate one day of transactions into its `daily_reports` row.
///
/// Recomputes from the ledger every time and upserts on `report_date`,
/// so regenerating a day is idempotent. Called by the manual endpoint,
/// the dashboard and the nightly scheduler.
pub async fn generate_daily_report(state: &AppState, date: NaiveDate) -> AppResult<DailyReport> {
    let (start, end) = super::day_bounds(date);

    let (count, total_sales, total_profit, cash_amount, transfer_amount) =
        sqlx::query_as::<_, (i64, Decimal, Decimal, Decimal, Decimal)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_amount), 0),
                   COALESCE(SUM(total_profit), 0),
                   COALESCE(SUM(total_amount) FILTER (WHERE payment_method = 'cash'), 0),
                   COALESCE(SUM(total_amount) FILTER (WHERE payment_method = 'transfer'), 0)
            FROM transactions
            WHERE transaction_date >= $1 AND transaction_date < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&state.pool)
        .await?;

    let top_rows = sqlx::query_as::<_, (Uuid, String, String, String, Decimal, Decimal, Decimal)>(
        r#"
        SELECT p.id, p.name, p.code, p.unit,
               SUM(ti.quantity),
               SUM(ti.subtotal),
               SUM(ti.profit)
        FROM transaction_items ti
        JOIN transactions t ON t.id = ti.transaction_id
        JOIN products p ON p.id = ti.product_id
        WHERE t.transaction_date >= $1 AND t.transaction_date < $2
        GROUP BY p.id, p.name, p.code, p.unit
        ORDER BY SUM(ti.subtotal) DESC
        LIMIT 5
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?;

    let top_products: Vec<TopProduct> = top_rows
        .into_iter()
        .map(
            |(id, name, code, unit, total_quantity, total_sales, total_profit)| TopProduct {
                id,
                name,
                code,
                unit,
                total_quantity,
                total_sales,
                total_profit,
            },
        )
        .collect();
    let top_json = serde_json::to_value(&top_products).map_err(anyhow::Error::from)?;

    let saved = sqlx::query_as::<_, DailyReport>(
        r#"
        INSERT INTO daily_reports
            (id, report_date, total_sales, total_profit, cash_amount, transfer_amount,
             transaction_count, top_products)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (report_date) DO UPDATE SET
            total_sales = EXCLUDED.total_sales,
            total_profit = EXCLUDED.total_profit,
            cash_amount = EXCLUDED.cash_amount,
            transfer_amount = EXCLUDED.transfer_amount,
            transaction_count = EXCLUDED.transaction_count,
            top_products = EXCLUDED.top_products,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(date)
    .bind(total_sales)
    .bind(total_profit)
    .bind(cash_amount)
    .bind(transfer_amount)
    .bind(count as i32)
    .bind(top_json)
    .fetch_one(&state.pool)
    .await?;

    tracing::debug!(date = %date, transactions = count, sales = %total_sales, "daily report written");

    Ok(saved)
}

/// Month totals folded from the stored daily rows, never from raw
/// transactions. Days without a generated report do not contribute.
pub async fn monthly_summary(
    state: &AppState,
    user: &AuthUser,
    query: MonthlyQuery,
) -> AppResult<ApiResponse<MonthlySummary>> {
    ensure_management(user)?;

    let now = Utc::now();
    let month = query.month.unwrap_or_else(|| now.month());
    let year = query.year.unwrap_or_else(|| now.year());

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".into()))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::BadRequest("Invalid month or year".into()))?;

    let reports: Vec<DailyReport> = DailyReports::find()
        .filter(ReportCol::ReportDate.gte(start))
        .filter(ReportCol::ReportDate.lt(end))
        .order_by_asc(ReportCol::ReportDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(report_from_entity)
        .collect();

    let fold = fold_reports(&reports);

    Ok(ApiResponse::success(
        "Monthly summary",
        MonthlySummary {
            month,
            year,
            total_days: reports.len() as i64,
            total_sales: fold.total_sales,
            total_profit: fold.total_profit,
            total_transactions: fold.total_transactions,
            average_daily_sales: fold.average_daily_sales,
            average_daily_profit: fold.average_daily_profit,
            cash_total: fold.cash_total,
            transfer_total: fold.transfer_total,
            best_day: fold.best_day,
            worst_day: fold.worst_day,
        },
        Some(Meta::empty()),
    ))
}

pub async fn range_summary(
    state: &AppState,
    user: &AuthUser,
    query: RangeQuery,
) -> AppResult<ApiResponse<RangeSummary>> {
    ensure_management(user)?;

    let start_date = query
        .start_date
        .ok_or_else(|| AppError::BadRequest("start_date is required".into()))?;
    let end_date = query
        .end_date
        .ok_or_else(|| AppError::BadRequest("end_date is required".into()))?;
    if start_date > end_date {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".into(),
        ));
    }

    let reports: Vec<DailyReport> = DailyReports::find()
        .filter(ReportCol::ReportDate.gte(start_date))
        .filter(ReportCol::ReportDate.lte(end_date))
        .order_by_asc(ReportCol::ReportDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(report_from_entity)
        .collect();

    let fold = fold_reports(&reports);

    Ok(ApiResponse::success(
        "Range summary",
        RangeSummary {
            start_date,
            end_date,
            total_days: reports.len() as i64,
            total_sales: fold.total_sales,
            total_profit: fold.total_profit,
            total_transactions: fold.total_transactions,
            average_daily_sales: fold.average_daily_sales,
            average_daily_profit: fold.average_daily_profit,
            cash_total: fold.cash_total,
            transfer_total: fold.transfer_total,
            best_day: fold.best_day,
            worst_day: fold.worst_day,
            daily_breakdown: reports,
        },
        Some(Meta::empty()),
    ))
}

/// Realtime view for the sales floor: regenerates today's report, then
/// returns it with the day's transactions and an hourly breakdown.
pub async fn today_dashboard(state: &AppState) -> AppResult<ApiResponse<TodayDashboard>> {
    let today = Utc::now().date_naive();
    let report = generate_daily_report(state, today).await?;
    let transactions = day_transactions(state, today).await?;

    let (start, end) = super::day_bounds(today);
    let hourly_breakdown = sqlx::query_as::<_, (i32, i64, Decimal, Decimal)>(
        r#"
        SELECT EXTRACT(HOUR FROM transaction_date)::int,
               COUNT(*),
               COALESCE(SUM(total_amount), 0),
               COALESCE(SUM(total_profit), 0)
        FROM transactions
        WHERE transaction_date >= $1 AND transaction_date < $2
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|(hour, transaction_count, total_sales, total_profit)| HourlyBucket {
        hour,
        transaction_count,
        total_sales,
        total_profit,
    })
    .collect();

    Ok(ApiResponse::success(
        "Today",
        TodayDashboard {
            report,
            transactions,
            hourly_breakdown,
        },
        Some(Meta::empty()),
    ))
}

struct ReportFold {
    total_sales: Decimal,
    total_profit: Decimal,
    total_transactions: i64,
    cash_total: Decimal,
    transfer_total: Decimal,
    average_daily_sales: Decimal,
    average_daily_profit: Decimal,
    best_day: Option<DailyReport>,
    worst_day: Option<DailyReport>,
}

/// Best day is the highest total_sales; worst day ignores days with no
/// sales at all, so an untouched register does not always win.
fn fold_reports(reports: &[DailyReport]) -> ReportFold {
    let mut total_sales = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;
    let mut total_transactions = 0i64;
    let mut cash_total = Decimal::ZERO;
    let mut transfer_total = Decimal::ZERO;

    for report in reports {
        total_sales += report.total_sales;
        total_profit += report.total_profit;
        total_transactions += report.transaction_count as i64;
        cash_total += report.cash_amount;
        transfer_total += report.transfer_amount;
    }

    let (average_daily_sales, average_daily_profit) = if reports.is_empty() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let days = Decimal::from(reports.len() as i64);
        (
            inventory::round_money(total_sales / days),
            inventory::round_money(total_profit / days),
        )
    };

    ReportFold {
        total_sales,
        total_profit,
        total_transactions,
        cash_total,
        transfer_total,
        average_daily_sales,
        average_daily_profit,
        best_day: reports.iter().max_by_key(|r| r.total_sales).cloned(),
        worst_day: reports
            .iter()
            .filter(|r| r.total_sales > Decimal::ZERO)
            .min_by_key(|r| r.total_sales)
            .cloned(),
    }
}

async fn day_transactions(state: &AppState, date: NaiveDate) -> AppResult<Vec<Transaction>> {
    let (start, end) = super::day_bounds(date);
    let transactions = Transactions::find()
        .filter(TransactionCol::TransactionDate.gte(start))
        .filter(TransactionCol::TransactionDate.lt(end))
        .order_by_desc(TransactionCol::TransactionDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(transaction_from_entity)
        .collect();
    Ok(transactions)
}

fn report_from_entity(model: ReportModel) -> DailyReport {
    DailyReport {
        id: model.id,
        report_date: model.report_date,
        total_sales: model.total_sales,
        total_profit: model.total_profit,
        cash_amount: model.cash_amount,
        transfer_amount: model.transfer_amount,
        transaction_count: model.transaction_count,
        top_products: model.top_products,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn transaction_from_entity(model: TransactionModel) -> Transaction {
    Transaction {
        id: model.id,
        transaction_code: model.transaction_code,
        user_id: model.user_id,
        transaction_date: model.transaction_date.with_timezone(&Utc),
        total_amount: model.total_amount,
        total_profit: model.total_profit,
        paid_amount: model.paid_amount,
        change_amount: model.change_amount,
        payment_method: model.payment_method,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

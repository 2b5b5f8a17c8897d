use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DailyReport, Transaction};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateReportRequest {
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyReportList {
    pub items: Vec<DailyReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyReportDetail {
    pub report: DailyReport,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub total_days: i64,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub total_transactions: i64,
    pub average_daily_sales: Decimal,
    pub average_daily_profit: Decimal,
    pub cash_total: Decimal,
    pub transfer_total: Decimal,
    pub best_day: Option<DailyReport>,
    pub worst_day: Option<DailyReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RangeSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub total_transactions: i64,
    pub average_daily_sales: Decimal,
    pub average_daily_profit: Decimal,
    pub cash_total: Decimal,
    pub transfer_total: Decimal,
    pub best_day: Option<DailyReport>,
    pub worst_day: Option<DailyReport>,
    pub daily_breakdown: Vec<DailyReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyBucket {
    pub hour: i32,
    pub transaction_count: i64,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodayDashboard {
    pub report: DailyReport,
    pub transactions: Vec<Transaction>,
    pub hourly_breakdown: Vec<HourlyBucket>,
}
